//! Regex search over the files under a data directory.
//!
//! Independent of the query language: nothing here parses or executes
//! statements. It shares the output modes so a CLI can offer both surfaces
//! with the same `--format` flag.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{error::QueryError, output::OutputMode, schema::Schema};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    /// Shell-style pattern matched against the file name only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_glob: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub case_insensitive: bool,

    /// Lines of surrounding context to include around each match
    #[serde(default, skip_serializing_if = "is_zero")]
    pub context_lines: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl SearchOptions {
    pub fn with_file_glob(mut self, glob: impl Into<String>) -> Self {
        self.file_glob = Some(glob.into());
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }
}

/// Where a line came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Relative to the searched directory, `/`-separated
    pub path: String,
    /// 1-based
    pub line: usize,
}

/// One matching or context line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub source: Source,
    pub content: String,
    pub is_match: bool,
}

/// Something that can answer a regex search. The file system is one
/// implementation; an index or a remote store could be another.
pub trait SearchProvider {
    fn search(&self, pattern: &str, opts: &SearchOptions) -> Result<Vec<SearchResult>, QueryError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemSearchProvider {
    pub data_dir: PathBuf,
    pub extensions: Vec<String>,
}

impl FileSystemSearchProvider {
    pub fn new(data_dir: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        FileSystemSearchProvider {
            data_dir: data_dir.into(),
            extensions,
        }
    }
}

impl SearchProvider for FileSystemSearchProvider {
    fn search(&self, pattern: &str, opts: &SearchOptions) -> Result<Vec<SearchResult>, QueryError> {
        search(&self.data_dir, pattern, &self.extensions, opts)
    }
}

/// Compile `pattern`, prefixed with `(?i)` when matching case-insensitively.
pub fn compile_pattern(pattern: &str, case_insensitive: bool) -> Result<Regex, QueryError> {
    let pattern = if case_insensitive {
        format!("(?i){}", pattern)
    } else {
        pattern.to_string()
    };
    Regex::new(&pattern).map_err(|e| {
        QueryError::parse(format!("invalid regex: {}", e)).with_detail("pattern", pattern.as_str())
    })
}

/// Scan `lines` for matches of `re`.
///
/// With `context > 0` every line within `context` lines of a match is
/// included too, flagged `is_match: false`, and overlapping windows merge so
/// no line appears twice.
pub fn match_lines<S: AsRef<str>>(
    lines: &[S],
    path: &str,
    re: &Regex,
    context: usize,
) -> Vec<SearchResult> {
    let matches: BTreeSet<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| re.is_match(line.as_ref()))
        .map(|(i, _)| i)
        .collect();
    if matches.is_empty() {
        return Vec::new();
    }

    let included: BTreeSet<usize> = if context == 0 {
        matches.clone()
    } else {
        matches
            .iter()
            .flat_map(|&i| i.saturating_sub(context)..=(i + context).min(lines.len() - 1))
            .collect()
    };

    included
        .into_iter()
        .map(|i| SearchResult {
            source: Source {
                path: path.to_string(),
                line: i + 1,
            },
            content: lines[i].as_ref().to_string(),
            is_match: matches.contains(&i),
        })
        .collect()
}

/// Recursively search `dir` for lines matching `pattern`.
///
/// Only files whose extension is in `extensions` are read; each entry may be
/// given with or without its leading dot, and an empty list admits every
/// file. Files are visited in sorted path order. Unreadable files are
/// skipped. No matches yields an empty vector.
pub fn search(
    dir: &Path,
    pattern: &str,
    extensions: &[String],
    opts: &SearchOptions,
) -> Result<Vec<SearchResult>, QueryError> {
    let re = compile_pattern(pattern, opts.case_insensitive)?;
    let glob = opts
        .file_glob
        .as_deref()
        .filter(|g| !g.is_empty())
        .map(|g| {
            glob::Pattern::new(g).map_err(|e| {
                QueryError::validation(format!("invalid file glob: {}", e)).with_detail("glob", g)
            })
        })
        .transpose()?;
    let extensions: BTreeSet<String> = extensions
        .iter()
        .map(|ext| ext.strip_prefix('.').unwrap_or(ext).to_string())
        .collect();

    let mut files = Vec::new();
    collect_files(dir, &mut files);

    let mut results = Vec::new();
    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !extensions.is_empty() {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !extensions.contains(ext) {
                continue;
            }
        }
        if let Some(glob) = &glob
            && !glob.matches(name)
        {
            continue;
        }

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                trace!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        let lines: Vec<&str> = text.lines().collect();
        results.extend(match_lines(&lines, &relative_path(dir, &path), &re, opts.context_lines));
    }

    debug!(pattern, matches = results.len(), "search finished");
    Ok(results)
}

/// Files below `dir`, depth first, each directory's entries in name order.
///
/// Symlinked directories are not descended into. A symlink to a regular file
/// is searched like the file itself.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<(PathBuf, bool)> = entries
        .filter_map(|e| e.ok())
        .map(|e| {
            let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
            (e.path(), is_dir)
        })
        .collect();
    entries.sort();

    for (path, is_dir) in entries {
        if is_dir {
            collect_files(&path, out);
        } else if path.is_file() {
            out.push(path);
        }
    }
}

fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Group results by file in order of first appearance.
///
/// ```text
/// notes/a.md
///   3: a matching line
///   4  a context line
///
/// notes/b.md
///   1: another match
/// ```
pub fn format_search_compact(results: &[SearchResult]) -> String {
    let mut groups: Vec<(&str, Vec<&SearchResult>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for result in results {
        let path = result.source.path.as_str();
        let slot = *index.entry(path).or_insert_with(|| {
            groups.push((path, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(result);
    }

    let mut out = String::new();
    for (i, (path, lines)) in groups.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(path);
        out.push('\n');
        for r in lines {
            let sep = if r.is_match { ": " } else { "  " };
            out.push_str(&format!("  {}{}{}\n", r.source.line, sep, r.content));
        }
    }
    out
}

/// Render results in `mode`: indented JSON for humans, grouped text for
/// compact output.
pub fn render_search(results: &[SearchResult], mode: OutputMode) -> Result<String, QueryError> {
    match mode {
        OutputMode::Human => serde_json::to_string_pretty(results)
            .map_err(|e| QueryError::internal(format!("encoding search results: {}", e))),
        OutputMode::Compact => Ok(format_search_compact(results)),
    }
}

impl<T: 'static> Schema<T> {
    /// Search the configured data directory and extensions.
    pub fn search(&self, pattern: &str, opts: &SearchOptions) -> Result<Vec<SearchResult>, QueryError> {
        search(&self.config.data_dir, pattern, &self.config.extensions, opts)
    }

    /// Search and render with the schema's configured output mode.
    pub fn search_json(&self, pattern: &str, opts: &SearchOptions) -> Result<String, QueryError> {
        self.search_json_with_mode(pattern, opts, self.config.output_mode)
    }

    pub fn search_json_with_mode(
        &self,
        pattern: &str,
        opts: &SearchOptions,
        mode: OutputMode,
    ) -> Result<String, QueryError> {
        render_search(&self.search(pattern, opts)?, mode)
    }

    /// A provider over this schema's data directory.
    pub fn search_provider(&self) -> FileSystemSearchProvider {
        FileSystemSearchProvider::new(self.config.data_dir.clone(), self.config.extensions.clone())
    }
}
