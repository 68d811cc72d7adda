// tests/search_tests.rs

use std::fs;
use std::path::Path;

use agent_query::search::{
    FileSystemSearchProvider, SearchOptions, SearchProvider, SearchResult, format_search_compact,
    search,
};
use agent_query::{ErrorCode, OutputMode, Schema, SchemaConfig};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b.md", "intro\nTODO: write tests\noutro\n");
    write(dir.path(), "a.md", "nothing here\n");
    write(dir.path(), "notes/c.md", "first\nsecond\ntodo later\nfourth\nfifth\n");
    write(dir.path(), "notes/d.txt", "TODO in a text file\n");
    dir
}

fn md() -> Vec<String> {
    vec![".md".to_string()]
}

fn locations(results: &[SearchResult]) -> Vec<(String, usize, bool)> {
    results
        .iter()
        .map(|r| (r.source.path.clone(), r.source.line, r.is_match))
        .collect()
}

#[test]
fn test_search_filters_by_extension() {
    let dir = fixture();
    let results = search(dir.path(), "TODO", &md(), &SearchOptions::default()).unwrap();
    assert_eq!(locations(&results), vec![("b.md".to_string(), 2, true)]);
    assert_eq!(results[0].content, "TODO: write tests");
}

#[test]
fn test_extension_without_dot() {
    let dir = fixture();
    let results = search(dir.path(), "TODO", &["txt".to_string()], &SearchOptions::default())
        .unwrap();
    assert_eq!(
        locations(&results),
        vec![("notes/d.txt".to_string(), 1, true)]
    );
}

#[test]
fn test_no_extensions_searches_everything_in_path_order() {
    let dir = fixture();
    let opts = SearchOptions::default().case_insensitive();
    let results = search(dir.path(), "todo", &[], &opts).unwrap();
    assert_eq!(
        locations(&results),
        vec![
            ("b.md".to_string(), 2, true),
            ("notes/c.md".to_string(), 3, true),
            ("notes/d.txt".to_string(), 1, true),
        ]
    );
}

#[test]
fn test_context_lines() {
    let dir = fixture();
    let opts = SearchOptions::default()
        .case_insensitive()
        .with_context_lines(1)
        .with_file_glob("c.*");
    let results = search(dir.path(), "todo", &md(), &opts).unwrap();
    assert_eq!(
        locations(&results),
        vec![
            ("notes/c.md".to_string(), 2, false),
            ("notes/c.md".to_string(), 3, true),
            ("notes/c.md".to_string(), 4, false),
        ]
    );
}

#[test]
fn test_no_matches_is_empty() {
    let dir = fixture();
    let results = search(dir.path(), "zebra", &md(), &SearchOptions::default()).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_missing_directory_is_empty() {
    let dir = fixture();
    let missing = dir.path().join("missing");
    let results = search(&missing, "x", &md(), &SearchOptions::default()).unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_invalid_regex() {
    let dir = fixture();
    let err = search(dir.path(), "[unclosed", &md(), &SearchOptions::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::ParseError);
    assert!(err.message.starts_with("invalid regex: "));
}

#[test]
fn test_invalid_glob() {
    let dir = fixture();
    let opts = SearchOptions::default().with_file_glob("[");
    let err = search(dir.path(), "x", &md(), &opts).unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[test]
fn test_provider_matches_free_function() {
    let dir = fixture();
    let provider = FileSystemSearchProvider::new(dir.path(), md());
    let opts = SearchOptions::default();
    assert_eq!(
        provider.search("TODO", &opts).unwrap(),
        search(dir.path(), "TODO", &md(), &opts).unwrap()
    );
}

#[test]
fn test_compact_rendering() {
    let dir = fixture();
    let opts = SearchOptions::default().case_insensitive().with_context_lines(1);
    let results = search(dir.path(), "todo", &md(), &opts).unwrap();
    assert_eq!(
        format_search_compact(&results),
        "b.md\n  1  intro\n  2: TODO: write tests\n  3  outro\n\nnotes/c.md\n  2  second\n  3: todo later\n  4  fourth\n"
    );
}

#[test]
fn test_schema_search_json_modes() {
    let dir = fixture();
    let schema: Schema<()> = Schema::with_config(
        SchemaConfig::default()
            .with_data_dir(dir.path())
            .with_output_mode(OutputMode::Compact),
    );
    let opts = SearchOptions::default();

    assert_eq!(
        schema.search_json("TODO", &opts).unwrap(),
        "b.md\n  2: TODO: write tests\n"
    );

    let human = schema
        .search_json_with_mode("TODO", &opts, OutputMode::Human)
        .unwrap();
    let decoded: serde_json::Value = serde_json::from_str(&human).unwrap();
    assert_eq!(
        decoded,
        serde_json::json!([{
            "source": {"path": "b.md", "line": 2},
            "content": "TODO: write tests",
            "isMatch": true,
        }])
    );
    assert!(human.contains("\n  "));

    let empty = schema
        .search_json_with_mode("zebra", &opts, OutputMode::Human)
        .unwrap();
    assert_eq!(empty, "[]");
    assert_eq!(
        schema
            .search_json_with_mode("zebra", &opts, OutputMode::Compact)
            .unwrap(),
        ""
    );
}

#[cfg(unix)]
#[test]
fn test_directory_symlink_cycle_is_not_followed() {
    use std::os::unix::fs::symlink;

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.md", "hit\n");
    symlink(dir.path(), dir.path().join("loop")).unwrap();

    let results = search(dir.path(), "hit", &md(), &SearchOptions::default()).unwrap();
    assert_eq!(locations(&results), vec![("a.md".to_string(), 1, true)]);
}

#[cfg(unix)]
#[test]
fn test_file_symlink_is_searched() {
    use std::os::unix::fs::symlink;

    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "real/a.md", "hit\n");
    symlink(dir.path().join("real/a.md"), dir.path().join("link.md")).unwrap();

    let results = search(dir.path(), "hit", &md(), &SearchOptions::default()).unwrap();
    assert_eq!(
        locations(&results),
        vec![
            ("link.md".to_string(), 1, true),
            ("real/a.md".to_string(), 1, true),
        ]
    );
}
