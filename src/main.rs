use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use agent_query::SchemaConfig;
use agent_query::cli::{
    self, CliError, GrepOptions, MutateOptions, QueryOptions, TaskStore, build_schema,
};
use agent_query::search::SearchOptions;
use clap::{Parser as ClapParser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "taskq")]
#[command(about = "taskq - query and update a task list with the agent query DSL")]
#[command(version)]
struct Cli {
    /// JSON array of tasks to start from instead of the built-in sample
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Root directory searched by `grep`
    #[arg(long, global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a read query
    Q {
        /// The query (reads from stdin if not provided)
        query: Option<String>,

        /// Output format: json, compact or llm
        #[arg(long)]
        format: String,
    },

    /// Execute one or more mutations
    M {
        /// The mutation statements
        mutation: String,

        /// Output format: json, compact or llm
        #[arg(long)]
        format: String,

        /// Preview without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Required to run destructive mutations
        #[arg(long)]
        confirm: bool,
    },

    /// Regex search across data files
    Grep {
        pattern: String,

        /// Only search files whose name matches this glob (e.g. "*.md")
        #[arg(long)]
        file: Option<String>,

        /// Case-insensitive search
        #[arg(short = 'i', long)]
        ignore_case: bool,

        /// Number of context lines around matches
        #[arg(short = 'C', long, default_value_t = 0)]
        context: usize,

        /// Output format: json, compact or llm
        #[arg(long)]
        format: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => println!("{}", output.trim_end_matches('\n')),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<String, CliError> {
    let store = match &cli.data {
        Some(path) => TaskStore::from_json(&fs::read_to_string(path)?)?,
        None => TaskStore::default(),
    };
    let schema = build_schema(&store, SchemaConfig::default().with_data_dir(cli.dir));

    match cli.command {
        Commands::Q { query, format } => {
            let mode = cli::parse_output_mode(&format)?;
            let query = match query {
                Some(q) => q,
                None if !atty::is(atty::Stream::Stdin) => {
                    let mut buffer = String::new();
                    io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
                None => return Err(CliError::NoInput),
            };
            cli::execute_query(&schema, &QueryOptions { query, mode })
        }
        Commands::M {
            mutation,
            format,
            dry_run,
            confirm,
        } => {
            let mode = cli::parse_output_mode(&format)?;
            cli::execute_mutation(
                &schema,
                &MutateOptions {
                    input: mutation,
                    mode,
                    dry_run,
                    confirm,
                },
            )
        }
        Commands::Grep {
            pattern,
            file,
            ignore_case,
            context,
            format,
        } => {
            let mode = cli::parse_output_mode(&format)?;
            let search = SearchOptions {
                file_glob: file,
                case_insensitive: ignore_case,
                context_lines: context,
            };
            cli::execute_grep(&schema, &GrepOptions { pattern, search, mode })
        }
    }
}
