//! astvault CLI - store and query parsed JavaScript/TypeScript syntax trees

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "astvault")]
#[command(version)]
#[command(about = "Persist JavaScript/TypeScript syntax trees per project in SQLite")]
#[command(long_about = r#"
astvault keeps parsed source files in a local SQLite store:
  • Projects own files, files own their JSON ASTs
  • Deleting a project removes its files and ASTs
  • Single-file parsing to a JSON envelope on stdout

Example usage:
  astvault rebuild
  astvault parse src/index.ts
  astvault ingest ./my-app --name my-app --crypto-only
  astvault export <PROJECT_ID> --out results/asts.json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (defaults to the config value, then astvault.db)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database if it does not exist yet
    Init {
        /// Also write the resolved settings to the config file
        #[arg(long)]
        write_config: bool,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Delete the database and create an empty one
    Rebuild,

    /// Delete every project, file and AST but keep the schema
    Clear,

    /// Parse one source file and print a JSON envelope
    Parse {
        /// File to parse
        file: PathBuf,

        /// Keep punctuation and keyword tokens in the tree
        #[arg(long)]
        tokens: bool,
    },

    /// Record every source file under a directory as a new project
    Ingest {
        /// Directory to scan
        path: PathBuf,

        /// Project name (defaults to directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Only keep files mentioning cryptography keywords
        #[arg(long)]
        crypto_only: bool,

        /// Additional gitignore-style patterns to skip
        #[arg(long)]
        exclude: Vec<String>,

        /// Write stored file names per crypto category to this JSON file
        #[arg(long)]
        matches_out: Option<PathBuf>,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// List files recorded for a project
    Files {
        project_id: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List ASTs stored for a project
    Asts {
        project_id: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write all ASTs of a project to a JSON file
    Export {
        project_id: String,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Show row counts
    Stats,
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Create a project and print its id
    Add { name: String },

    /// List all projects
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Delete a project with its files and ASTs
    Delete { project_id: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is reserved for command output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    run(cli)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Parsing one file needs neither the store nor the config
    if let Commands::Parse { file, tokens } = &cli.command {
        return commands::run_parse(file, *tokens);
    }

    let ctx = commands::Context::load(cli.database.as_deref(), cli.config.as_deref())?;

    match cli.command {
        Commands::Init { write_config, force } => commands::run_init(&ctx, write_config, force),
        Commands::Rebuild => commands::run_rebuild(&ctx),
        Commands::Clear => commands::run_clear(&ctx),
        // Dispatched before the config is loaded
        Commands::Parse { .. } => Ok(()),
        Commands::Ingest { path, name, crypto_only, exclude, matches_out } => commands::run_ingest(
            &ctx,
            commands::IngestArgs { path, name, crypto_only, exclude, matches_out },
        ),
        Commands::Project { action } => match action {
            ProjectAction::Add { name } => commands::run_project_add(&ctx, &name),
            ProjectAction::List { json } => commands::run_project_list(&ctx, json),
            ProjectAction::Delete { project_id } => commands::run_project_delete(&ctx, &project_id),
        },
        Commands::Files { project_id, json } => commands::run_files(&ctx, &project_id, json),
        Commands::Asts { project_id, json } => commands::run_asts(&ctx, &project_id, json),
        Commands::Export { project_id, out } => commands::run_export(&ctx, &project_id, &out),
        Commands::Stats => commands::run_stats(&ctx),
    }
}
