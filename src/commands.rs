use astvault::config::{self, AstVaultConfig};
use astvault::extract::{AstExtractor, ExtractOptions};
use astvault::ingest::{IngestOptions, Ingestor};
use astvault::ui::{self, Outcome};
use astvault::{ProjectId, SqliteStore};
use std::path::{Path, PathBuf};

/// Settings shared by every command that touches the store
pub struct Context {
    pub database: PathBuf,
    pub config_path: PathBuf,
    pub config: AstVaultConfig,
}

impl Context {
    pub fn load(database: Option<&Path>, config_path: Option<&Path>) -> anyhow::Result<Self> {
        let loaded = config::load_config(config_path)?;
        let database = config::resolve_database(database, loaded.as_ref());
        Ok(Self {
            database,
            config_path: config_path.map(Path::to_path_buf).unwrap_or_else(config::default_config_path),
            config: loaded.unwrap_or_default(),
        })
    }

    fn open_store(&self) -> anyhow::Result<SqliteStore> {
        config::ensure_db_dir(&self.database)?;
        Ok(SqliteStore::open(&self.database)?)
    }
}

/// Options of the `ingest` command
pub struct IngestArgs {
    pub path: PathBuf,
    pub name: Option<String>,
    pub crypto_only: bool,
    pub exclude: Vec<String>,
    pub matches_out: Option<PathBuf>,
}

pub fn run_init(ctx: &Context, write_config: bool, force: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    ui::report(Outcome::StoreReady {
        path: &ctx.database,
        journal_mode: &store.journal_mode()?,
    });

    if write_config {
        let resolved = AstVaultConfig {
            database: Some(ctx.database.display().to_string()),
            ..ctx.config.clone()
        };
        config::write_config(&ctx.config_path, &resolved, force)?;
        ui::report(Outcome::ConfigWritten(&ctx.config_path));
    }
    Ok(())
}

pub fn run_rebuild(ctx: &Context) -> anyhow::Result<()> {
    ui::heading(&format!("Rebuilding database at {}...", ctx.database.display()));
    config::ensure_db_dir(&ctx.database)?;

    let (store, report) = SqliteStore::rebuild(&ctx.database)?;
    ui::report(Outcome::StoreRebuilt {
        report: &report,
        foreign_keys: store.foreign_keys_enabled()?,
    });
    Ok(())
}

pub fn run_clear(ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let removed = store.stats()?;
    store.clear_all()?;
    ui::report(Outcome::StoreCleared(removed));
    Ok(())
}

/// Needs no store or config, so a broken config file cannot block it
pub fn run_parse(file: &Path, tokens: bool) -> anyhow::Result<()> {
    let extractor = AstExtractor::with_options(ExtractOptions { anonymous_tokens: tokens });
    let extraction = extractor.extract_file(file)?;
    println!("{}", extraction.to_json_line()?);
    Ok(())
}

pub fn run_ingest(ctx: &Context, args: IngestArgs) -> anyhow::Result<()> {
    let project_name = args.name.unwrap_or_else(|| {
        args.path
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|s| s.to_string_lossy().to_string()))
            .unwrap_or_else(|| "unknown".to_string())
    });

    let mut excludes = ctx.config.exclude.clone();
    excludes.extend(args.exclude);

    let options = IngestOptions {
        crypto_only: args.crypto_only || ctx.config.crypto_only.unwrap_or(false),
        excludes,
        progress: true,
    };

    ui::heading(&format!(
        "Ingesting {} from {} into {}",
        project_name,
        args.path.display(),
        ctx.database.display()
    ));

    let store = ctx.open_store()?;
    let report = Ingestor::new(&store, AstExtractor::new(), options).run(&args.path, &project_name)?;

    if let Some(out) = &args.matches_out {
        report.write_matches(out)?;
        tracing::info!("Wrote crypto matches to {}", out.display());
    }

    ui::ingest_summary(&report);
    Ok(())
}

pub fn run_project_add(ctx: &Context, name: &str) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let id = store.insert_project(name)?;
    println!("{}", id);
    Ok(())
}

pub fn run_project_list(ctx: &Context, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let projects = store.list_projects()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else if projects.is_empty() {
        ui::report(Outcome::Empty("projects"));
    } else {
        println!("{}", ui::projects_table(&projects));
    }
    Ok(())
}

pub fn run_project_delete(ctx: &Context, project_id: &str) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    if store.delete_project(&ProjectId::from(project_id))? {
        ui::report(Outcome::ProjectDeleted(project_id));
    } else {
        ui::report(Outcome::ProjectMissing(project_id));
    }
    Ok(())
}

/// Heading naming the project, or a notice when the id is unknown
fn project_heading(store: &SqliteStore, project_id: &ProjectId, what: &str) -> anyhow::Result<bool> {
    match store.get_project(project_id)? {
        Some(project) => {
            ui::heading(&format!("{} of {}", what, project.project_name));
            Ok(true)
        }
        None => {
            ui::report(Outcome::ProjectMissing(project_id.as_str()));
            Ok(false)
        }
    }
}

pub fn run_files(ctx: &Context, project_id: &str, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let project_id = ProjectId::from(project_id);
    let files = store.get_project_files(&project_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
    } else if project_heading(&store, &project_id, "Files")? {
        if files.is_empty() {
            ui::report(Outcome::Empty("files"));
        } else {
            println!("{}", ui::files_table(&files));
        }
    }
    Ok(())
}

pub fn run_asts(ctx: &Context, project_id: &str, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let project_id = ProjectId::from(project_id);
    let asts = store.get_project_asts(&project_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&asts)?);
    } else if project_heading(&store, &project_id, "ASTs")? {
        if asts.is_empty() {
            ui::report(Outcome::Empty("ASTs"));
        } else {
            println!("{}", ui::asts_table(&asts));
        }
    }
    Ok(())
}

pub fn run_export(ctx: &Context, project_id: &str, out: &Path) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let summary = astvault::export::export_project(&store, &ProjectId::from(project_id), out)?;
    ui::report(Outcome::Exported {
        asts: summary.total_files,
        path: &summary.output_path,
    });
    Ok(())
}

pub fn run_stats(ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    ui::heading(&format!("astvault statistics for {}", ctx.database.display()));
    println!("{}", ui::stats_table(&store.stats()?, &store.journal_mode()?));
    Ok(())
}
