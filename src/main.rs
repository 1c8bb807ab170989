use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use sl_cricket_dataset::config::Config;
use sl_cricket_dataset::constants::DEFAULT_TOP_N;
use sl_cricket_dataset::error::DatasetError;
use sl_cricket_dataset::extract::{extract_directory, sort_rows};
use sl_cricket_dataset::fetch::{fetch_all, local_sources};
use sl_cricket_dataset::logging;
use sl_cricket_dataset::metrics::init_metrics;
use sl_cricket_dataset::pipeline::summary::ValidationSummary;
use sl_cricket_dataset::pipeline::ValidationPipeline;
use sl_cricket_dataset::release::{git_commit, git_push, publish_release};
use sl_cricket_dataset::report::{render_charts, render_text, update_readme, DatasetStats};
use sl_cricket_dataset::storage;

#[derive(Parser)]
#[command(name = "sl_cricket_dataset")]
#[command(about = "Sri Lanka international cricket match dataset builder")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to config.toml (defaults to $CRICKET_CONFIG, then ./config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download match archives and extract the raw CSV
    Build {
        /// Reuse archives extracted by an earlier run
        #[arg(long)]
        offline: bool,
    },
    /// Validate the raw CSV into the cleaned CSV and a summary
    Clean,
    /// Print statistics for the cleaned CSV
    Report {
        /// How many opponents and venues to list
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// Rewrite the dataset figures in the README
        #[arg(long)]
        update_readme: bool,
        /// Write SVG charts into this directory
        #[arg(long, value_name = "DIR")]
        charts: Option<PathBuf>,
    },
    /// Build, clean, report and publish the release folder in one go
    Update {
        #[arg(long)]
        offline: bool,
        /// Commit the refreshed files
        #[arg(long)]
        commit: bool,
        /// Push after committing
        #[arg(long, requires = "commit")]
        push: bool,
        /// Write SVG charts into this directory
        #[arg(long, value_name = "DIR")]
        charts: Option<PathBuf>,
    },
}

async fn build(config: &Config, offline: bool) -> anyhow::Result<usize> {
    let work_dir = &config.paths.work_dir;
    let sources = if offline {
        info!("Offline mode: using archives under {}", work_dir.display());
        local_sources(&config.sources, work_dir)
    } else {
        fetch_all(&config.sources, work_dir).await?
    };

    let mut rows = Vec::new();
    for (source, dir) in &sources {
        let batch = extract_directory(dir, source.format, &config.team, config.team.start_year)
            .with_context(|| format!("extracting {} matches from {}", source.format, dir.display()))?;
        println!(
            "   {}: {} matches ({} files, {} unreadable)",
            source.format, batch.stats.matches_kept, batch.stats.files_seen, batch.stats.unreadable
        );
        rows.extend(batch.rows);
    }

    if rows.is_empty() {
        return Err(DatasetError::EmptyDataset(format!(
            "no {} matches from {} onwards in any source",
            config.team.name, config.team.start_year
        ))
        .into());
    }

    sort_rows(&mut rows);
    storage::write_raw_rows(&config.paths.raw_csv, &rows)?;
    println!("✅ {} raw matches saved to {}", rows.len(), config.paths.raw_csv.display());
    Ok(rows.len())
}

fn print_summary(summary: &ValidationSummary) {
    println!("\n📊 Validation summary");
    println!("   Rows before:     {}", summary.total_rows_before);
    println!("   Rows after:      {}", summary.total_rows_after);
    println!("   Invalid removed: {}", summary.invalid_rows_removed);
    println!("   Duplicates:      {}", summary.duplicates_removed);
    println!("   Retained:        {:.2}%", summary.retention_pct());
    for (kind, count) in &summary.issues {
        println!("   - {:?}: {}", kind, count);
    }
}

fn clean(config: &Config) -> anyhow::Result<ValidationSummary> {
    let table = storage::read_table(&config.paths.raw_csv)
        .with_context(|| format!("reading {}", config.paths.raw_csv.display()))?;
    let output = ValidationPipeline::new(config.team.clone()).run(&table)?;

    storage::write_clean(&config.paths.clean_csv, &output.records, &config.team)?;
    storage::write_summary(&config.paths.summary_json, &output.summary)?;
    print_summary(&output.summary);
    println!("✅ Cleaned dataset saved to {}", config.paths.clean_csv.display());
    Ok(output.summary)
}

fn report(
    config: &Config,
    top: usize,
    json: bool,
    patch_readme: bool,
    charts: Option<&Path>,
) -> anyhow::Result<DatasetStats> {
    let records = storage::read_clean(&config.paths.clean_csv, &config.team)
        .with_context(|| format!("reading {}", config.paths.clean_csv.display()))?;
    let stats = DatasetStats::compute(&records, top);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", render_text(&stats, &config.team.name));
    }

    if patch_readme {
        let readme = &config.paths.readme;
        let text = fs::read_to_string(readme)
            .with_context(|| format!("reading {}", readme.display()))?;
        let today = chrono::Local::now().date_naive();
        fs::write(readme, update_readme(&text, &stats, today))?;
        println!("✅ README updated");
    }

    if let Some(dir) = charts {
        let written = render_charts(&stats, &config.team.name, dir)?;
        println!("✅ {} charts saved to {}", written.len(), dir.display());
    }
    Ok(stats)
}

async fn update(
    config: &Config,
    offline: bool,
    commit: bool,
    push: bool,
    charts: Option<&Path>,
) -> anyhow::Result<()> {
    println!("🚀 Updating {} dataset", config.team.name);

    println!("\n📥 Step 1: Building raw dataset...");
    build(config, offline).await?;

    println!("\n🧹 Step 2: Cleaning...");
    clean(config)?;

    println!("\n📈 Step 3: Reporting...");
    let stats = match report(config, DEFAULT_TOP_N, false, config.paths.readme.is_file(), charts) {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!("Report step failed: {:#}", e);
            None
        }
    };

    println!("\n📦 Step 4: Publishing release folder...");
    if let Err(e) = publish_release(
        &config.paths.clean_csv,
        &config.paths.data_dictionary,
        &config.paths.release_dir,
    ) {
        warn!("Could not publish release folder: {}", e);
    }

    if commit {
        let total = stats.map(|s| s.total_matches.to_string()).unwrap_or_else(|| "unknown".into());
        let message = format!(
            "Auto-update dataset: {} matches as of {}",
            total,
            chrono::Local::now().format("%Y-%m-%d")
        );
        match git_commit(&message) {
            Ok(()) if push => {
                if let Err(e) = git_push("origin", "main") {
                    warn!("{}", e);
                    println!("⚠️  Could not push. Push manually with: git push origin main");
                }
            }
            Ok(()) => {}
            Err(e) => warn!("{}", e),
        }
    }

    println!("\n✅ Update complete");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();
    init_metrics();

    let cli = Cli::parse();
    let config_path = Config::resolve_path(cli.config.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let result = match cli.command {
        Commands::Build { offline } => build(&config, offline).await.map(|_| ()),
        Commands::Clean => clean(&config).map(|_| ()),
        Commands::Report { top, json, update_readme, charts } => {
            report(&config, top, json, update_readme, charts.as_deref()).map(|_| ())
        }
        Commands::Update { offline, commit, push, charts } => {
            update(&config, offline, commit, push, charts.as_deref()).await
        }
    };

    if let Err(e) = &result {
        error!("{:#}", e);
        println!("❌ {:#}", e);
    }
    result
}
