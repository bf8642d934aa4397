mod demo;
mod error;
mod format;
mod http;
mod model;
mod scrape;
mod settings;
mod store;
mod upload;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use settings::Settings;
use scrape::site::SiteProfile;

#[derive(Parser)]
#[command(
    name = "component_dataset",
    about = "Build a UI-component fine-tuning dataset from Magic UI and Aceternity UI docs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape component pages into data/raw/<source>.json
    Scrape {
        /// Source to scrape (magicui, aceternity); repeatable. Default: all
        #[arg(short, long = "source")]
        sources: Vec<String>,
        /// Max components per source
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Format raw files into the processed JSONL dataset
    Format,
    /// Scrape + format in one go
    Run {
        /// Max components per source
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Upload the processed dataset to the Hugging Face Hub
    Upload {
        /// Dataset file (default: <processed_dir>/<dataset_file>)
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Target repo id, `name` or `namespace/name`
        #[arg(short, long)]
        repo: Option<String>,
        /// Create the repo as public
        #[arg(long)]
        public: bool,
    },
    /// Generate a component from a description (interactive without PROMPT)
    Generate {
        prompt: Option<String>,
    },
    /// Show raw and processed dataset counts
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    let result = match cli.command {
        Commands::Scrape { sources, limit } => {
            let profiles = select_profiles(&sources)?;
            let interrupt = install_interrupt_handler();
            let reports = scrape::scrape_sites(&settings, profiles, limit, &interrupt)?;
            for r in &reports {
                println!(
                    "{}: {} components ({} from templates, {} not found, {} failed){}",
                    r.source,
                    r.components.len(),
                    r.fallbacks(),
                    r.not_found.len(),
                    r.failed.len(),
                    if r.interrupted { " [interrupted]" } else { "" }
                );
            }
            Ok(())
        }
        Commands::Format => run_format(&settings),
        Commands::Run { limit } => {
            let interrupt = install_interrupt_handler();

            let t_scrape = Instant::now();
            let reports = scrape::scrape_sites(&settings, SiteProfile::all(), limit, &interrupt)?;
            let total: usize = reports.iter().map(|r| r.components.len()).sum();
            println!(
                "Scraped {} components from {} sources in {:.1}s",
                total,
                reports.len(),
                t_scrape.elapsed().as_secs_f64()
            );
            if interrupt.load(Ordering::SeqCst) {
                println!("Interrupted; formatting what was saved.");
            }
            run_format(&settings)
        }
        Commands::Upload { file, repo, public } => {
            let file = file.unwrap_or_else(|| settings.dataset_path());
            let repo = repo.unwrap_or_else(|| settings.hub.repo_id.clone());
            let private = settings.hub.private && !public;
            let repo_id = upload::upload_dataset(&settings.hub, &file, &repo, private)?;
            println!("Dataset successfully uploaded to {}", repo_id);
            Ok(())
        }
        Commands::Generate { prompt } => {
            let generator = demo::HubInference::from_settings(&settings.hub)?;
            match prompt {
                Some(p) => {
                    let value = demo::answer(&generator, &p)?;
                    println!("{}", serde_json::to_string_pretty(&value)?);
                    Ok(())
                }
                None => demo::run_interactive(&generator),
            }
        }
        Commands::Stats => print_stats(&settings),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn select_profiles(names: &[String]) -> Result<Vec<SiteProfile>> {
    if names.is_empty() {
        return Ok(SiteProfile::all());
    }
    let mut profiles = Vec::new();
    for name in names {
        match SiteProfile::by_name(name) {
            Some(p) => profiles.push(p),
            None => bail!("Unknown source '{}' (expected magicui or aceternity)", name),
        }
    }
    Ok(profiles)
}

/// Ctrl-C flips the returned flag; scrapers stop at the next slug and save what they have.
fn install_interrupt_handler() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }
    flag
}

fn run_format(settings: &Settings) -> Result<()> {
    let output = settings.dataset_path();
    let report = format::format_dataset(&settings.raw_dir, &settings.sources, &output)?;
    if !report.skipped_files.is_empty() {
        println!("Skipped sources: {}", report.skipped_files.join(", "));
    }
    println!(
        "Formatted {} of {} items ({} dropped) into {}",
        report.written,
        report.loaded,
        report.dropped,
        output.display()
    );
    Ok(())
}

fn print_stats(settings: &Settings) -> Result<()> {
    println!("{:<12} | {:>7} | {}", "Source", "Records", "File");
    println!("{}", "-".repeat(60));
    for source in &settings.sources {
        let path = settings.raw_path(source);
        let count = match store::read_raw(&path) {
            Ok(value) => store::count_records(&value)
                .map(|n| n.to_string())
                .unwrap_or_else(|| "?".into()),
            Err(_) => "-".into(),
        };
        println!(
            "{:<12} | {:>7} | {}",
            truncate(source, 12),
            count,
            path.display()
        );
    }

    let dataset = settings.dataset_path();
    match std::fs::read_to_string(&dataset) {
        Ok(text) => {
            let rows = text.lines().filter(|l| !l.trim().is_empty()).count();
            println!("\nProcessed: {} rows in {}", rows, dataset.display());
        }
        Err(_) => println!("\nProcessed: none yet ({})", dataset.display()),
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_default_to_all() {
        let all = select_profiles(&[]).unwrap();
        assert_eq!(all.len(), 2);
        let one = select_profiles(&["aceternity".to_string()]).unwrap();
        assert_eq!(one[0].source, "aceternity");
        assert!(select_profiles(&["shadcn".to_string()]).is_err());
    }

    #[test]
    fn durations_and_truncation() {
        assert_eq!(format_duration(std::time::Duration::from_secs(75)), "1m 15s");
        assert_eq!(format_duration(std::time::Duration::from_secs(3725)), "1h 2m 5s");
        assert_eq!(truncate("aceternity-extra", 10), "aceternity...");
        assert_eq!(truncate("magicui", 10), "magicui");
    }
}
