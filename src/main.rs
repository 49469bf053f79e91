use anyhow::{Context, Result};
use clap::Parser;
use modules::lfs::{self, GitLfsCli};
use modules::scanner::Scanner;
use utils::terminal;

mod modules;
mod utils;

#[derive(Parser)]
#[command(name = "lfs-auto")]
#[command(
    about = "Finds files over a size threshold and registers them with Git LFS",
    long_about = None
)]
struct Cli {
    /// Size threshold in MiB; files strictly larger are registered (overrides config)
    #[arg(short, long)]
    threshold: Option<u64>,
    /// Output format: text (default), json
    #[arg(long, default_value = "text")]
    format: String,
    /// List matching files without invoking git or git-lfs
    #[arg(long)]
    dry_run: bool,
    /// Exit immediately instead of waiting for a final keypress
    #[arg(long)]
    no_pause: bool,
}

enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = utils::logging::init() {
        terminal::warn(&format!("Diagnostic log unavailable: {e:#}"));
    }

    let format = match cli.format.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Text,
    };

    // Nothing propagates past this point: failures are logged with context and
    // summarized, and the closing prompt is still shown, exiting cleanly.
    if let Err(e) = run(&cli, &format) {
        tracing::error!("run failed: {e:#}");
        terminal::warn(&format!(
            "Failed: {e:#} (details in {})",
            utils::logging::LOG_FILE
        ));
    }

    if !cli.no_pause {
        terminal::pause_for_exit();
    }
}

fn run(cli: &Cli, format: &OutputFormat) -> Result<()> {
    let cfg = utils::config::load();
    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    let is_text = matches!(format, OutputFormat::Text);

    let threshold_mib = cli.threshold.unwrap_or(cfg.scan.threshold_mib);
    let threshold_bytes = threshold_mib * 1024 * 1024;
    tracing::info!(
        "scanning {} with threshold {} MiB",
        cwd.display(),
        threshold_mib
    );
    if is_text {
        terminal::info(&format!(
            "Scanning {} for files over {} MiB...",
            cwd.display(),
            threshold_mib
        ));
    }

    let spinner = is_text.then(|| terminal::create_spinner("Walking directory tree..."));
    let files = Scanner::new(&cwd, threshold_bytes).scan()?;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    for file in &files {
        tracing::debug!("found large file: {file}");
    }

    match format {
        OutputFormat::Json => output_json(&files)?,
        OutputFormat::Text => {
            if files.is_empty() {
                terminal::success("No large files found.");
            } else {
                println!("Found large files:");
                for file in &files {
                    println!("  {file}");
                }
            }
        }
    }

    if files.is_empty() {
        tracing::info!("no large files found");
        return Ok(());
    }

    if cli.dry_run {
        tracing::info!("dry run, skipping git-lfs registration");
        if is_text {
            terminal::info("Dry run: skipping Git LFS registration.");
        }
        return Ok(());
    }

    let gateway = GitLfsCli::new(&cwd);
    let count = lfs::register(&gateway, &files)?;
    if is_text {
        terminal::success(&format!("{count} file(s) added to Git LFS."));
    }
    Ok(())
}

fn output_json(files: &[String]) -> Result<()> {
    let out = serde_json::json!({
        "total": files.len(),
        "files": files,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
