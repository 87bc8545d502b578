//! Command-line entry point.
//!
//! # Responsibility
//! - Wire files, config, logging and randomness to `constellation_core`.
//! - Keep all graph/layout semantics inside the core crate.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use constellation_core::{
    core_version, init_logging, load_note_records, write_constellation, Constellation,
    ConstellationConfig, ConstellationService, LoggingConfig,
};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "constellation")]
#[command(about = "Build a 3D note constellation from annotated notes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a constellation document from annotated notes
    Build {
        /// Annotated notes (`{"notes": [...]}` or a bare array)
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the constellation JSON
        #[arg(short, long, default_value = "data.json")]
        output: PathBuf,

        /// Optional JSON config overriding thresholds and layout constants
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for reproducible layouts
        #[arg(long)]
        seed: Option<u64>,

        /// Log level (trace|debug|info|warn|error)
        #[arg(long)]
        log_level: Option<String>,

        /// Absolute directory for rolling log files; stderr when omitted
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// Print the core version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            config,
            seed,
            log_level,
            log_dir,
        } => {
            let logging = logging_config(log_level, log_dir);
            init_logging(&logging).map_err(anyhow::Error::msg)?;
            run_build(input, output, config, seed)
        }
        Commands::Version => {
            println!("constellation_core version={}", core_version());
            Ok(())
        }
    }
}

fn run_build(
    input: PathBuf,
    output: PathBuf,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => ConstellationConfig::load(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConstellationConfig::default(),
    };
    let records = load_note_records(&input)
        .with_context(|| format!("loading notes {}", input.display()))?;
    info!(
        "event=build_start module=cli records={} seeded={}",
        records.len(),
        seed.is_some()
    );

    let service = ConstellationService::new(config)?;
    let constellation = match seed {
        Some(seed) => service.build(&records, &mut StdRng::seed_from_u64(seed))?,
        None => service.build_with_thread_rng(&records)?,
    };

    write_constellation(&output, &constellation)
        .with_context(|| format!("writing constellation {}", output.display()))?;

    println!("{}", build_summary(&constellation, &output));
    Ok(())
}

fn logging_config(level: Option<String>, log_dir: Option<PathBuf>) -> LoggingConfig {
    let mut config = LoggingConfig::stderr();
    if let Some(level) = level {
        config.level = level;
    }
    config.log_dir = log_dir;
    config
}

fn build_summary(constellation: &Constellation, output: &Path) -> String {
    let isolated = constellation.isolated_stars().len();
    info!("event=build_done module=cli status=ok isolated_stars={isolated}");
    format!(
        "constellation generated with {} stars ({} isolated) and {} connections -> {}",
        constellation.metadata.total_notes,
        isolated,
        constellation.metadata.total_connections,
        output.display()
    )
}

#[cfg(test)]
mod tests {
    use super::{build_summary, logging_config};
    use constellation_core::{
        default_log_level, ConstellationConfig, ConstellationService, NoteRecord, NoteSource,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::{Path, PathBuf};

    #[test]
    fn logging_defaults_to_stderr_at_build_level() {
        let config = logging_config(None, None);
        assert_eq!(config.level, default_log_level());
        assert!(config.log_dir.is_none());

        let config = logging_config(Some("debug".to_string()), Some(PathBuf::from("/tmp/logs")));
        assert_eq!(config.level, "debug");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn summary_reports_isolated_star_count() {
        let records = vec![
            NoteRecord::annotated("a", &["x", "y"], "A", NoteSource::AppleNotes),
            NoteRecord::annotated("b", &["x", "y"], "A", NoteSource::AppleNotes),
            NoteRecord::annotated("c", &["q"], "B", NoteSource::Claude),
        ];
        let constellation = ConstellationService::new(ConstellationConfig::default())
            .unwrap()
            .build(&records, &mut StdRng::seed_from_u64(7))
            .unwrap();

        let summary = build_summary(&constellation, Path::new("data.json"));
        assert!(summary.contains("3 stars (1 isolated)"));
        assert!(summary.ends_with("-> data.json"));
    }
}
