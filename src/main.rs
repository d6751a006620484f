//! slide-inserter - batch image insertion into PowerPoint presentations
//!
//! Runs YAML batch jobs and offers a few inspection commands for decks.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use slide_inserter::backup::{self, BackupConfig};
use slide_inserter::inserter::{self, extract_all_metadata, get_all_positions, get_position, list_slides};
use slide_inserter::{BatchConfig, Result, batch};

/// Template-driven batch image insertion for PowerPoint
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a batch job described by a YAML file
    Batch {
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },
    /// List slides with their titles
    List {
        #[arg(value_name = "PPTX")]
        pptx: PathBuf,
    },
    /// Print the source of every inserted picture as YAML
    Metadata {
        #[arg(value_name = "PPTX")]
        pptx: PathBuf,
    },
    /// Print picture boxes of a slide, in inches
    Position {
        #[arg(value_name = "PPTX")]
        pptx: PathBuf,
        /// Zero-based slide index
        slide: usize,
        /// Only this picture (zero-based, document order)
        #[arg(short, long)]
        picture: Option<usize>,
    },
    /// Take a tiered snapshot of a file now
    Backup {
        #[arg(value_name = "PPTX")]
        pptx: PathBuf,
        /// Snapshot root directory
        #[arg(short, long, default_value = "PPT/backups")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match execute(cli.command) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Command) -> Result<ExitCode> {
    match command {
        Command::Batch { config } => {
            let config = BatchConfig::from_file(&config)?;
            let summary = batch::run(&config)?;
            println!(
                "{} created, {} failed, {} deleted; {} now has {} slides",
                summary.succeeded,
                summary.failed,
                summary.deleted,
                summary.output.display(),
                summary.slide_count
            );
            if summary.failed > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::List { pptx } => {
            let pres = inserter::open_presentation(&pptx)?;
            for line in list_slides(&pres) {
                println!("{line}");
            }
        }
        Command::Metadata { pptx } => {
            let pres = inserter::open_presentation(&pptx)?;
            let records = extract_all_metadata(&pres);
            let yaml = serde_saphyr::to_string(&records)
                .map_err(|e| slide_inserter::Error::InvalidArgument(format!("cannot render metadata: {e}")))?;
            print!("{yaml}");
        }
        Command::Position { pptx, slide, picture } => {
            let pres = inserter::open_presentation(&pptx)?;
            let count = pres.slide_count();
            let target = pres
                .slide(slide)
                .ok_or(slide_inserter::Error::InvalidIndex { index: slide, count })?;
            let positions = match picture {
                Some(i) => vec![get_position(target, i)?],
                None => get_all_positions(target)?,
            };
            for (i, p) in positions.iter().enumerate() {
                println!(
                    "{}: left={:.3} top={:.3} width={:.3} height={:.3}",
                    picture.unwrap_or(i),
                    p.left,
                    p.top,
                    p.width,
                    p.height
                );
            }
        }
        Command::Backup { pptx, dir } => {
            let written = backup::backup(&pptx, &BackupConfig::new(dir))?;
            for (category, path) in &written {
                println!("{category}: {}", path.display());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
