//! segcurate command-line front end.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use segcurate::model::{Point, metric_stats};
use segcurate::selection::hit_test;
use segcurate::settings::{AppSettings, LogLevel, SETTINGS_FILE};
use segcurate::store::{CurationStore, load_regions};
use segcurate::undo::UndoConfig;
use segcurate::{CurateError, CurationSession, Result};

#[derive(Debug, Parser)]
#[command(
    name = "segcurate",
    about = "Curate segmentation annotations with filter trees and classification rules",
    version
)]
struct Cli {
    /// Log verbosity (error, warn, info, debug, trace); overrides settings
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the region ids hidden by the saved filter tree.
    Filter {
        /// Region list (JSON array)
        #[arg(long)]
        regions: PathBuf,
        /// Curation state directory
        #[arg(long)]
        state: Option<PathBuf>,
        /// Persist the refreshed excluded ids
        #[arg(long)]
        write: bool,
    },

    /// Run the enabled classification rules in order.
    Classify {
        /// Region list (JSON array)
        #[arg(long)]
        regions: PathBuf,
        /// Curation state directory
        #[arg(long)]
        state: Option<PathBuf>,
        /// Report rule hits without saving the classification
        #[arg(long)]
        dry_run: bool,
    },

    /// Print min/max of every metric.
    Stats {
        /// Region list (JSON array)
        #[arg(long)]
        regions: PathBuf,
    },

    /// Print the topmost region containing a point.
    Hit {
        /// Region list (JSON array)
        #[arg(long)]
        regions: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
    },

    /// Show the effective settings, optionally storing changes.
    Settings {
        /// Default curation state directory
        #[arg(long)]
        state_dir: Option<PathBuf>,
        /// Maximum undo steps per session
        #[arg(long)]
        undo_history: Option<usize>,
        /// Write the result to the settings file
        #[arg(long)]
        save: bool,
        /// Settings file to write instead of the default location
        #[arg(long, requires = "save")]
        file: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = AppSettings::load_or_default();
    let level = cli.log_level.unwrap_or(settings.log_level);

    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();

    match run(cli.command, cli.log_level, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("segcurate: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, log_level: Option<LogLevel>, settings: &AppSettings) -> Result<()> {
    match command {
        Commands::Filter {
            regions,
            state,
            write,
        } => run_filter(&regions, &state_dir(state, settings), write),
        Commands::Classify {
            regions,
            state,
            dry_run,
        } => run_classify(&regions, &state_dir(state, settings), dry_run, settings),
        Commands::Stats { regions } => {
            for (metric, range) in metric_stats(&load_regions(&regions)?) {
                println!("{metric}\t{}\t{}", range.min, range.max);
            }
            Ok(())
        }
        Commands::Hit { regions, x, y } => {
            match hit_test(&load_regions(&regions)?, Point::new(x, y)) {
                Some(id) => println!("{id}"),
                None => println!("none"),
            }
            Ok(())
        }
        Commands::Settings {
            state_dir,
            undo_history,
            save,
            file,
        } => {
            let mut updated = settings.clone();
            if let Some(level) = log_level {
                updated.log_level = level;
            }
            if state_dir.is_some() {
                updated.default_state_dir = state_dir;
            }
            if let Some(steps) = undo_history {
                updated.undo_history = steps;
            }
            println!("{}", updated.to_json()?);

            if save {
                let path = file.or_else(AppSettings::default_path).ok_or_else(|| {
                    CurateError::io(
                        SETTINGS_FILE,
                        std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "no config directory for settings",
                        ),
                    )
                })?;
                updated.save(&path)?;
            }
            Ok(())
        }
    }
}

/// Explicit directory, else the configured default, else the working directory.
fn state_dir(explicit: Option<PathBuf>, settings: &AppSettings) -> PathBuf {
    explicit
        .or_else(|| settings.default_state_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn run_filter(regions: &Path, state: &Path, write: bool) -> Result<()> {
    let regions = load_regions(regions)?;
    let store = CurationStore::new(state);
    let mut filter = store.load()?.filter;

    filter.refresh_excluded(&regions);
    log::info!(
        "Filter hides {} of {} regions",
        filter.excluded_ids.len(),
        regions.len()
    );
    for id in &filter.excluded_ids {
        println!("{id}");
    }

    if write {
        store.save_filter(&filter)?;
    }
    Ok(())
}

fn run_classify(regions: &Path, state: &Path, dry_run: bool, settings: &AppSettings) -> Result<()> {
    let regions = load_regions(regions)?;
    let store = CurationStore::new(state);
    let mut session = CurationSession::with_history(
        regions,
        store.load()?,
        UndoConfig {
            max_history: settings.undo_history,
        },
    );

    for outcome in session.run_rules() {
        let name = session
            .rules()
            .get(outcome.rule_id)
            .map_or("?", |rule| rule.name.as_str());
        println!("{}\t{}\t{}", outcome.rule_id, name, outcome.targets);
    }

    if dry_run {
        log::info!("Dry run: classification not saved");
    } else {
        store.save_classification(&session.edits().classification)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "segcurate",
            "--log-level",
            "debug",
            "hit",
            "--regions",
            "r.json",
            "--x",
            "-4.5",
            "--y",
            "2",
        ])
        .expect("parse hit");
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert!(matches!(cli.command, Commands::Hit { x, .. } if x == -4.5));

        let cli = Cli::try_parse_from(["segcurate", "classify", "--regions", "r.json", "--dry-run"])
            .expect("parse classify");
        assert!(matches!(
            cli.command,
            Commands::Classify {
                state: None,
                dry_run: true,
                ..
            }
        ));
    }

    #[test]
    fn test_settings_command_saves_overrides() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let file = tmp.path().join("config").join(SETTINGS_FILE);
        let cli = Cli::try_parse_from([
            "segcurate",
            "--log-level",
            "warn",
            "settings",
            "--undo-history",
            "12",
            "--save",
            "--file",
            file.to_str().expect("utf-8 temp path"),
        ])
        .expect("parse settings");

        run(cli.command, cli.log_level, &AppSettings::default()).expect("save settings");
        let saved = AppSettings::load(&file)
            .expect("load settings")
            .expect("settings written");
        assert_eq!(saved.log_level, LogLevel::Warn);
        assert_eq!(saved.undo_history, 12);
        assert_eq!(saved.default_state_dir, None);

        assert!(Cli::try_parse_from(["segcurate", "settings", "--file", "x.json"]).is_err());
    }

    #[test]
    fn test_state_dir_fallbacks() {
        let settings = AppSettings {
            default_state_dir: Some(PathBuf::from("/configured")),
            ..AppSettings::default()
        };
        assert_eq!(
            state_dir(Some(PathBuf::from("/explicit")), &settings),
            PathBuf::from("/explicit")
        );
        assert_eq!(state_dir(None, &settings), PathBuf::from("/configured"));
        assert_eq!(state_dir(None, &AppSettings::default()), PathBuf::from("."));
    }

    #[test]
    fn test_classify_writes_classification() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let regions = tmp.path().join("regions.json");
        std::fs::write(
            &regions,
            r#"[{"id": 5, "bbox": [0, 0, 1, 1], "points": [], "metrics": {"Area": 3}}]"#,
        )
        .expect("write regions");
        std::fs::write(
            tmp.path().join(CurationStore::RULES_FILE),
            r#"[{"id": 1, "name": "all", "enabled": true, "fromClass": "any", "toClass": 2,
                 "filter": {"id": 1, "action": "keep", "logic": "AND", "children": [], "enabled": true}}]"#,
        )
        .expect("write rules");

        run_classify(&regions, tmp.path(), true, &AppSettings::default()).expect("dry run");
        assert!(!tmp.path().join(CurationStore::CLASSIFICATION_FILE).exists());

        run_classify(&regions, tmp.path(), false, &AppSettings::default()).expect("classify");
        let state = CurationStore::new(tmp.path()).load().expect("load");
        assert_eq!(state.edits.classification.get(5), Some(2));
    }
}
