//! Run the OCR-to-metadata step for one process directory.
//!
//! Usage:
//!   ocr_to_metadata --process-dir DIR --title TITLE --ruleset FILE --field NAME
//!   ocr_to_metadata --process-dir DIR --title TITLE --ruleset FILE \
//!       --config plugin_config.xml [--project P] [--step S]
//!
//! Options:
//!   --id N      process id used for journal entries (default 0: no journal)
//!   --strict    fail the run on the first unreadable OCR file
//!
//! Logging is controlled by RUST_LOG (default: info).

use ocr_to_metadata::config::{FailurePolicy, PluginConfig, StepConfig};
use ocr_to_metadata::journal::LogJournal;
use ocr_to_metadata::metadata::{JsonRecordStore, Ruleset};
use ocr_to_metadata::storage::LocalStorage;
use ocr_to_metadata::step::{OcrToMetadataStep, StepOutcome};
use ocr_to_metadata::work_item::WorkItem;
use std::path::PathBuf;

#[derive(Default)]
struct RunArgs {
    process_dir: Option<PathBuf>,
    title: Option<String>,
    ruleset: Option<PathBuf>,
    field: Option<String>,
    config: Option<PathBuf>,
    project: String,
    step: String,
    id: i64,
    strict: bool,
}

impl RunArgs {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut parsed = RunArgs {
            project: "*".to_string(),
            step: "*".to_string(),
            ..Default::default()
        };

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            let mut value = || -> Result<String, String> {
                i += 1;
                args.get(i).cloned().ok_or_else(|| format!("{} needs a value", flag))
            };

            match flag {
                "--process-dir" => parsed.process_dir = Some(PathBuf::from(value()?)),
                "--title" => parsed.title = Some(value()?),
                "--ruleset" => parsed.ruleset = Some(PathBuf::from(value()?)),
                "--field" => parsed.field = Some(value()?),
                "--config" => parsed.config = Some(PathBuf::from(value()?)),
                "--project" => parsed.project = value()?,
                "--step" => parsed.step = value()?,
                "--id" => {
                    let raw = value()?;
                    parsed.id = raw.parse().map_err(|_| format!("invalid --id '{}'", raw))?;
                },
                "--strict" => parsed.strict = true,
                other => return Err(format!("unknown argument '{}'", other)),
            }
            i += 1;
        }

        Ok(parsed)
    }

    fn step_config(&self) -> Result<StepConfig, Box<dyn std::error::Error>> {
        let mut config = match (&self.field, &self.config) {
            (Some(field), _) => StepConfig::new(field.clone()),
            (None, Some(path)) => PluginConfig::from_file(path)?.select(&self.project, &self.step)?,
            (None, None) => return Err("either --field or --config is required".into()),
        };
        if self.strict {
            config = config.with_failure_policy(FailurePolicy::Abort);
        }
        Ok(config)
    }
}

fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let args = RunArgs::from_args()?;
    let process_dir = args.process_dir.clone().ok_or("--process-dir is required")?;
    let title = args.title.clone().ok_or("--title is required")?;
    let ruleset_path = args.ruleset.clone().ok_or("--ruleset is required")?;

    let config = args.step_config()?;
    let ruleset = Ruleset::from_json_file(&ruleset_path)?;
    let store = JsonRecordStore::new();
    let item = WorkItem::from_process_dir(args.id, title, process_dir);

    let step = OcrToMetadataStep::new(config, &LocalStorage, &store, &ruleset, &LogJournal);
    match step.run(&item) {
        StepOutcome::Finish(summary) => {
            println!(
                "{} '{}' with {} characters from {} file(s) in {}",
                if summary.replaced { "Replaced" } else { "Added" },
                step.config().metadata_field,
                summary.text_chars,
                summary.files_read,
                summary.directory.display()
            );
            if summary.files_failed > 0 {
                println!("{} file(s) could not be read", summary.files_failed);
            }
            Ok(true)
        },
        StepOutcome::Error(reason) => {
            eprintln!("Error: {}", reason);
            Ok(false)
        },
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(true) => {},
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        },
    }
}
