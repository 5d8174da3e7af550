// ============================================================
// Layer 6 — Experiment Tracker
// ============================================================
// Local, file-backed experiment tracking. A run is a directory:
//
//   <root>/<entity>/<project>/<run-id>/
//     config.json     ← hyper-parameters, written once
//     metrics.jsonl   ← one JSON object per log() call
//
// Example metrics.jsonl:
//   {"step":0,"timestamp":"2026-10-19T12:00:01Z","autoencoder_loss":0.0412,...}
//   {"step":1,"timestamp":"2026-10-19T12:03:55Z","autoencoder_loss":0.0233,...}
//
// Each line is appended with OpenOptions(append), so a crash
// mid-run keeps every step logged so far.
//
// Reference: Rust Book §12 (I/O and File Handling)
//            serde_json documentation

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::traits::ExperimentTracker;

/// Project name every run in this repository is filed under.
pub const PROJECT: &str = "autoencoder";

const CONFIG_FILE:  &str = "config.json";
const METRICS_FILE: &str = "metrics.jsonl";

/// Writes run config and metric steps into a run directory.
pub struct FileTracker {
    run_dir: PathBuf,
    step:    u64,
}

impl FileTracker {
    /// Open a fresh run under `<root>/<entity>/<project>/`.
    /// The run id is the UTC start time; a numeric suffix is added
    /// if a run with the same id already exists.
    pub fn create(root: &Path, entity: &str, project: &str) -> Result<Self> {
        let parent = root.join(entity).join(project);
        fs::create_dir_all(&parent)
            .with_context(|| format!("Cannot create tracking directory '{}'", parent.display()))?;

        let base    = format!("run-{}", Utc::now().format("%Y%m%d-%H%M%S"));
        let mut run_dir = parent.join(&base);
        let mut n = 1;
        while run_dir.exists() {
            run_dir = parent.join(format!("{base}-{n}"));
            n += 1;
        }
        fs::create_dir(&run_dir)
            .with_context(|| format!("Cannot create run directory '{}'", run_dir.display()))?;

        tracing::info!("Tracking run at '{}'", run_dir.display());
        Ok(Self { run_dir, step: 0 })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }
}

impl ExperimentTracker for FileTracker {
    fn log_config(&mut self, config: &Value) -> Result<()> {
        let path = self.run_dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(config)?)
            .with_context(|| format!("Cannot write run config '{}'", path.display()))?;
        Ok(())
    }

    fn log(&mut self, metrics: &[(&str, f64)]) -> Result<()> {
        let mut row = Map::new();
        row.insert("step".into(), Value::from(self.step));
        row.insert(
            "timestamp".into(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        for (name, value) in metrics {
            // Non-finite values become null; JSON has no NaN
            row.insert((*name).to_string(), Value::from(*value));
        }

        let path  = self.run_dir.join(METRICS_FILE);
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Cannot open '{}'", path.display()))?;
        writeln!(f, "{}", Value::Object(row))?;

        tracing::debug!("Logged step {} to '{}'", self.step, path.display());
        self.step += 1;
        Ok(())
    }
}
