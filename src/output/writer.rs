use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::domain::{NoteParams, NoteStatusHistory, RaterParams, UnifiedRating};
use crate::errors::write_context;
use crate::scoring::{LossReport, TrainingOutcome};

pub const NOTE_PARAMS_FILE: &str = "note_params.tsv";
pub const RATER_PARAMS_FILE: &str = "rater_params.tsv";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";
pub const FILTERED_RATINGS_FILE: &str = "filtered_ratings.tsv";
pub const NOTE_STATUS_HISTORY_FILE: &str = "note_status_history.tsv";

/// Summary of one scoring run, written next to the parameter tables
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub num_ratings: usize,
    pub num_notes: usize,
    pub num_raters: usize,
    pub global_intercept: Option<f32>,
    pub factors_flipped: bool,
    pub final_loss: LossReport,
    pub config: AppConfig,
    pub completed_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn new(num_ratings: usize, outcome: &TrainingOutcome, config: &AppConfig) -> Self {
        Self {
            num_ratings,
            num_notes: outcome.note_params.len(),
            num_raters: outcome.rater_params.len(),
            global_intercept: outcome.global_intercept,
            factors_flipped: outcome.factors_flipped,
            final_loss: outcome.final_loss,
            config: config.clone(),
            completed_at: Utc::now(),
        }
    }
}

/// Writes run outputs as TSV tables and JSON into one directory
pub struct OutputWriter {
    output_dir: PathBuf,
}

impl OutputWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir).context("Failed to create output directory")?;
        Ok(Self { output_dir })
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Note parameters, highest intercept first
    pub fn write_note_params(&self, note_params: &[NoteParams]) -> Result<PathBuf> {
        let mut sorted = note_params.to_vec();
        sorted.sort_by(|a, b| b.note_intercept.total_cmp(&a.note_intercept));
        self.write_tsv(NOTE_PARAMS_FILE, &sorted)
    }

    pub fn write_rater_params(&self, rater_params: &[RaterParams]) -> Result<PathBuf> {
        self.write_tsv(RATER_PARAMS_FILE, rater_params)
    }

    pub fn write_filtered_ratings(&self, ratings: &[UnifiedRating]) -> Result<PathBuf> {
        self.write_tsv(FILTERED_RATINGS_FILE, ratings)
    }

    /// Status history including the records appended for new notes
    pub fn write_note_status_history(&self, history: &[NoteStatusHistory]) -> Result<PathBuf> {
        self.write_tsv(NOTE_STATUS_HISTORY_FILE, history)
    }

    pub fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        let path = self.path(RUN_SUMMARY_FILE);
        let json =
            serde_json::to_string_pretty(summary).context("Failed to serialize run summary")?;
        fs::write(&path, json).with_context(|| write_context(&path))?;
        info!("Saved run summary: {}", path.display());
        Ok(path)
    }

    fn write_tsv<T: Serialize>(&self, file_name: &str, rows: &[T]) -> Result<PathBuf> {
        let path = self.path(file_name);
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&path)
            .with_context(|| write_context(&path))?;

        for row in rows {
            writer.serialize(row).with_context(|| write_context(&path))?;
        }
        writer.flush().with_context(|| write_context(&path))?;

        info!("Saved {} rows to {}", rows.len(), path.display());
        Ok(path)
    }
}
