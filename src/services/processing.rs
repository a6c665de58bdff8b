use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::data::{self, PreprocessedData, tsv};
use crate::domain::{NoteStatusHistory, UnifiedRating};
use crate::output::{OutputWriter, RunSummary};
use crate::scoring::{self, LogObserver, TrainingOutcome};

/// Locations of the three input tables
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub notes: PathBuf,
    pub ratings: PathBuf,
    pub note_status_history: PathBuf,
}

pub struct ScoringService {
    config: AppConfig,
    inputs: InputPaths,
    writer: OutputWriter,
}

impl ScoringService {
    pub fn new(config: AppConfig, inputs: InputPaths, output_dir: PathBuf) -> Result<Self> {
        config.validate().context("Invalid scoring configuration")?;
        Ok(Self {
            config,
            inputs,
            writer: OutputWriter::new(output_dir)?,
        })
    }

    /// Full run: load, preprocess, filter, fit and write parameter tables.
    pub fn run(&self) -> Result<TrainingOutcome> {
        info!("=== Starting Note Scoring ===\n");

        let (ratings, note_status_history) = self.load_and_filter()?;

        info!("Step 4: Fitting matrix factorization model...");
        let outcome = scoring::run_mf(&ratings, &self.config.model, &mut LogObserver)
            .context("Matrix factorization failed")?;
        info!(
            "  → Fitted {} notes and {} raters\n",
            outcome.note_params.len(),
            outcome.rater_params.len()
        );

        info!("Step 5: Writing outputs...");
        self.writer.write_note_params(&outcome.note_params)?;
        self.writer.write_rater_params(&outcome.rater_params)?;
        self.writer.write_note_status_history(&note_status_history)?;
        self.writer
            .write_summary(&RunSummary::new(ratings.len(), &outcome, &self.config))?;

        info!("=== Scoring Complete ===");
        Ok(outcome)
    }

    /// Stops after the support filter and writes the ratings that would be trained on.
    pub fn prepare(&self) -> Result<Vec<UnifiedRating>> {
        info!("=== Starting Rating Preparation ===\n");

        let (ratings, note_status_history) = self.load_and_filter()?;
        self.writer.write_filtered_ratings(&ratings)?;
        self.writer.write_note_status_history(&note_status_history)?;

        info!("=== Preparation Complete ===");
        Ok(ratings)
    }

    /// Returns the ratings left for training and the note status history with
    /// unseen notes appended.
    fn load_and_filter(&self) -> Result<(Vec<UnifiedRating>, Vec<NoteStatusHistory>)> {
        info!("Step 1: Loading input tables...");
        let notes = tsv::load_notes(&self.inputs.notes)?;
        let ratings = tsv::load_ratings(&self.inputs.ratings)?;
        let note_status_history = tsv::load_note_status_history(&self.inputs.note_status_history)?;

        info!("Step 2: Preprocessing ratings...");
        let PreprocessedData {
            ratings,
            note_status_history,
            ..
        } = data::preprocess_data(
            notes,
            ratings,
            note_status_history,
            self.config.filter.filter_not_misleading_notes,
        )
        .context("Failed to preprocess ratings")?;

        info!("Step 3: Applying minimum rating thresholds...");
        let ratings = data::filter_ratings(ratings, &self.config.filter);
        info!("  → {} ratings left for training\n", ratings.len());

        Ok((ratings, note_status_history))
    }
}
