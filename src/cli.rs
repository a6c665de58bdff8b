use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::services::InputPaths;

#[derive(Parser, Debug)]
#[command(author, version, about = "note-consensus scoring")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Fit the matrix factorization model and write note/rater parameters
    Score {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        overrides: SettingsArgs,
    },
    /// Preprocess and filter ratings without training
    Prepare {
        #[command(flatten)]
        io: IoArgs,
        #[command(flatten)]
        overrides: SettingsArgs,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct IoArgs {
    /// Notes TSV
    #[arg(long)]
    pub notes: PathBuf,
    /// Ratings TSV
    #[arg(long)]
    pub ratings: PathBuf,
    /// Note status history TSV
    #[arg(long)]
    pub note_status_history: PathBuf,
    /// Directory for output files (optional, defaults to "output")
    #[arg(short, long, default_value = "output")]
    pub output_dir: PathBuf,
}

impl IoArgs {
    pub fn input_paths(&self) -> InputPaths {
        InputPaths {
            notes: self.notes.clone(),
            ratings: self.ratings.clone(),
            note_status_history: self.note_status_history.clone(),
        }
    }
}

/// Overrides for the default settings
#[derive(Args, Debug, Clone, PartialEq, Default)]
pub struct SettingsArgs {
    #[arg(long)]
    pub l2_lambda: Option<f32>,
    #[arg(long)]
    pub l2_intercept_multiplier: Option<f32>,
    #[arg(long)]
    pub num_factors: Option<usize>,
    #[arg(long)]
    pub epochs: Option<usize>,
    #[arg(long)]
    pub learning_rate: Option<f32>,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Report loss every N epochs
    #[arg(long)]
    pub log_every: Option<usize>,
    /// Fit without the global intercept
    #[arg(long)]
    pub no_global_intercept: bool,
    /// Keep the factor sign as trained
    #[arg(long)]
    pub no_flip_factors: bool,
    #[arg(long)]
    pub min_raters_per_note: Option<usize>,
    #[arg(long)]
    pub min_ratings_per_rater: Option<usize>,
    /// Keep ratings of notes that say the tweet is not misleading
    #[arg(long)]
    pub keep_not_misleading: bool,
}

impl SettingsArgs {
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        let model = &mut config.model;
        if let Some(v) = self.l2_lambda {
            model.l2_lambda = v;
        }
        if let Some(v) = self.l2_intercept_multiplier {
            model.l2_intercept_multiplier = v;
        }
        if let Some(v) = self.num_factors {
            model.num_factors = v;
        }
        if let Some(v) = self.epochs {
            model.epochs = v;
        }
        if let Some(v) = self.learning_rate {
            model.learning_rate = v;
        }
        if let Some(v) = self.seed {
            model.seed = v;
        }
        if let Some(v) = self.log_every {
            model.log_every = v;
        }
        if self.no_global_intercept {
            model.use_global_intercept = false;
        }
        if self.no_flip_factors {
            model.flip_factors_for_identification = false;
        }

        let filter = &mut config.filter;
        if let Some(v) = self.min_raters_per_note {
            filter.min_raters_per_note = v;
        }
        if let Some(v) = self.min_ratings_per_rater {
            filter.min_ratings_per_rater = v;
        }
        if self.keep_not_misleading {
            filter.filter_not_misleading_notes = false;
        }

        config
    }
}
