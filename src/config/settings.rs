use serde::Serialize;

use crate::errors::ScoringError;

#[derive(Debug, Clone, Serialize)]
pub struct ModelSettings {
    /// L2 coefficient on factor parameters
    pub l2_lambda: f32,
    /// Intercepts are regularized with `l2_lambda * l2_intercept_multiplier`
    pub l2_intercept_multiplier: f32,
    pub num_factors: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    pub use_global_intercept: bool,
    pub flip_factors_for_identification: bool,
    /// Loss is reported every `log_every` epochs and once after the last one
    pub log_every: usize,
    pub seed: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            l2_lambda: 0.03,
            l2_intercept_multiplier: 5.0,
            num_factors: 1,
            epochs: 200,
            learning_rate: 1.0,
            use_global_intercept: true,
            flip_factors_for_identification: true,
            log_every: 50,
            seed: 42,
        }
    }
}

impl ModelSettings {
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.num_factors != 1 {
            return Err(ScoringError::UnsupportedFactorCount(self.num_factors));
        }
        if !(self.l2_lambda > 0.0) {
            return Err(ScoringError::invalid_setting(
                "l2_lambda",
                format!("must be > 0, got {}", self.l2_lambda),
            ));
        }
        if !(self.l2_intercept_multiplier >= 0.0) {
            return Err(ScoringError::invalid_setting(
                "l2_intercept_multiplier",
                format!("must be >= 0, got {}", self.l2_intercept_multiplier),
            ));
        }
        if self.epochs == 0 {
            return Err(ScoringError::invalid_setting("epochs", "must be > 0"));
        }
        if !(self.learning_rate > 0.0) {
            return Err(ScoringError::invalid_setting(
                "learning_rate",
                format!("must be > 0, got {}", self.learning_rate),
            ));
        }
        if self.log_every == 0 {
            return Err(ScoringError::invalid_setting("log_every", "must be > 0"));
        }
        Ok(())
    }

    pub fn l2_lambda_intercept(&self) -> f32 {
        self.l2_lambda * self.l2_intercept_multiplier
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterSettings {
    pub min_raters_per_note: usize,
    pub min_ratings_per_rater: usize,
    pub filter_not_misleading_notes: bool,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            min_raters_per_note: 5,
            min_ratings_per_rater: 10,
            filter_not_misleading_notes: true,
        }
    }
}

impl FilterSettings {
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.min_raters_per_note == 0 {
            return Err(ScoringError::invalid_setting(
                "min_raters_per_note",
                "must be a positive integer",
            ));
        }
        if self.min_ratings_per_rater == 0 {
            return Err(ScoringError::invalid_setting(
                "min_ratings_per_rater",
                "must be a positive integer",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppConfig {
    pub model: ModelSettings,
    pub filter: FilterSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        self.model.validate()?;
        self.filter.validate()
    }
}
