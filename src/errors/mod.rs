use thiserror::Error;

/// Fatal conditions of a scoring run. None of these are recovered from.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Only one latent factor is supported, got num_factors = {0}")]
    UnsupportedFactorCount(usize),

    #[error("Invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("Only {unique} unique raterId,noteId pairs but {total} ratings")]
    DuplicateRatings { unique: usize, total: usize },

    #[error("Found only {unique} unique noteIds out of {total} notes")]
    DuplicateNotes { unique: usize, total: usize },

    #[error("No ratings left to train on")]
    EmptyTrainingSet,

    #[error(
        "Factor identification failed: {negative} of {nonzero} nonzero rater factors are negative"
    )]
    DegenerateFactors { negative: usize, nonzero: usize },

    #[error("{table}: missing required column `{column}`")]
    SchemaMismatch { table: &'static str, column: String },
}

impl ScoringError {
    pub fn invalid_setting(name: &'static str, reason: impl Into<String>) -> Self {
        ScoringError::InvalidSetting {
            name,
            reason: reason.into(),
        }
    }
}

/// Add context to load errors
pub fn load_context(table: &str, path: &std::path::Path) -> String {
    format!("Failed to load {} from: {}", table, path.display())
}

/// Add context to write errors
pub fn write_context(path: &std::path::Path) -> String {
    format!("Failed to write: {}", path.display())
}
