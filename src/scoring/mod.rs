pub mod identification;
pub mod model;
pub mod observer;
pub mod optimizer;
pub mod trainer;

pub use identification::flip_factors_for_identification;
pub use model::BiasedMatrixFactorization;
pub use observer::{LogObserver, LossReport, TrainingObserver};
pub use trainer::{TrainingOutcome, run_mf};
