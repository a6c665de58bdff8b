pub mod processing;

pub use processing::{InputPaths, ScoringService};
