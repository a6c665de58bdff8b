pub mod writer;

pub use writer::{OutputWriter, RunSummary};
