pub mod settings;

pub use settings::{AppConfig, FilterSettings, ModelSettings};
