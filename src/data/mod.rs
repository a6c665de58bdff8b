pub mod preprocess;
pub mod status_history;
pub mod support_filter;
pub mod tsv;

pub use preprocess::{PreprocessedData, preprocess_data};
pub use support_filter::filter_ratings;
