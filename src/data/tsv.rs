use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::de::DeserializeOwned;

use crate::domain::{NoteStatusHistory, RawNote, RawRating};
use crate::errors::{ScoringError, load_context};

pub const NOTE_COLUMNS: &[&str] = &[
    "noteId",
    "participantId",
    "createdAtMillis",
    "tweetId",
    "classification",
    "summary",
];

pub const RATING_COLUMNS: &[&str] = &[
    "noteId",
    "participantId",
    "createdAtMillis",
    "helpful",
    "notHelpful",
    "helpfulnessLevel",
];

pub const NOTE_STATUS_HISTORY_COLUMNS: &[&str] = &["noteId", "createdAtMillis"];

pub fn load_notes(path: &Path) -> Result<Vec<RawNote>> {
    let file = File::open(path).with_context(|| load_context("notes", path))?;
    let notes = read_notes(file).with_context(|| load_context("notes", path))?;
    info!("  → Loaded {} notes from {}", notes.len(), path.display());
    Ok(notes)
}

pub fn load_ratings(path: &Path) -> Result<Vec<RawRating>> {
    let file = File::open(path).with_context(|| load_context("ratings", path))?;
    let ratings = read_ratings(file).with_context(|| load_context("ratings", path))?;
    info!("  → Loaded {} ratings from {}", ratings.len(), path.display());
    Ok(ratings)
}

pub fn load_note_status_history(path: &Path) -> Result<Vec<NoteStatusHistory>> {
    let file = File::open(path).with_context(|| load_context("note status history", path))?;
    let history = read_note_status_history(file)
        .with_context(|| load_context("note status history", path))?;
    info!(
        "  → Loaded {} note status history records from {}",
        history.len(),
        path.display()
    );
    Ok(history)
}

pub fn read_notes<R: Read>(source: R) -> Result<Vec<RawNote>> {
    read_table(source, "notes", NOTE_COLUMNS)
}

pub fn read_ratings<R: Read>(source: R) -> Result<Vec<RawRating>> {
    read_table(source, "ratings", RATING_COLUMNS)
}

pub fn read_note_status_history<R: Read>(source: R) -> Result<Vec<NoteStatusHistory>> {
    read_table(source, "noteStatusHistory", NOTE_STATUS_HISTORY_COLUMNS)
}

fn read_table<T, R>(source: R, table: &'static str, required: &[&str]) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    check_columns(&headers, table, required)?;

    reader
        .deserialize()
        .enumerate()
        .map(|(row, record)| record.with_context(|| format!("{}: bad row {}", table, row + 1)))
        .collect()
}

fn check_columns(
    headers: &csv::StringRecord,
    table: &'static str,
    required: &[&str],
) -> Result<(), ScoringError> {
    match required
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        Some(column) => Err(ScoringError::SchemaMismatch {
            table,
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Classification, HelpfulnessLevel};

    #[test]
    fn test_read_notes_with_extra_columns() {
        let data = "noteId\tparticipantId\tcreatedAtMillis\ttweetId\t\
                    classification\tbelievable\tsummary\n\
                    1\tauthor\t1600000000000\t99\t\
                    MISINFORMED_OR_POTENTIALLY_MISLEADING\tBELIEVABLE_BY_MANY\tsome text\n\
                    2\tauthor\t1600000000001\t98\t\t\tdeleted\n";

        let notes = read_notes(data.as_bytes()).unwrap();

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].classification, Some(Classification::Misleading));
        assert_eq!(notes[0].tweet_id, "99");
        assert_eq!(notes[1].classification, None);
    }

    #[test]
    fn test_read_ratings_with_both_forms() {
        let data = "noteId\tparticipantId\tcreatedAtMillis\tversion\t\
                    helpful\tnotHelpful\thelpfulnessLevel\n\
                    1\trater\t1600000000000\t1\t1\t0\t\n\
                    1\trater2\t1600000000000\t2\t\t\tSOMEWHAT_HELPFUL\n";

        let ratings = read_ratings(data.as_bytes()).unwrap();

        assert_eq!(ratings[0].helpful, Some(1));
        assert_eq!(ratings[0].helpfulness_level, None);
        assert_eq!(ratings[1].helpful, None);
        assert_eq!(
            ratings[1].helpfulness_level,
            Some(HelpfulnessLevel::SomewhatHelpful)
        );
    }

    #[test]
    fn test_missing_column_is_schema_mismatch() {
        let data = "noteId\tparticipantId\tcreatedAtMillis\thelpful\n1\trater\t0\t1\n";

        let err = read_ratings(data.as_bytes()).unwrap_err();

        let schema_err = err.downcast_ref::<ScoringError>().unwrap();
        assert!(matches!(
            schema_err,
            ScoringError::SchemaMismatch { table: "ratings", column } if column == "notHelpful"
        ));
    }

    #[test]
    fn test_notes_without_tweet_id_are_rejected() {
        let data = "noteId\tparticipantId\tcreatedAtMillis\tclassification\tsummary\n\
                    1\tauthor\t1600000000000\tNOT_MISLEADING\ttext\n";

        let err = read_notes(data.as_bytes()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ScoringError>(),
            Some(ScoringError::SchemaMismatch { table: "notes", column }) if column == "tweetId"
        ));
    }

    #[test]
    fn test_read_history_optional_columns() {
        let data = "noteId\tcreatedAtMillis\n1\t1600000000000\n2\t\n";

        let history = read_note_status_history(data.as_bytes()).unwrap();

        assert!(history[0].was_scored());
        assert!(!history[1].was_scored());
        assert_eq!(history[0].first_scored_at_millis, None);
    }
}
