use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use chrono::DateTime;
use log::{debug, info};

use super::status_history::add_new_notes;
use crate::domain::{
    Classification, Note, NoteId, NoteStatusHistory, Rating, RawNote, RawRating, UnifiedRating,
};
use crate::errors::ScoringError;

/// Output of the rating-table builder
#[derive(Debug, Clone)]
pub struct PreprocessedData {
    pub notes: Vec<Note>,
    pub ratings: Vec<UnifiedRating>,
    pub note_status_history: Vec<NoteStatusHistory>,
}

/// Builds the cleaned ratings table: assigns participant roles, drops duplicates,
/// unifies the two rating forms into `helpful_num` and optionally drops ratings
/// on notes that don't call the tweet misleading.
pub fn preprocess_data(
    raw_notes: Vec<RawNote>,
    raw_ratings: Vec<RawRating>,
    note_status_history: Vec<NoteStatusHistory>,
    filter_not_misleading_notes: bool,
) -> Result<PreprocessedData, ScoringError> {
    let notes: Vec<Note> = raw_notes.into_iter().map(Note::from).collect();
    let ratings: Vec<Rating> = raw_ratings.into_iter().map(Rating::from).collect();

    log_latest_timestamps(&notes, &ratings);

    let ratings = remove_duplicate_ratings(ratings)?;
    let notes = remove_duplicate_notes(notes)?;

    let mut ratings = unify_helpfulness(ratings);

    if filter_not_misleading_notes {
        ratings = filter_misleading_notes(&notes, ratings, &note_status_history);
    }

    let note_status_history = add_new_notes(note_status_history, &notes);

    info!(
        "  → Num Ratings: {}, Num Unique Notes Rated: {}, Num Unique Raters: {}",
        ratings.len(),
        count_unique(ratings.iter().map(|r| r.note_id)),
        count_unique(ratings.iter().map(|r| r.rater_participant_id.as_str())),
    );

    Ok(PreprocessedData {
        notes,
        ratings,
        note_status_history,
    })
}

fn log_latest_timestamps(notes: &[Note], ratings: &[Rating]) {
    let latest_rating = ratings.iter().map(|r| r.created_at_millis).max();
    let latest_note = notes.iter().map(|n| n.created_at_millis).max();

    if let Some(ts) = latest_rating.and_then(DateTime::from_timestamp_millis) {
        info!("Timestamp of latest rating in data: {}", ts);
    }
    if let Some(ts) = latest_note.and_then(DateTime::from_timestamp_millis) {
        info!("Timestamp of latest note in data: {}", ts);
    }
}

fn drop_exact_duplicates<T: Eq + Hash + Clone>(rows: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    rows.into_iter().filter(|row| seen.insert(row.clone())).collect()
}

/// Drops identical rows, then fails if any (rater, note) pair still repeats.
pub fn remove_duplicate_ratings(ratings: Vec<Rating>) -> Result<Vec<Rating>, ScoringError> {
    let ratings = drop_exact_duplicates(ratings);

    let unique = count_unique(
        ratings
            .iter()
            .map(|r| (r.rater_participant_id.as_str(), r.note_id)),
    );
    if unique != ratings.len() {
        return Err(ScoringError::DuplicateRatings {
            unique,
            total: ratings.len(),
        });
    }

    Ok(ratings)
}

/// Drops identical rows, then fails if any note id still repeats.
pub fn remove_duplicate_notes(notes: Vec<Note>) -> Result<Vec<Note>, ScoringError> {
    let notes = drop_exact_duplicates(notes);

    let unique = count_unique(notes.iter().map(|n| n.note_id));
    if unique != notes.len() {
        return Err(ScoringError::DuplicateNotes {
            unique,
            total: notes.len(),
        });
    }

    Ok(notes)
}

/// Maps either rating form onto {0, 0.5, 1}. When several signals are present
/// the categorical level wins, then the not-helpful flag, then the helpful flag.
pub fn helpful_num(rating: &Rating) -> Option<f32> {
    if let Some(level) = rating.helpfulness_level {
        return Some(level.as_score());
    }
    if rating.not_helpful == Some(1) {
        return Some(0.0);
    }
    if rating.helpful == Some(1) {
        return Some(1.0);
    }
    None
}

pub fn unify_helpfulness(ratings: Vec<Rating>) -> Vec<UnifiedRating> {
    let total = ratings.len();

    let unified: Vec<UnifiedRating> = ratings
        .into_iter()
        .filter_map(|rating| {
            let helpful_num = helpful_num(&rating)?;
            Some(UnifiedRating {
                rater_participant_id: rating.rater_participant_id,
                note_id: rating.note_id,
                helpful_num,
                created_at_millis: rating.created_at_millis,
            })
        })
        .collect();

    debug!(
        "Dropped {} ratings with no recognized helpfulness answer",
        total - unified.len()
    );
    unified
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NoteDisposition {
    Misleading,
    DeletedButScored,
    NotMisleading,
    DeletedNeverScored,
}

impl NoteDisposition {
    fn keeps_ratings(&self) -> bool {
        matches!(
            self,
            NoteDisposition::Misleading | NoteDisposition::DeletedButScored
        )
    }

    fn describe(&self) -> &'static str {
        match self {
            NoteDisposition::Misleading => "misleading notes",
            NoteDisposition::DeletedButScored => {
                "deleted notes that were previously scored (in note status history)"
            }
            NoteDisposition::NotMisleading => "notes that aren't deleted, but are not-misleading",
            NoteDisposition::DeletedNeverScored => {
                "notes that were deleted and not in note status history"
            }
        }
    }
}

fn note_disposition(note: Option<&Note>, previously_scored: bool) -> NoteDisposition {
    match note {
        Some(note) if !note.is_deleted() => match note.classification {
            Some(Classification::NotMisleading) => NoteDisposition::NotMisleading,
            _ => NoteDisposition::Misleading,
        },
        _ if previously_scored => NoteDisposition::DeletedButScored,
        _ => NoteDisposition::DeletedNeverScored,
    }
}

/// Keeps ratings of notes that say the tweet is misleading, and ratings of deleted
/// notes that had already been scored. Ratings of notes missing from `notes` are
/// treated as ratings of deleted notes.
pub fn filter_misleading_notes(
    notes: &[Note],
    ratings: Vec<UnifiedRating>,
    note_status_history: &[NoteStatusHistory],
) -> Vec<UnifiedRating> {
    let notes_by_id: HashMap<NoteId, &Note> = notes.iter().map(|n| (n.note_id, n)).collect();
    let scored_notes: HashSet<NoteId> = note_status_history
        .iter()
        .filter(|h| h.was_scored())
        .map(|h| h.note_id)
        .collect();

    info!(
        "Preprocess Data: Filter misleading notes, starting with {} ratings on {} notes",
        ratings.len(),
        count_unique(ratings.iter().map(|r| r.note_id)),
    );

    let mut tallies: HashMap<NoteDisposition, (usize, HashSet<NoteId>)> = HashMap::new();
    let mut kept = Vec::with_capacity(ratings.len());

    for rating in ratings {
        let note = notes_by_id.get(&rating.note_id).copied();
        let disposition = note_disposition(note, scored_notes.contains(&rating.note_id));

        let tally = tallies.entry(disposition).or_default();
        tally.0 += 1;
        tally.1.insert(rating.note_id);

        if disposition.keeps_ratings() {
            kept.push(rating);
        }
    }

    for disposition in [
        NoteDisposition::Misleading,
        NoteDisposition::DeletedButScored,
        NoteDisposition::NotMisleading,
        NoteDisposition::DeletedNeverScored,
    ] {
        let (num_ratings, num_notes) = tallies
            .get(&disposition)
            .map(|(n, ids)| (*n, ids.len()))
            .unwrap_or((0, 0));
        let verb = if disposition.keeps_ratings() {
            "Keeping"
        } else {
            "Removing"
        };
        info!(
            "  {} {} ratings on {} {}",
            verb,
            num_ratings,
            num_notes,
            disposition.describe()
        );
    }

    kept
}

pub(crate) fn count_unique<T: Eq + Hash>(items: impl Iterator<Item = T>) -> usize {
    items.collect::<HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HelpfulnessLevel;

    fn raw_note(note_id: NoteId, classification: Option<Classification>) -> RawNote {
        RawNote {
            note_id,
            participant_id: format!("author-{}", note_id),
            created_at_millis: 1_600_000_000_000 + note_id,
            tweet_id: format!("tweet-{}", note_id),
            classification,
            summary: "summary".to_string(),
        }
    }

    fn raw_rating(rater: &str, note_id: NoteId, helpful: Option<u8>) -> RawRating {
        RawRating {
            note_id,
            participant_id: rater.to_string(),
            created_at_millis: 1_600_000_000_000,
            helpful,
            not_helpful: helpful.map(|h| 1 - h),
            helpfulness_level: None,
        }
    }

    fn rating(
        helpful: Option<u8>,
        not_helpful: Option<u8>,
        level: Option<HelpfulnessLevel>,
    ) -> Rating {
        Rating {
            rater_participant_id: "r".to_string(),
            note_id: 1,
            created_at_millis: 0,
            helpful,
            not_helpful,
            helpfulness_level: level,
        }
    }

    fn unified(rater: &str, note_id: NoteId) -> UnifiedRating {
        UnifiedRating {
            rater_participant_id: rater.to_string(),
            note_id,
            helpful_num: 1.0,
            created_at_millis: 0,
        }
    }

    fn history(note_id: NoteId) -> NoteStatusHistory {
        NoteStatusHistory {
            note_id,
            note_author_participant_id: None,
            created_at_millis: Some(1_600_000_000_000),
            first_scored_at_millis: None,
        }
    }

    #[test]
    fn test_exact_duplicate_ratings_are_dropped() {
        let ratings: Vec<Rating> = vec![
            raw_rating("a", 1, Some(1)),
            raw_rating("a", 1, Some(1)),
            raw_rating("b", 1, Some(0)),
        ]
        .into_iter()
        .map(Rating::from)
        .collect();

        let ratings = remove_duplicate_ratings(ratings).unwrap();

        assert_eq!(ratings.len(), 2);
    }

    #[test]
    fn test_conflicting_duplicate_ratings_fail() {
        let ratings: Vec<Rating> = vec![raw_rating("a", 1, Some(1)), raw_rating("a", 1, Some(0))]
            .into_iter()
            .map(Rating::from)
            .collect();

        let result = remove_duplicate_ratings(ratings);

        assert!(matches!(
            result,
            Err(ScoringError::DuplicateRatings {
                unique: 1,
                total: 2
            })
        ));
    }

    #[test]
    fn test_conflicting_duplicate_notes_fail() {
        let mut changed = raw_note(1, Some(Classification::Misleading));
        changed.summary = "edited".to_string();
        let notes: Vec<Note> = vec![raw_note(1, Some(Classification::Misleading)), changed]
            .into_iter()
            .map(Note::from)
            .collect();

        assert!(matches!(
            remove_duplicate_notes(notes),
            Err(ScoringError::DuplicateNotes { .. })
        ));
    }

    #[test]
    fn test_helpfulness_mapping() {
        assert_eq!(helpful_num(&rating(Some(1), Some(0), None)), Some(1.0));
        assert_eq!(helpful_num(&rating(Some(0), Some(1), None)), Some(0.0));
        assert_eq!(
            helpful_num(&rating(None, None, Some(HelpfulnessLevel::NotHelpful))),
            Some(0.0)
        );
        assert_eq!(
            helpful_num(&rating(None, None, Some(HelpfulnessLevel::SomewhatHelpful))),
            Some(0.5)
        );
        assert_eq!(
            helpful_num(&rating(None, None, Some(HelpfulnessLevel::Helpful))),
            Some(1.0)
        );
        assert_eq!(helpful_num(&rating(None, None, None)), None);
        assert_eq!(helpful_num(&rating(Some(0), Some(0), None)), None);
    }

    #[test]
    fn test_ratings_without_signal_are_dropped() {
        let ratings = vec![
            rating(Some(1), None, None),
            rating(None, None, None),
            rating(None, None, Some(HelpfulnessLevel::SomewhatHelpful)),
        ];

        let unified = unify_helpfulness(ratings);

        let values: Vec<f32> = unified.iter().map(|r| r.helpful_num).collect();
        assert_eq!(values, vec![1.0, 0.5]);
    }

    #[test]
    fn test_misleading_filter_keeps_only_misleading_notes() {
        let notes: Vec<Note> = vec![
            raw_note(1, Some(Classification::Misleading)),
            raw_note(2, Some(Classification::NotMisleading)),
        ]
        .into_iter()
        .map(Note::from)
        .collect();
        let ratings = vec![
            unified("a", 1),
            unified("b", 1),
            unified("c", 1),
            unified("a", 2),
            unified("b", 2),
        ];

        let kept = filter_misleading_notes(&notes, ratings, &[]);

        assert_eq!(kept.len(), 3);
        assert!(kept.iter().all(|r| r.note_id == 1));
    }

    #[test]
    fn test_deleted_notes_kept_only_when_previously_scored() {
        let notes: Vec<Note> = vec![raw_note(1, None), raw_note(2, None)]
            .into_iter()
            .map(Note::from)
            .collect();
        let ratings = vec![
            unified("a", 1),
            unified("b", 1),
            unified("a", 2),
            unified("b", 2),
        ];

        let kept = filter_misleading_notes(&notes, ratings, &[history(1)]);

        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|r| r.note_id == 1));
    }

    #[test]
    fn test_ratings_of_unknown_notes_count_as_deleted() {
        let ratings = vec![unified("a", 9), unified("a", 10)];

        let kept = filter_misleading_notes(&[], ratings, &[history(9)]);

        assert_eq!(kept, vec![unified("a", 9)]);
    }

    #[test]
    fn test_note_disposition_uses_deleted_state() {
        let deleted = Note::from(raw_note(1, None));
        let misleading = Note::from(raw_note(2, Some(Classification::Misleading)));
        let not_misleading = Note::from(raw_note(3, Some(Classification::NotMisleading)));

        assert!(deleted.is_deleted());
        assert!(!misleading.is_deleted());
        assert_eq!(
            note_disposition(Some(&deleted), true),
            NoteDisposition::DeletedButScored
        );
        assert_eq!(
            note_disposition(Some(&deleted), false),
            NoteDisposition::DeletedNeverScored
        );
        assert_eq!(
            note_disposition(Some(&misleading), true),
            NoteDisposition::Misleading
        );
        assert_eq!(
            note_disposition(Some(&not_misleading), true),
            NoteDisposition::NotMisleading
        );
        assert_eq!(note_disposition(None, false), NoteDisposition::DeletedNeverScored);
    }

    #[test]
    fn test_preprocess_end_to_end() {
        let notes = vec![
            raw_note(1, Some(Classification::Misleading)),
            raw_note(1, Some(Classification::Misleading)),
            raw_note(2, Some(Classification::NotMisleading)),
        ];
        let ratings = vec![
            raw_rating("a", 1, Some(1)),
            raw_rating("a", 1, Some(1)),
            raw_rating("b", 1, None),
            raw_rating("a", 2, Some(0)),
        ];

        let data = preprocess_data(notes, ratings, vec![], true).unwrap();

        assert_eq!(data.notes.len(), 2);
        assert_eq!(data.notes[0].note_author_participant_id, "author-1");
        assert_eq!(data.ratings.len(), 1);
        assert_eq!(data.ratings[0].rater_participant_id, "a");
        assert_eq!(data.ratings[0].note_id, 1);
        assert_eq!(data.ratings[0].helpful_num, 1.0);
        assert_eq!(data.note_status_history.len(), 2);
    }

    #[test]
    fn test_preprocess_without_misleading_filter() {
        let notes = vec![raw_note(2, Some(Classification::NotMisleading))];
        let ratings = vec![raw_rating("a", 2, Some(0))];

        let data = preprocess_data(notes, ratings, vec![], false).unwrap();

        assert_eq!(data.ratings.len(), 1);
        assert_eq!(data.ratings[0].helpful_num, 0.0);
    }
}
