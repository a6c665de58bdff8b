use std::collections::HashSet;

use log::info;

use crate::domain::{Note, NoteId, NoteStatusHistory};

/// Appends a history record for every note not yet tracked. New records carry the
/// note's creation time and no first-scored time.
pub fn add_new_notes(
    mut note_status_history: Vec<NoteStatusHistory>,
    notes: &[Note],
) -> Vec<NoteStatusHistory> {
    let known: HashSet<NoteId> = note_status_history.iter().map(|h| h.note_id).collect();

    let new_records: Vec<NoteStatusHistory> = notes
        .iter()
        .filter(|note| !known.contains(&note.note_id))
        .map(new_history_record)
        .collect();

    if !new_records.is_empty() {
        info!("  → Adding {} new notes to note status history", new_records.len());
    }

    note_status_history.extend(new_records);
    note_status_history
}

fn new_history_record(note: &Note) -> NoteStatusHistory {
    NoteStatusHistory {
        note_id: note.note_id,
        note_author_participant_id: Some(note.note_author_participant_id.clone()),
        created_at_millis: Some(note.created_at_millis),
        first_scored_at_millis: None,
    }
}
