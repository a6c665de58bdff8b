use serde::{Deserialize, Serialize};

pub type NoteId = i64;
pub type ParticipantId = String;

/// Whether a note says the tweet it annotates is misleading.
/// An absent classification means the note was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "MISINFORMED_OR_POTENTIALLY_MISLEADING")]
    Misleading,
    #[serde(rename = "NOT_MISLEADING")]
    NotMisleading,
}

/// Three-level answer of the second rating form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelpfulnessLevel {
    #[serde(rename = "NOT_HELPFUL")]
    NotHelpful,
    #[serde(rename = "SOMEWHAT_HELPFUL")]
    SomewhatHelpful,
    #[serde(rename = "HELPFUL")]
    Helpful,
}

impl HelpfulnessLevel {
    pub fn as_score(&self) -> f32 {
        match self {
            HelpfulnessLevel::NotHelpful => 0.0,
            HelpfulnessLevel::SomewhatHelpful => 0.5,
            HelpfulnessLevel::Helpful => 1.0,
        }
    }
}

// --- Raw rows, as handed over by the loader ---

/// Note row with the shared `participantId` column still unassigned to a role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNote {
    pub note_id: NoteId,
    pub participant_id: ParticipantId,
    pub created_at_millis: i64,
    pub tweet_id: String,
    pub classification: Option<Classification>,
    pub summary: String,
}

/// Rating row with the shared `participantId` column still unassigned to a role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRating {
    pub note_id: NoteId,
    pub participant_id: ParticipantId,
    pub created_at_millis: i64,
    pub helpful: Option<u8>,
    pub not_helpful: Option<u8>,
    pub helpfulness_level: Option<HelpfulnessLevel>,
}

// --- Role-assigned records ---

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Note {
    pub note_id: NoteId,
    pub note_author_participant_id: ParticipantId,
    pub created_at_millis: i64,
    pub tweet_id: String,
    pub classification: Option<Classification>,
    pub summary: String,
}

impl Note {
    pub fn is_deleted(&self) -> bool {
        self.classification.is_none()
    }
}

impl From<RawNote> for Note {
    fn from(raw: RawNote) -> Self {
        Self {
            note_id: raw.note_id,
            note_author_participant_id: raw.participant_id,
            created_at_millis: raw.created_at_millis,
            tweet_id: raw.tweet_id,
            classification: raw.classification,
            summary: raw.summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rating {
    pub rater_participant_id: ParticipantId,
    pub note_id: NoteId,
    pub created_at_millis: i64,
    pub helpful: Option<u8>,
    pub not_helpful: Option<u8>,
    pub helpfulness_level: Option<HelpfulnessLevel>,
}

impl From<RawRating> for Rating {
    fn from(raw: RawRating) -> Self {
        Self {
            rater_participant_id: raw.participant_id,
            note_id: raw.note_id,
            created_at_millis: raw.created_at_millis,
            helpful: raw.helpful,
            not_helpful: raw.not_helpful,
            helpfulness_level: raw.helpfulness_level,
        }
    }
}

/// Per-note scoring history. A note with a recorded `created_at_millis`
/// counts as previously scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteStatusHistory {
    pub note_id: NoteId,
    #[serde(default)]
    pub note_author_participant_id: Option<ParticipantId>,
    pub created_at_millis: Option<i64>,
    #[serde(default)]
    pub first_scored_at_millis: Option<i64>,
}

impl NoteStatusHistory {
    pub fn was_scored(&self) -> bool {
        self.created_at_millis.is_some()
    }
}

/// Rating reduced to the columns used for training, with the unified
/// helpfulness target in {0, 0.5, 1}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedRating {
    pub rater_participant_id: ParticipantId,
    pub note_id: NoteId,
    pub helpful_num: f32,
    pub created_at_millis: i64,
}

// --- Fitted parameters ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteParams {
    pub note_id: NoteId,
    pub note_intercept: f32,
    pub note_factor1: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaterParams {
    pub rater_participant_id: ParticipantId,
    pub rater_intercept: f32,
    pub rater_factor1: f32,
}
