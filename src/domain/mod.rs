pub mod index;
pub mod models;

pub use index::{IdIndex, RatingIndex};
pub use models::{
    Classification, HelpfulnessLevel, Note, NoteId, NoteParams, NoteStatusHistory, ParticipantId,
    Rating, RaterParams, RawNote, RawRating, UnifiedRating,
};
