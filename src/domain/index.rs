use std::collections::HashMap;
use std::hash::Hash;

use super::models::{NoteId, ParticipantId, UnifiedRating};

/// Dense zero-based index over distinct identifiers, in order of first appearance.
/// Built fresh for every training run.
#[derive(Debug, Clone)]
pub struct IdIndex<K> {
    ids: Vec<K>,
    positions: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> IdIndex<K> {
    pub fn from_ids<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let mut index = Self {
            ids: Vec::new(),
            positions: HashMap::new(),
        };

        for id in ids {
            index.insert(id);
        }

        index
    }

    fn insert(&mut self, id: &K) -> usize {
        if let Some(&idx) = self.positions.get(id) {
            return idx;
        }

        let idx = self.ids.len();
        self.ids.push(id.clone());
        self.positions.insert(id.clone(), idx);
        idx
    }

    pub fn index_of(&self, id: &K) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn id_at(&self, idx: usize) -> Option<&K> {
        self.ids.get(idx)
    }

    pub fn ids(&self) -> &[K] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Note and rater indices for one set of ratings
#[derive(Debug, Clone)]
pub struct RatingIndex {
    pub notes: IdIndex<NoteId>,
    pub raters: IdIndex<ParticipantId>,
}

impl RatingIndex {
    pub fn build(ratings: &[UnifiedRating]) -> Self {
        Self {
            notes: IdIndex::from_ids(ratings.iter().map(|r| &r.note_id)),
            raters: IdIndex::from_ids(ratings.iter().map(|r| &r.rater_participant_id)),
        }
    }

    /// Dense (rater, note) positions of every rating, in input order
    pub fn positions(&self, ratings: &[UnifiedRating]) -> (Vec<usize>, Vec<usize>) {
        ratings
            .iter()
            .filter_map(|r| {
                let rater = self.raters.index_of(&r.rater_participant_id)?;
                let note = self.notes.index_of(&r.note_id)?;
                Some((rater, note))
            })
            .unzip()
    }
}
