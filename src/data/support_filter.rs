use std::collections::HashMap;
use std::hash::Hash;

use log::info;

use super::preprocess::count_unique;
use crate::config::FilterSettings;
use crate::domain::UnifiedRating;

/// Applies the minimum-ratings thresholds for notes and raters.
///
/// Runs exactly three passes: notes, raters, then notes again. The rater pass can
/// push notes under their threshold, which the last pass catches, but the last pass
/// may in turn push raters under theirs and that is not re-checked. Callers that need
/// a fixed point have to iterate themselves.
pub fn filter_ratings(
    ratings: Vec<UnifiedRating>,
    settings: &FilterSettings,
) -> Vec<UnifiedRating> {
    info!("Filter notes and ratings with too few ratings");

    let note_filtered = keep_by_min_count(ratings, settings.min_raters_per_note, |r| r.note_id);
    log_stage(
        &format!(
            "After Filtering Notes w/less than {} Ratings",
            settings.min_raters_per_note
        ),
        &note_filtered,
    );

    let double_filtered = keep_by_min_count(note_filtered, settings.min_ratings_per_rater, |r| {
        r.rater_participant_id.clone()
    });
    log_stage(
        &format!(
            "After Filtering Raters w/less than {} Notes",
            settings.min_ratings_per_rater
        ),
        &double_filtered,
    );

    let for_training = keep_by_min_count(double_filtered, settings.min_raters_per_note, |r| {
        r.note_id
    });
    log_stage(
        &format!(
            "After Final Filtering of Notes w/less than {} Ratings",
            settings.min_raters_per_note
        ),
        &for_training,
    );

    for_training
}

fn keep_by_min_count<K, F>(
    ratings: Vec<UnifiedRating>,
    min_count: usize,
    key: F,
) -> Vec<UnifiedRating>
where
    K: Eq + Hash,
    F: Fn(&UnifiedRating) -> K,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    for rating in &ratings {
        *counts.entry(key(rating)).or_insert(0) += 1;
    }

    ratings
        .into_iter()
        .filter(|r| counts.get(&key(r)).copied().unwrap_or(0) >= min_count)
        .collect()
}

fn log_stage(label: &str, ratings: &[UnifiedRating]) {
    info!(
        "  {}, Num Ratings: {}, Num Unique Notes Rated: {}, Num Unique Raters: {}",
        label,
        ratings.len(),
        count_unique(ratings.iter().map(|r| r.note_id)),
        count_unique(ratings.iter().map(|r| r.rater_participant_id.as_str())),
    );
}
