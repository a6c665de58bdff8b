use log::info;

use crate::domain::{NoteParams, RaterParams};
use crate::errors::ScoringError;

/// Fixes the sign of the latent axis so that the larger group of raters has a
/// negative factor. Flips every note and rater factor when fewer than half of the
/// nonzero rater factors are negative; intercepts are never touched.
///
/// Returns whether a flip was applied. Fails when the orientation cannot be
/// established, e.g. because every rater factor is zero.
pub fn flip_factors_for_identification(
    note_params: &mut [NoteParams],
    rater_params: &mut [RaterParams],
) -> Result<bool, ScoringError> {
    let flipped = negative_share(rater_params)? < 0.5;

    if flipped {
        info!("  → Flipping factors so most raters have a negative factor");
        for note in note_params.iter_mut() {
            note.note_factor1 = -note.note_factor1;
        }
        for rater in rater_params.iter_mut() {
            rater.rater_factor1 = -rater.rater_factor1;
        }
    }

    let (negative, nonzero) = count_signs(rater_params);
    if (negative as f64) / (nonzero as f64) < 0.5 {
        return Err(ScoringError::DegenerateFactors { negative, nonzero });
    }

    Ok(flipped)
}

fn negative_share(rater_params: &[RaterParams]) -> Result<f64, ScoringError> {
    let (negative, nonzero) = count_signs(rater_params);
    if nonzero == 0 {
        return Err(ScoringError::DegenerateFactors { negative, nonzero });
    }
    Ok(negative as f64 / nonzero as f64)
}

/// (negative, nonzero) counts over finite rater factors
fn count_signs(rater_params: &[RaterParams]) -> (usize, usize) {
    rater_params
        .iter()
        .map(|r| r.rater_factor1)
        .filter(|f| f.is_finite())
        .fold((0, 0), |(negative, nonzero), f| {
            (negative + usize::from(f < 0.0), nonzero + usize::from(f != 0.0))
        })
}
