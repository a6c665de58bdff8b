use log::info;
use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::identification::flip_factors_for_identification;
use super::model::{BiasedMatrixFactorization, mse};
use super::observer::{LossReport, TrainingObserver};
use super::optimizer::Adam;
use crate::config::ModelSettings;
use crate::domain::{NoteParams, RaterParams, RatingIndex, UnifiedRating};
use crate::errors::ScoringError;

/// Fitted parameters of one training run, keyed by original note/rater ids
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub note_params: Vec<NoteParams>,
    pub rater_params: Vec<RaterParams>,
    /// `None` when the model was fit without a global intercept
    pub global_intercept: Option<f32>,
    pub final_loss: LossReport,
    pub factors_flipped: bool,
}

/// Ratings laid out for training: dense positions plus targets, all in input order
struct TrainingData {
    index: RatingIndex,
    raters: Vec<usize>,
    notes: Vec<usize>,
    targets: Array1<f32>,
}

/// Fits the biased matrix factorization model on pre-filtered ratings.
///
/// Runs a fixed number of full-batch Adam epochs on MSE plus L2 penalties
/// (`l2_lambda` on factors, `l2_lambda * l2_intercept_multiplier` on intercepts).
/// Loss goes to `observer` every `log_every` epochs and once after the last epoch.
pub fn run_mf(
    ratings: &[UnifiedRating],
    settings: &ModelSettings,
    observer: &mut dyn TrainingObserver,
) -> Result<TrainingOutcome, ScoringError> {
    // 1. Preconditions
    settings.validate()?;
    let data = prepare_training_data(ratings)?;
    info!("------------------");
    info!("Users: {}, Notes: {}", data.index.raters.len(), data.index.notes.len());

    // 2. Fit
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut model = BiasedMatrixFactorization::new(
        data.index.raters.len(),
        data.index.notes.len(),
        settings.use_global_intercept,
        &mut rng,
    );
    let final_loss = train(&mut model, &data, settings, observer);

    // 3. Copy parameters out under the original ids
    let (mut note_params, mut rater_params) = extract_params(&model, &data.index);
    let global_intercept = model.use_global_intercept.then_some(model.global_intercept);

    // 4. Fix the sign of the latent axis
    let factors_flipped = if settings.flip_factors_for_identification {
        flip_factors_for_identification(&mut note_params, &mut rater_params)?
    } else {
        false
    };

    Ok(TrainingOutcome {
        note_params,
        rater_params,
        global_intercept,
        final_loss,
        factors_flipped,
    })
}

fn prepare_training_data(ratings: &[UnifiedRating]) -> Result<TrainingData, ScoringError> {
    let usable: Vec<UnifiedRating> = ratings
        .iter()
        .filter(|r| r.helpful_num.is_finite())
        .cloned()
        .collect();
    if usable.is_empty() {
        return Err(ScoringError::EmptyTrainingSet);
    }

    let index = RatingIndex::build(&usable);
    let (raters, notes) = index.positions(&usable);
    let targets = usable.iter().map(|r| r.helpful_num).collect();

    Ok(TrainingData {
        index,
        raters,
        notes,
        targets,
    })
}

fn train(
    model: &mut BiasedMatrixFactorization,
    data: &TrainingData,
    settings: &ModelSettings,
    observer: &mut dyn TrainingObserver,
) -> LossReport {
    let l2_lambda = settings.l2_lambda;
    let l2_lambda_intercept = settings.l2_lambda_intercept();
    let mut optimizer = Adam::new(model, settings.learning_rate);
    let mut objective = f32::NAN;

    for epoch in 0..settings.epochs {
        let predictions = model.predict_all(&data.raters, &data.notes);
        objective =
            mse(&predictions, &data.targets) + model.l2_penalty(l2_lambda, l2_lambda_intercept);

        let grads = model.gradients(
            &data.raters,
            &data.notes,
            &data.targets,
            l2_lambda,
            l2_lambda_intercept,
        );
        optimizer.step(model, &grads);

        if epoch % settings.log_every == 0 {
            observer.on_loss(&loss_report(model, data, epoch, objective));
        }
    }

    let final_report = loss_report(model, data, settings.epochs - 1, objective);
    observer.on_loss(&final_report);
    final_report
}

fn loss_report(
    model: &BiasedMatrixFactorization,
    data: &TrainingData,
    epoch: usize,
    objective: f32,
) -> LossReport {
    let predictions = model.predict_all(&data.raters, &data.notes);
    LossReport {
        epoch,
        objective,
        train_fit_loss: mse(&predictions, &data.targets),
    }
}

fn extract_params(
    model: &BiasedMatrixFactorization,
    index: &RatingIndex,
) -> (Vec<NoteParams>, Vec<RaterParams>) {
    let note_params = index
        .notes
        .ids()
        .iter()
        .enumerate()
        .map(|(idx, &note_id)| NoteParams {
            note_id,
            note_intercept: model.note_intercepts[idx],
            note_factor1: model.note_factors[idx],
        })
        .collect();

    let rater_params = index
        .raters
        .ids()
        .iter()
        .enumerate()
        .map(|(idx, rater_id)| RaterParams {
            rater_participant_id: rater_id.clone(),
            rater_intercept: model.rater_intercepts[idx],
            rater_factor1: model.rater_factors[idx],
        })
        .collect();

    (note_params, rater_params)
}
