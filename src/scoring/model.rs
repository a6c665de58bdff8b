use ndarray::Array1;
use rand::Rng;
use rand::rngs::StdRng;

/// Biased matrix factorization with a single latent dimension.
///
/// `prediction(u, i) = b_u + b_i + f_u * f_i (+ g)`. Every entity owns one scalar
/// intercept and one scalar factor, stored as dense arrays indexed by the ids
/// handed out by `RatingIndex`.
#[derive(Debug, Clone)]
pub struct BiasedMatrixFactorization {
    pub rater_intercepts: Array1<f32>,
    pub note_intercepts: Array1<f32>,
    pub rater_factors: Array1<f32>,
    pub note_factors: Array1<f32>,
    pub global_intercept: f32,
    pub use_global_intercept: bool,
}

/// Gradient of the training objective, one array per parameter group
#[derive(Debug, Clone)]
pub struct Gradients {
    pub rater_intercepts: Array1<f32>,
    pub note_intercepts: Array1<f32>,
    pub rater_factors: Array1<f32>,
    pub note_factors: Array1<f32>,
    pub global_intercept: f32,
}

impl BiasedMatrixFactorization {
    /// Intercepts start at zero, factors are Xavier-uniform.
    pub fn new(
        n_raters: usize,
        n_notes: usize,
        use_global_intercept: bool,
        rng: &mut StdRng,
    ) -> Self {
        Self {
            rater_intercepts: Array1::zeros(n_raters),
            note_intercepts: Array1::zeros(n_notes),
            rater_factors: xavier_uniform(n_raters, rng),
            note_factors: xavier_uniform(n_notes, rng),
            global_intercept: 0.0,
            use_global_intercept,
        }
    }

    pub fn n_raters(&self) -> usize {
        self.rater_factors.len()
    }

    pub fn n_notes(&self) -> usize {
        self.note_factors.len()
    }

    pub fn predict(&self, rater: usize, note: usize) -> f32 {
        let mut pred = self.rater_intercepts[rater]
            + self.note_intercepts[note]
            + self.rater_factors[rater] * self.note_factors[note];
        if self.use_global_intercept {
            pred += self.global_intercept;
        }
        pred
    }

    pub fn predict_all(&self, raters: &[usize], notes: &[usize]) -> Array1<f32> {
        raters
            .iter()
            .zip(notes)
            .map(|(&u, &i)| self.predict(u, i))
            .collect()
    }

    /// Sum of `coef * mean(p^2)` over every parameter group
    pub fn l2_penalty(&self, l2_lambda: f32, l2_lambda_intercept: f32) -> f32 {
        let mut penalty = l2_lambda_intercept * mean_square(&self.rater_intercepts)
            + l2_lambda_intercept * mean_square(&self.note_intercepts)
            + l2_lambda * mean_square(&self.rater_factors)
            + l2_lambda * mean_square(&self.note_factors);
        if self.use_global_intercept {
            penalty += l2_lambda_intercept * self.global_intercept * self.global_intercept;
        }
        penalty
    }

    /// Full-batch gradient of `mse(pred, targets) + l2_penalty`.
    pub fn gradients(
        &self,
        raters: &[usize],
        notes: &[usize],
        targets: &Array1<f32>,
        l2_lambda: f32,
        l2_lambda_intercept: f32,
    ) -> Gradients {
        let n = targets.len() as f32;

        let mut grads = Gradients {
            rater_intercepts: penalty_gradient(&self.rater_intercepts, l2_lambda_intercept),
            note_intercepts: penalty_gradient(&self.note_intercepts, l2_lambda_intercept),
            rater_factors: penalty_gradient(&self.rater_factors, l2_lambda),
            note_factors: penalty_gradient(&self.note_factors, l2_lambda),
            global_intercept: 0.0,
        };
        if self.use_global_intercept {
            grads.global_intercept = 2.0 * l2_lambda_intercept * self.global_intercept;
        }

        for ((&u, &i), &target) in raters.iter().zip(notes).zip(targets) {
            let residual = 2.0 * (self.predict(u, i) - target) / n;

            grads.rater_intercepts[u] += residual;
            grads.note_intercepts[i] += residual;
            grads.rater_factors[u] += residual * self.note_factors[i];
            grads.note_factors[i] += residual * self.rater_factors[u];
            if self.use_global_intercept {
                grads.global_intercept += residual;
            }
        }

        grads
    }
}

/// Glorot uniform for an `(n, 1)` embedding table: fan_in = 1, fan_out = n
fn xavier_uniform(n: usize, rng: &mut StdRng) -> Array1<f32> {
    let bound = (6.0 / (1.0 + n as f32)).sqrt();
    (0..n).map(|_| rng.gen_range(-bound..bound)).collect()
}

fn mean_square(values: &Array1<f32>) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.mapv(|v| v * v).sum() / values.len() as f32
}

/// d/dp of `coef * mean(p^2)`
fn penalty_gradient(values: &Array1<f32>, coef: f32) -> Array1<f32> {
    let scale = 2.0 * coef / values.len().max(1) as f32;
    values.mapv(|v| scale * v)
}

pub fn mse(predictions: &Array1<f32>, targets: &Array1<f32>) -> f32 {
    let diff = predictions - targets;
    diff.mapv(|d| d * d).mean().unwrap_or(0.0)
}
