use ndarray::Array1;

use super::model::{BiasedMatrixFactorization, Gradients};

const BETA1: f32 = 0.9;
const BETA2: f32 = 0.999;
const EPSILON: f32 = 1e-8;

/// First and second moment estimates for one parameter group
#[derive(Debug, Clone)]
struct Moments {
    first: Array1<f32>,
    second: Array1<f32>,
}

impl Moments {
    fn zeros(len: usize) -> Self {
        Self {
            first: Array1::zeros(len),
            second: Array1::zeros(len),
        }
    }

    fn step(&mut self, params: &mut Array1<f32>, grads: &Array1<f32>, lr: f32, t: i32) {
        let bias1 = 1.0 - BETA1.powi(t);
        let bias2 = 1.0 - BETA2.powi(t);

        for ((p, &g), (m, v)) in params
            .iter_mut()
            .zip(grads)
            .zip(self.first.iter_mut().zip(self.second.iter_mut()))
        {
            *m = BETA1 * *m + (1.0 - BETA1) * g;
            *v = BETA2 * *v + (1.0 - BETA2) * g * g;
            let m_hat = *m / bias1;
            let v_hat = *v / bias2;
            *p -= lr * m_hat / (v_hat.sqrt() + EPSILON);
        }
    }
}

/// Adam with a fixed step size and bias-corrected moments, one step per call.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    t: i32,
    rater_intercepts: Moments,
    note_intercepts: Moments,
    rater_factors: Moments,
    note_factors: Moments,
    global_intercept: Moments,
}

impl Adam {
    pub fn new(model: &BiasedMatrixFactorization, learning_rate: f32) -> Self {
        Self {
            learning_rate,
            t: 0,
            rater_intercepts: Moments::zeros(model.n_raters()),
            note_intercepts: Moments::zeros(model.n_notes()),
            rater_factors: Moments::zeros(model.n_raters()),
            note_factors: Moments::zeros(model.n_notes()),
            global_intercept: Moments::zeros(1),
        }
    }

    pub fn steps_taken(&self) -> i32 {
        self.t
    }

    pub fn step(&mut self, model: &mut BiasedMatrixFactorization, grads: &Gradients) {
        self.t += 1;
        let (lr, t) = (self.learning_rate, self.t);

        self.rater_intercepts
            .step(&mut model.rater_intercepts, &grads.rater_intercepts, lr, t);
        self.note_intercepts
            .step(&mut model.note_intercepts, &grads.note_intercepts, lr, t);
        self.rater_factors
            .step(&mut model.rater_factors, &grads.rater_factors, lr, t);
        self.note_factors
            .step(&mut model.note_factors, &grads.note_factors, lr, t);

        if model.use_global_intercept {
            let mut global = Array1::from_elem(1, model.global_intercept);
            self.global_intercept.step(
                &mut global,
                &Array1::from_elem(1, grads.global_intercept),
                lr,
                t,
            );
            model.global_intercept = global[0];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn model() -> BiasedMatrixFactorization {
        BiasedMatrixFactorization {
            rater_intercepts: array![0.0, 0.0],
            note_intercepts: array![0.0],
            rater_factors: array![0.5, -0.5],
            note_factors: array![0.25],
            global_intercept: 0.0,
            use_global_intercept: true,
        }
    }

    fn grads() -> Gradients {
        Gradients {
            rater_intercepts: array![2.0, -0.001],
            note_intercepts: array![0.0],
            rater_factors: array![10.0, 0.0],
            note_factors: array![-3.0],
            global_intercept: 0.5,
        }
    }

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        let mut model = model();
        let mut adam = Adam::new(&model, 0.1);

        adam.step(&mut model, &grads());

        // After bias correction the first update is lr * sign(g) for any nonzero g.
        assert_abs_diff_eq!(model.rater_intercepts[0], -0.1, epsilon = 1e-5);
        assert_abs_diff_eq!(model.rater_intercepts[1], 0.1, epsilon = 1e-4);
        assert_abs_diff_eq!(model.rater_factors[0], 0.4, epsilon = 1e-5);
        assert_abs_diff_eq!(model.note_factors[0], 0.35, epsilon = 1e-5);
        assert_abs_diff_eq!(model.global_intercept, -0.1, epsilon = 1e-5);
        assert_eq!(model.note_intercepts[0], 0.0);
        assert_eq!(model.rater_factors[1], -0.5);
        assert_eq!(adam.steps_taken(), 1);
    }

    #[test]
    fn test_disabled_global_intercept_is_untouched() {
        let mut model = model();
        model.use_global_intercept = false;
        let mut adam = Adam::new(&model, 0.1);

        adam.step(&mut model, &grads());

        assert_eq!(model.global_intercept, 0.0);
    }
}
