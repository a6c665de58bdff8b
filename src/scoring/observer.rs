use log::info;
use serde::Serialize;

/// Loss snapshot handed to observers during training
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LossReport {
    pub epoch: usize,
    /// MSE plus L2 penalty, computed before this epoch's update
    pub objective: f32,
    /// MSE of the parameters after this epoch's update
    pub train_fit_loss: f32,
}

/// Receives periodic loss reports. Purely observational: implementations
/// cannot reach the model being trained.
pub trait TrainingObserver {
    fn on_loss(&mut self, report: &LossReport);
}

impl<F: FnMut(&LossReport)> TrainingObserver for F {
    fn on_loss(&mut self, report: &LossReport) {
        self(report)
    }
}

/// Writes every report to the `info` log
#[derive(Debug, Default)]
pub struct LogObserver;

impl TrainingObserver for LogObserver {
    fn on_loss(&mut self, report: &LossReport) {
        info!("epoch {} {}", report.epoch, report.objective);
        info!("TRAIN FIT LOSS: {}", report.train_fit_loss);
    }
}
