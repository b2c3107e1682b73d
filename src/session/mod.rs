//! Classifier ownership, training, prediction, and outcome tracking.
//!
//! One `ClassifierSession` exists per running project. Training always
//! re-reads the full stored corpus so the model never drifts from what is on
//! disk, and each successful fit replaces the previous model wholesale.
//!
//! The accuracy ledger records running self-reported correctness: the value
//! appended after each feedback resolution is `correct / (correct +
//! incorrect)` at that moment. This is a proxy signal biased by the feedback
//! loop itself, kept deliberately instead of a held-out metric.

use image::RgbImage;
use thiserror::Error;
use tracing::info;

use crate::classifier::{LinearModel, TrainDataset, TrainOptions, train_linear};
use crate::project::{CLASS_COUNT, ClassSlot, Project};
use crate::sample;
use crate::store::{self, StoreError};

/// Errors raised by training and prediction.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Prediction was requested before any successful train.
    #[error("No trained model yet; train on at least two classes first")]
    NotTrained,
    /// The corpus does not cover enough classes to fit a boundary.
    #[error("Training needs samples from at least 2 classes; corpus covers {distinct}")]
    InsufficientData { distinct: usize },
    /// Reading the stored corpus failed.
    #[error(transparent)]
    Corpus(#[from] StoreError),
    /// The underlying classifier rejected the fit.
    #[error("Training failed: {0}")]
    Train(String),
    /// The model emitted a class index with no matching project slot.
    #[error("Model predicted class index {index}, outside the {CLASS_COUNT} project classes")]
    UnmappedClass { index: usize },
}

/// Running record of feedback outcomes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccuracyLedger {
    correct: u32,
    incorrect: u32,
    history: Vec<f32>,
}

impl AccuracyLedger {
    /// Fresh ledger with no resolutions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a ledger from persisted state.
    pub fn restore(correct: u32, incorrect: u32, history: Vec<f32>) -> Self {
        Self {
            correct,
            incorrect,
            history,
        }
    }

    /// Confirmed-correct resolution count.
    pub fn correct(&self) -> u32 {
        self.correct
    }

    /// Corrected-resolution count.
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    /// Accuracy value appended after each resolution, oldest first.
    pub fn history(&self) -> &[f32] {
        &self.history
    }

    /// Record one resolution and append the recomputed accuracy.
    fn record(&mut self, was_correct: bool) -> f32 {
        if was_correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
        let total = self.correct + self.incorrect;
        let accuracy = if total > 0 {
            self.correct as f32 / total as f32
        } else {
            0.0
        };
        self.history.push(accuracy);
        accuracy
    }
}

/// Owns the trainable model and the accuracy ledger for one project.
#[derive(Debug, Clone, Default)]
pub struct ClassifierSession {
    model: Option<LinearModel>,
    options: TrainOptions,
    accuracy: AccuracyLedger,
}

impl ClassifierSession {
    /// Session with no trained model and default training options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a session from persisted state.
    pub fn restore(model: Option<LinearModel>, accuracy: AccuracyLedger) -> Self {
        Self {
            model,
            options: TrainOptions::default(),
            accuracy,
        }
    }

    /// Whether a successful train has occurred.
    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// The trained model, if any.
    pub fn model(&self) -> Option<&LinearModel> {
        self.model.as_ref()
    }

    /// Accuracy ledger (read-only; `record_outcome` is the sole mutator).
    pub fn accuracy(&self) -> &AccuracyLedger {
        &self.accuracy
    }

    /// Re-read the full corpus and fit a fresh model, replacing any prior
    /// state. Returns the number of samples trained on.
    ///
    /// Fails with `InsufficientData` unless at least two classes have one
    /// sample each; a corrupt corpus aborts without touching the model.
    pub fn train(&mut self, project: &Project) -> Result<usize, SessionError> {
        let mut dataset = TrainDataset {
            n_classes: CLASS_COUNT,
            ..TrainDataset::default()
        };
        for row in store::load_all(project) {
            let (pixels, slot) = row?;
            dataset.x.push(pixels);
            dataset.y.push(slot.index());
        }
        let distinct = dataset.distinct_labels();
        if distinct < 2 {
            return Err(SessionError::InsufficientData { distinct });
        }
        let model = train_linear(&dataset, &self.options).map_err(SessionError::Train)?;
        let samples = dataset.x.len();
        self.model = Some(model);
        info!(project = project.name(), samples, "trained classifier");
        Ok(samples)
    }

    /// Canonicalize and flatten a finished drawing, then ask the trained
    /// model for its class slot.
    pub fn predict(&self, image: &RgbImage) -> Result<ClassSlot, SessionError> {
        let model = self.model.as_ref().ok_or(SessionError::NotTrained)?;
        let canonical = sample::canonicalize(image);
        let row = sample::flatten(&canonical);
        let index = model.predict_class_index(&row);
        ClassSlot::from_index(index).ok_or(SessionError::UnmappedClass { index })
    }

    /// Record one feedback resolution; returns the accuracy just appended.
    pub fn record_outcome(&mut self, was_correct: bool) -> f32 {
        self.accuracy.record(was_correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    fn demo_project(root: &std::path::Path) -> Project {
        store::init_project(
            root,
            "demo",
            ["white".to_string(), "black".to_string(), "gray".to_string()],
        )
        .unwrap()
    }

    fn solid(value: u8) -> RgbImage {
        RgbImage::from_pixel(100, 100, Rgb([value, value, value]))
    }

    fn save_to(project: &mut Project, slot: ClassSlot, image: &RgbImage) {
        let counter = project.ledger(slot).next_index();
        store::save_sample(project, slot, counter, image).unwrap();
        project.ledger_mut(slot).advance();
    }

    #[test]
    fn predict_before_train_is_not_trained() {
        let session = ClassifierSession::new();
        assert!(matches!(
            session.predict(&solid(0)),
            Err(SessionError::NotTrained)
        ));
    }

    #[test]
    fn train_on_one_class_is_insufficient() {
        let root = tempdir().unwrap();
        let mut project = demo_project(root.path());
        save_to(&mut project, ClassSlot::First, &solid(255));
        let mut session = ClassifierSession::new();
        assert!(matches!(
            session.train(&project),
            Err(SessionError::InsufficientData { distinct: 1 })
        ));
        assert!(!session.is_trained());
    }

    #[test]
    fn trained_session_separates_white_from_black() {
        let root = tempdir().unwrap();
        let mut project = demo_project(root.path());
        for _ in 0..3 {
            save_to(&mut project, ClassSlot::First, &solid(255));
            save_to(&mut project, ClassSlot::Second, &solid(0));
        }
        let mut session = ClassifierSession::new();
        let trained_on = session.train(&project).unwrap();
        assert_eq!(trained_on, 6);
        assert_eq!(session.predict(&solid(250)).unwrap(), ClassSlot::First);
        assert_eq!(session.predict(&solid(5)).unwrap(), ClassSlot::Second);
    }

    #[test]
    fn prediction_outside_project_slots_is_an_error() {
        // A snapshot could carry a model with more classes than the project
        // has slots; such a prediction must surface, not silently remap.
        let model = LinearModel {
            model_version: crate::classifier::MODEL_VERSION,
            input_dim: sample::SAMPLE_LEN,
            n_classes: 4,
            weights: vec![0.0; 4 * sample::SAMPLE_LEN],
            bias: vec![0.0, 0.0, 0.0, 1.0],
        };
        let session = ClassifierSession::restore(Some(model), AccuracyLedger::new());
        assert!(matches!(
            session.predict(&solid(128)),
            Err(SessionError::UnmappedClass { index: 3 })
        ));
    }

    #[test]
    fn record_outcome_appends_running_accuracy() {
        let mut session = ClassifierSession::new();
        session.record_outcome(true);
        session.record_outcome(true);
        session.record_outcome(true);
        session.record_outcome(false);
        assert_eq!(session.accuracy().correct(), 3);
        assert_eq!(session.accuracy().incorrect(), 1);
        assert_eq!(session.accuracy().history(), &[1.0, 1.0, 1.0, 0.75]);
    }

    #[test]
    fn corrupt_corpus_aborts_training() {
        let root = tempdir().unwrap();
        let mut project = demo_project(root.path());
        save_to(&mut project, ClassSlot::First, &solid(255));
        // Claim a second-class sample that was never written.
        project.ledger_mut(ClassSlot::Second).advance();
        let mut session = ClassifierSession::new();
        assert!(matches!(
            session.train(&project),
            Err(SessionError::Corpus(StoreError::CorruptSample { .. }))
        ));
    }
}
