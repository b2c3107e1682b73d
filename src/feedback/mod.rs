//! Predict-then-confirm feedback loop.
//!
//! One prediction cycle walks `Idle → Predicted → Resolved`: predict the
//! class of the finished drawing, present it for confirmation, and either
//! save under the predicted class (correct) or under the user-supplied
//! class (corrected). An unrecognized correction leaves the cycle in
//! `Predicted` with nothing mutated, so the user can re-answer or abandon.
//!
//! The direct-save path (`Idle → Resolved`) assigns the drawing to a chosen
//! class without prediction and never touches the accuracy ledger.

use image::RgbImage;
use thiserror::Error;
use tracing::{info, warn};

use crate::project::{ClassSlot, Project};
use crate::session::{ClassifierSession, SessionError};
use crate::store::{self, StoreError};
use crate::ui::{Answer, DialogLayer, DrawingSurface};

/// Errors raised while resolving feedback.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// The typed correction matched none of the three class names.
    #[error("Unknown class {entered:?}; expected one of the project's classes")]
    UnknownClass { entered: String },
    /// Prediction failed.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Saving the drawing failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Where the controller currently stands in one prediction cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackState {
    /// A finished drawing exists; no prediction made yet.
    Idle,
    /// A prediction is awaiting confirmation or correction.
    Predicted(ClassSlot),
    /// The cycle ended with a save (or a direct save happened).
    Resolved,
}

/// How one prediction cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// The prediction was confirmed and saved under the predicted class.
    Confirmed(ClassSlot),
    /// The prediction was corrected and saved under the given class.
    Corrected(ClassSlot),
    /// The user dismissed a dialog; nothing was mutated.
    Abandoned,
}

/// Drives prediction cycles and direct saves for one session.
#[derive(Debug, Default)]
pub struct FeedbackController {
    state: FeedbackState,
}

impl Default for FeedbackState {
    fn default() -> Self {
        FeedbackState::Idle
    }
}

impl FeedbackController {
    /// Controller starting in `Idle`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cycle state.
    pub fn state(&self) -> FeedbackState {
        self.state
    }

    /// Run one predict-then-confirm cycle over the current drawing.
    ///
    /// On `UnknownClass` the state stays `Predicted` and nothing is saved;
    /// retrying means the user invokes another cycle. Any cancelled dialog
    /// abandons the cycle without mutation.
    pub fn run_cycle(
        &mut self,
        project: &mut Project,
        session: &mut ClassifierSession,
        surface: &mut dyn DrawingSurface,
        dialogs: &mut dyn DialogLayer,
    ) -> Result<FeedbackOutcome, FeedbackError> {
        let drawing = surface.finished_image();
        let predicted = session.predict(&drawing)?;
        self.state = FeedbackState::Predicted(predicted);
        let predicted_name = project.ledger(predicted).name().to_string();

        let answer = dialogs.ask_yes_no_cancel(
            "Prediction Feedback",
            &format!("The drawing is probably a {predicted_name}. Is this correct?"),
        );
        match answer {
            Answer::Yes => {
                self.save_resolution(project, session, surface, &drawing, predicted, true)?;
                Ok(FeedbackOutcome::Confirmed(predicted))
            }
            Answer::No => {
                let Some(entered) =
                    dialogs.ask_string("Correct Class", "What is the correct class for this drawing?")
                else {
                    self.state = FeedbackState::Idle;
                    return Ok(FeedbackOutcome::Abandoned);
                };
                match project.match_class(&entered) {
                    Some(actual) => {
                        self.save_resolution(project, session, surface, &drawing, actual, false)?;
                        Ok(FeedbackOutcome::Corrected(actual))
                    }
                    None => {
                        warn!(entered = %entered, "correction did not match any class");
                        dialogs.show_error(
                            "Error",
                            "The class name you entered does not exist. Please try again.",
                        );
                        Err(FeedbackError::UnknownClass { entered })
                    }
                }
            }
            Answer::Cancel => {
                self.state = FeedbackState::Idle;
                Ok(FeedbackOutcome::Abandoned)
            }
        }
    }

    /// Save the current drawing straight to `slot` without prediction.
    ///
    /// Always available from `Idle`; has no accuracy-ledger effect. Returns
    /// the sample index the drawing received.
    pub fn direct_save(
        &mut self,
        project: &mut Project,
        surface: &mut dyn DrawingSurface,
        slot: ClassSlot,
    ) -> Result<u32, FeedbackError> {
        let drawing = surface.finished_image();
        let counter = project.ledger(slot).next_index();
        store::save_sample(project, slot, counter, &drawing)?;
        let index = project.ledger_mut(slot).advance();
        surface.clear();
        self.state = FeedbackState::Resolved;
        info!(class = project.ledger(slot).name(), index, "saved drawing directly");
        Ok(index)
    }

    fn save_resolution(
        &mut self,
        project: &mut Project,
        session: &mut ClassifierSession,
        surface: &mut dyn DrawingSurface,
        drawing: &RgbImage,
        slot: ClassSlot,
        was_correct: bool,
    ) -> Result<(), FeedbackError> {
        let counter = project.ledger(slot).next_index();
        store::save_sample(project, slot, counter, drawing)?;
        project.ledger_mut(slot).advance();
        let accuracy = session.record_outcome(was_correct);
        surface.clear();
        self.state = FeedbackState::Resolved;
        info!(
            class = project.ledger(slot).name(),
            index = counter,
            was_correct,
            accuracy,
            "resolved prediction"
        );
        Ok(())
    }
}
