//! Session wiring: one context object owning project, store paths, and
//! classifier session, plus the interactive startup and shutdown flows.
//!
//! Everything runs on the single event thread of the embedding shell;
//! train and predict block until done. No component reaches for ambient
//! globals or the process working directory: the projects root is threaded
//! through explicitly.

use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;
use tracing::{error, info};

use crate::config::AppSettings;
use crate::feedback::{FeedbackController, FeedbackError, FeedbackOutcome, FeedbackState};
use crate::persistence::{self, PersistenceError};
use crate::project::{CLASS_COUNT, ClassSlot, DEFAULT_CLASS_POOL, Project, parse_pool};
use crate::session::{ClassifierSession, SessionError};
use crate::ui::{Answer, DialogLayer, DrawingSurface};

const APP_TITLE: &str = "Sketch Classifier";

/// Errors surfaced by the trainer wiring.
#[derive(Debug, Error)]
pub enum TrainerError {
    /// Bootstrap or snapshot failure.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// Training or prediction failure.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Feedback resolution failure.
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
}

/// The active labeling session: project identity, classifier, feedback
/// state, and the projects root everything is stored under.
#[derive(Debug)]
pub struct TrainerSession {
    projects_root: PathBuf,
    project: Project,
    session: ClassifierSession,
    controller: FeedbackController,
}

impl TrainerSession {
    /// Wrap an already bootstrapped or restored project.
    pub fn resume(projects_root: PathBuf, project: Project, session: ClassifierSession) -> Self {
        Self {
            projects_root,
            project,
            session,
            controller: FeedbackController::new(),
        }
    }

    /// Interactive startup: load a saved project or create a new one.
    ///
    /// Returns `Ok(None)` when the user cancels out of startup entirely.
    /// `ProjectNotFound` re-prompts for another name; a corrupt snapshot
    /// aborts startup before any session state exists.
    pub fn startup<R: Rng>(
        projects_root: &Path,
        dialogs: &mut dyn DialogLayer,
        rng: &mut R,
    ) -> Result<Option<Self>, TrainerError> {
        match dialogs.ask_yes_no_cancel("Load Project?", "Do you want to load a saved project?") {
            Answer::Yes => Self::startup_existing(projects_root, dialogs),
            Answer::No => Self::startup_new(projects_root, dialogs, rng),
            Answer::Cancel => Ok(None),
        }
    }

    fn startup_existing(
        projects_root: &Path,
        dialogs: &mut dyn DialogLayer,
    ) -> Result<Option<Self>, TrainerError> {
        loop {
            let Some(name) =
                dialogs.ask_string("Project Name", "Please enter your saved project name!")
            else {
                return Ok(None);
            };
            match persistence::load_snapshot(projects_root, name.trim()) {
                Ok((project, session)) => {
                    return Ok(Some(Self::resume(
                        projects_root.to_path_buf(),
                        project,
                        session,
                    )));
                }
                Err(PersistenceError::ProjectNotFound { .. }) => {
                    dialogs.show_error(
                        "Error",
                        "The project name you entered does not exist. Please try again.",
                    );
                }
                Err(err) => {
                    error!(%err, "failed to restore project");
                    dialogs.show_error("Error", &err.to_string());
                    return Err(err.into());
                }
            }
        }
    }

    fn startup_new<R: Rng>(
        projects_root: &Path,
        dialogs: &mut dyn DialogLayer,
        rng: &mut R,
    ) -> Result<Option<Self>, TrainerError> {
        let Some(name) = dialogs.ask_string("Project Name", "Please enter your new project name!")
        else {
            return Ok(None);
        };
        let name = name.trim().to_string();

        let project = match dialogs.ask_yes_no_cancel("Random Classes?", "Do you want to get random classes?")
        {
            Answer::Cancel => return Ok(None),
            Answer::Yes => {
                let pool = parse_pool(DEFAULT_CLASS_POOL);
                persistence::bootstrap_new_random(projects_root, &name, &pool, rng)
            }
            Answer::No => {
                let Some(class_names) = Self::ask_class_names(dialogs) else {
                    return Ok(None);
                };
                persistence::bootstrap_new(projects_root, &name, class_names)
            }
        };
        match project {
            Ok(project) => Ok(Some(Self::resume(
                projects_root.to_path_buf(),
                project,
                ClassifierSession::new(),
            ))),
            Err(err) => {
                error!(%err, "failed to bootstrap project");
                dialogs.show_error("Error", &err.to_string());
                Err(err.into())
            }
        }
    }

    fn ask_class_names(dialogs: &mut dyn DialogLayer) -> Option<[String; CLASS_COUNT]> {
        const PROMPTS: [(&str, &str); CLASS_COUNT] = [
            ("Class 1", "What is the name of the first class?"),
            ("Class 2", "What is the name of the second class?"),
            ("Class 3", "What is the name of the third class?"),
        ];
        let mut names: Vec<String> = Vec::with_capacity(CLASS_COUNT);
        for (title, prompt) in PROMPTS {
            names.push(dialogs.ask_string(title, prompt)?.trim().to_string());
        }
        let mut drained = names.into_iter();
        Some(std::array::from_fn(|_| {
            drained.next().expect("exactly CLASS_COUNT names collected")
        }))
    }

    /// Push brush settings to the drawing surface.
    pub fn apply_brush(&self, settings: &AppSettings, surface: &mut dyn DrawingSurface) {
        surface.set_brush(settings.brush_width, settings.brush_color);
    }

    /// Retrain on the full stored corpus, confirming success via dialog.
    pub fn train(&mut self, dialogs: &mut dyn DialogLayer) -> Result<usize, TrainerError> {
        match self.session.train(&self.project) {
            Ok(samples) => {
                dialogs.show_info(APP_TITLE, "Model successfully trained!");
                Ok(samples)
            }
            Err(err) => {
                error!(%err, "training failed");
                dialogs.show_error("Error", &err.to_string());
                Err(err.into())
            }
        }
    }

    /// Run one predict-then-confirm cycle over the current drawing.
    pub fn predict_cycle(
        &mut self,
        surface: &mut dyn DrawingSurface,
        dialogs: &mut dyn DialogLayer,
    ) -> Result<FeedbackOutcome, TrainerError> {
        match self
            .controller
            .run_cycle(&mut self.project, &mut self.session, surface, dialogs)
        {
            Ok(outcome) => Ok(outcome),
            // The controller already surfaced the unknown-class dialog.
            Err(err @ FeedbackError::UnknownClass { .. }) => Err(err.into()),
            Err(err) => {
                error!(%err, "prediction cycle failed");
                dialogs.show_error("Error", &err.to_string());
                Err(err.into())
            }
        }
    }

    /// Save the current drawing straight to one of the three classes.
    pub fn direct_save(
        &mut self,
        surface: &mut dyn DrawingSurface,
        slot: ClassSlot,
        dialogs: &mut dyn DialogLayer,
    ) -> Result<u32, TrainerError> {
        match self
            .controller
            .direct_save(&mut self.project, surface, slot)
        {
            Ok(index) => Ok(index),
            Err(err) => {
                error!(%err, "direct save failed");
                dialogs.show_error("Error", &err.to_string());
                Err(err.into())
            }
        }
    }

    /// Snapshot the whole session, confirming success via dialog.
    pub fn save(&self, dialogs: &mut dyn DialogLayer) -> Result<(), TrainerError> {
        match persistence::save_snapshot(&self.project, &self.session) {
            Ok(_) => {
                dialogs.show_info(APP_TITLE, "Project successfully saved!");
                Ok(())
            }
            Err(err) => {
                error!(%err, "snapshot failed");
                dialogs.show_error("Error", &err.to_string());
                Err(err.into())
            }
        }
    }

    /// Handle exit intent: offer to save, then confirm termination.
    ///
    /// Returns `true` when the shell should terminate. A failed save is
    /// surfaced as an error before this returns; cancel keeps the session
    /// running with nothing discarded.
    pub fn shutdown(&self, dialogs: &mut dyn DialogLayer) -> Result<bool, TrainerError> {
        match dialogs.ask_yes_no_cancel("Quit?", "Do you want to save your work?") {
            Answer::Cancel => Ok(false),
            Answer::No => {
                info!(project = self.project.name(), "terminating without saving");
                Ok(true)
            }
            Answer::Yes => {
                self.save(dialogs)?;
                info!(project = self.project.name(), "saved and terminating");
                Ok(true)
            }
        }
    }

    /// The active project.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// The classifier session.
    pub fn session(&self) -> &ClassifierSession {
        &self.session
    }

    /// Current feedback-cycle state.
    pub fn feedback_state(&self) -> FeedbackState {
        self.controller.state()
    }

    /// Accuracy sequence for the plotting collaborator: one value per
    /// resolved prediction cycle, oldest first.
    pub fn accuracy_history(&self) -> &[f32] {
        self.session.accuracy().history()
    }

    /// Root directory the project corpus lives under.
    pub fn projects_root(&self) -> &Path {
        &self.projects_root
    }
}
