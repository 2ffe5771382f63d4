//! Three-step questionnaire state machine.
//!
//! Transitions are guarded here rather than by which buttons a client
//! happens to show: `advance` at the last step and `retreat` at the first
//! step are rejected and leave the wizard untouched.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::questionnaire::answers::{AnswerError, Answers, Field, FieldDescriptor};
use crate::questionnaire::query::{encode_answers, Navigation, RESULTS_PATH};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("already at the final step")]
    AtFinalStep,

    #[error("already at the first step")]
    AtFirstStep,

    #[error("answers can only be submitted from the final step")]
    NotAtFinalStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Education level and field of study.
    Background,
    /// Work environment and skills.
    WorkStyle,
    /// Career interests and work values.
    Goals,
}

impl Step {
    pub const COUNT: u8 = 3;

    pub fn number(self) -> u8 {
        match self {
            Step::Background => 1,
            Step::WorkStyle => 2,
            Step::Goals => 3,
        }
    }

    pub fn next(self) -> Option<Step> {
        match self {
            Step::Background => Some(Step::WorkStyle),
            Step::WorkStyle => Some(Step::Goals),
            Step::Goals => None,
        }
    }

    pub fn previous(self) -> Option<Step> {
        match self {
            Step::Background => None,
            Step::WorkStyle => Some(Step::Background),
            Step::Goals => Some(Step::WorkStyle),
        }
    }

    pub fn fields(self) -> [Field; 2] {
        match self {
            Step::Background => [Field::EducationLevel, Field::FieldOfStudy],
            Step::WorkStyle => [Field::WorkEnvironment, Field::Skills],
            Step::Goals => [Field::CareerInterests, Field::WorkValues],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Wizard {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    step: Step,
    answers: Answers,
    touched_at: Instant,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            step: Step::Background,
            answers: Answers::default(),
            touched_at: Instant::now(),
        }
    }

    #[cfg(test)]
    pub fn step(&self) -> Step {
        self.step
    }

    #[cfg(test)]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn advance(&mut self) -> Result<Step, WizardError> {
        self.step = self.step.next().ok_or(WizardError::AtFinalStep)?;
        Ok(self.step)
    }

    pub fn retreat(&mut self) -> Result<Step, WizardError> {
        self.step = self.step.previous().ok_or(WizardError::AtFirstStep)?;
        Ok(self.step)
    }

    /// Any field can be set from any step.
    pub fn set_field(&mut self, field: Field, value: &str) -> Result<(), AnswerError> {
        self.answers.set(field, value)
    }

    /// Builds the results navigation target. The wizard keeps its answers
    /// and its step so the user can come back and adjust them.
    pub fn submit(&self) -> Result<Navigation, WizardError> {
        if self.step.next().is_some() {
            return Err(WizardError::NotAtFinalStep);
        }
        Ok(Navigation {
            path: RESULTS_PATH,
            query: encode_answers(&self.answers),
        })
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            id: self.id,
            step: self.step,
            step_number: self.step.number(),
            total_steps: Step::COUNT,
            can_go_back: self.step.previous().is_some(),
            can_go_next: self.step.next().is_some(),
            can_submit: self.step.next().is_none(),
            fields: self
                .step
                .fields()
                .into_iter()
                .map(|f| self.answers.describe(f))
                .collect(),
            answers: self.answers.clone(),
            created_at: self.created_at,
        }
    }
}

/// Snapshot of a wizard for clients: where it is and what to show.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub id: Uuid,
    pub step: Step,
    pub step_number: u8,
    pub total_steps: u8,
    pub can_go_back: bool,
    pub can_go_next: bool,
    pub can_submit: bool,
    pub fields: Vec<FieldDescriptor>,
    pub answers: Answers,
    pub created_at: DateTime<Utc>,
}

/// Live wizards, one per mounted questionnaire. A wizard nobody has read or
/// changed for `idle_ttl` is dropped when the next one is created.
#[derive(Clone)]
pub struct WizardRegistry {
    idle_ttl: Duration,
    inner: Arc<RwLock<HashMap<Uuid, Wizard>>>,
}

impl WizardRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            idle_ttl,
            inner: Arc::default(),
        }
    }

    pub fn create(&self) -> WizardView {
        let wizard = Wizard::new();
        let view = wizard.view();
        let mut wizards = self.write();
        let before = wizards.len();
        wizards.retain(|_, w| w.touched_at.elapsed() < self.idle_ttl);
        if wizards.len() < before {
            debug!("Evicted {} idle wizards", before - wizards.len());
        }
        wizards.insert(wizard.id, wizard);
        view
    }

    pub fn get(&self, id: Uuid) -> Option<WizardView> {
        self.with_wizard(id, |w| w.view())
    }

    /// Runs `f` against the wizard with `id`, returning `None` if it does not exist.
    pub fn with_wizard<T>(&self, id: Uuid, f: impl FnOnce(&mut Wizard) -> T) -> Option<T> {
        self.write().get_mut(&id).map(|wizard| {
            wizard.touched_at = Instant::now();
            f(wizard)
        })
    }

    pub fn discard(&self, id: Uuid) -> bool {
        self.write().remove(&id).is_some()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, Wizard>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
