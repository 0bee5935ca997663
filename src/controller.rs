//! Survey state machine.
//!
//! ```text
//! Welcome --start--> Step(1) <--advance/retreat--> ... Step(11) --finalize--> ThankYou
//! ```
//!
//! Every move flushes the active step into the answer record first. Moves
//! that are not allowed from the current phase return a [`NavigationError`]
//! and change nothing. There is no way out of `ThankYou`.
use chrono::{SecondsFormat, Utc};
use questions::{AnswerRecord, Step, catalog::TIMESTAMP_FIELD};
use thiserror::Error;
use tracing::debug;

use crate::{
    collector,
    form::Form,
    submit::{Outcome, SubmissionClient},
    view::{self, ViewModel},
};

/// Minimum horizontal travel, in pixels, for a touch gesture to count as a swipe.
pub const SWIPE_THRESHOLD: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Welcome,
    Step(Step),
    ThankYou,
}

#[derive(Debug, Clone, Default)]
pub struct SurveyState {
    phase: Phase,
    answers: AnswerRecord,
}

impl SurveyState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_step(&self) -> Option<Step> {
        match self.phase {
            Phase::Step(step) => Some(step),
            _ => None,
        }
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    #[cfg(test)]
    pub(crate) fn at(step: Step) -> Self {
        Self {
            phase: Phase::Step(step),
            answers: AnswerRecord::new(),
        }
    }

    pub(crate) fn finish(&mut self) {
        self.phase = Phase::ThankYou;
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    #[error("The survey has not started")]
    NotStarted,

    #[error("The survey is already running")]
    AlreadyStarted,

    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Already at the last step")]
    AtLastStep,

    #[error("Submit is only available on the last step, currently on {0}")]
    NotAtLastStep(Step),

    #[error("The survey was already submitted")]
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Enter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Start,
    Prev,
    Next,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Key(Key),
    /// Horizontal travel of a touch, negative to the left.
    Swipe { dx: f32 },
    Click(Button),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Advance,
    Retreat,
    Finalize,
}

impl Input {
    /// Keys and swipes only act while a step is on screen. Swipes never submit.
    pub fn command(self, phase: Phase) -> Option<Command> {
        let step = match phase {
            Phase::Step(step) => Some(step),
            _ => None,
        };

        match self {
            Input::Click(Button::Start) => Some(Command::Start),
            Input::Click(Button::Prev) => Some(Command::Retreat),
            Input::Click(Button::Next) => Some(Command::Advance),
            Input::Click(Button::Submit) => Some(Command::Finalize),
            Input::Key(Key::ArrowRight) => step.map(|_| Command::Advance),
            Input::Key(Key::ArrowLeft) => step.map(|_| Command::Retreat),
            Input::Key(Key::Enter) => step.map(|step| {
                if step.is_last() {
                    Command::Finalize
                } else {
                    Command::Advance
                }
            }),
            Input::Key(Key::Other) => None,
            Input::Swipe { dx } if dx <= -SWIPE_THRESHOLD => step.map(|_| Command::Advance),
            Input::Swipe { dx } if dx >= SWIPE_THRESHOLD => step.map(|_| Command::Retreat),
            Input::Swipe { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Started(Step),
    Moved(Step),
    Submitted(Outcome),
}

#[derive(Debug, Default)]
pub struct SurveyController {
    state: SurveyState,
}

impl SurveyController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SurveyState {
        &self.state
    }

    pub fn view(&self) -> ViewModel {
        view::render(&self.state)
    }

    /// Dismisses the welcome screen.
    pub fn start(&mut self) -> Result<Step, NavigationError> {
        match self.state.phase {
            Phase::Welcome => {
                self.state.phase = Phase::Step(Step::FIRST);
                Ok(Step::FIRST)
            }
            Phase::Step(_) => Err(NavigationError::AlreadyStarted),
            Phase::ThankYou => Err(NavigationError::Finished),
        }
    }

    pub fn advance(&mut self, form: &impl Form) -> Result<Step, NavigationError> {
        let current = self.active_step()?;
        let next = current.next().ok_or(NavigationError::AtLastStep)?;

        self.move_to(form, current, next);
        Ok(next)
    }

    pub fn retreat(&mut self, form: &impl Form) -> Result<Step, NavigationError> {
        let current = self.active_step()?;
        let prev = current.prev().ok_or(NavigationError::AtFirstStep)?;

        self.move_to(form, current, prev);
        Ok(prev)
    }

    /// Flushes the last step and the tag pickers, stamps the record and
    /// submits it. Ends on the thank-you screen whatever the outcome.
    pub async fn finalize(
        &mut self,
        form: &impl Form,
        client: &SubmissionClient,
    ) -> Result<Outcome, NavigationError> {
        let current = self.active_step()?;
        if !current.is_last() {
            return Err(NavigationError::NotAtLastStep(current));
        }

        let answers = &mut self.state.answers;
        collector::flush(&form.controls(current), answers);
        collector::collect_tags(form, answers);
        answers.set(
            TIMESTAMP_FIELD,
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        );

        let outcome = client.submit(answers).await;
        self.state.finish();

        Ok(outcome)
    }

    /// Maps a raw input onto a transition. `Ok(None)` when the input means nothing here.
    pub async fn handle(
        &mut self,
        input: Input,
        form: &impl Form,
        client: &SubmissionClient,
    ) -> Result<Option<Transition>, NavigationError> {
        let Some(command) = input.command(self.state.phase) else {
            return Ok(None);
        };

        let transition = match command {
            Command::Start => Transition::Started(self.start()?),
            Command::Advance => Transition::Moved(self.advance(form)?),
            Command::Retreat => Transition::Moved(self.retreat(form)?),
            Command::Finalize => Transition::Submitted(self.finalize(form, client).await?),
        };

        Ok(Some(transition))
    }

    fn active_step(&self) -> Result<Step, NavigationError> {
        match self.state.phase {
            Phase::Step(step) => Ok(step),
            Phase::Welcome => Err(NavigationError::NotStarted),
            Phase::ThankYou => Err(NavigationError::Finished),
        }
    }

    fn move_to(&mut self, form: &impl Form, from: Step, to: Step) {
        collector::flush(&form.controls(from), &mut self.state.answers);
        self.state.phase = Phase::Step(to);

        debug!(from = from.index(), to = to.index(), "Step changed");
    }
}
