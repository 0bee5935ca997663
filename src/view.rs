use questions::{STEP_COUNT, Step};

use crate::controller::{Phase, SurveyState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Step(Step),
    ThankYou,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Start,
    Next,
    Submit,
}

/// What a renderer should show for a given state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub screen: Screen,
    /// `current / STEP_COUNT`, zero outside the survey.
    pub progress: f32,
    pub prev_enabled: bool,
    pub primary: Option<PrimaryAction>,
}

impl ViewModel {
    pub fn progress_label(&self) -> Option<String> {
        match self.screen {
            Screen::Step(step) => Some(format!("{} / {STEP_COUNT}", step.index())),
            _ => None,
        }
    }
}

pub fn render(state: &SurveyState) -> ViewModel {
    match state.phase() {
        Phase::Welcome => ViewModel {
            screen: Screen::Welcome,
            progress: 0.0,
            prev_enabled: false,
            primary: Some(PrimaryAction::Start),
        },
        Phase::Step(step) => ViewModel {
            screen: Screen::Step(step),
            progress: step.progress(),
            prev_enabled: !step.is_first(),
            primary: Some(if step.is_last() {
                PrimaryAction::Submit
            } else {
                PrimaryAction::Next
            }),
        },
        Phase::ThankYou => ViewModel {
            screen: Screen::ThankYou,
            progress: 1.0,
            prev_enabled: false,
            primary: None,
        },
    }
}
