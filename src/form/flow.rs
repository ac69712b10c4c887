//! Shared flow-controller contract.
//!
//! A flow is an ordered list of question tags. Some tags only apply for
//! certain answers; the *visible* list is the full order filtered by
//! [`Flow::applies`] (the current tag always stays visible). Step numbers and
//! progress are positions in that list, so skipping a question never
//! renumbers anything by hand.

use chrono::NaiveDate;
use serde::Serialize;

use super::validators::ValidationResult;

/// Header copy for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepCopy {
    pub title: &'static str,
    pub subtitle: &'static str,
}

/// Result of pressing "Avanti".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance<S> {
    /// Validation passed; now on this step.
    Moved(S),
    /// Validation failed; the message is also stored in the step state.
    Rejected(String),
    /// Already on the summary; the only way forward is submission.
    AtEnd,
}

/// Result of pressing "Indietro".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Back<S> {
    Moved(S),
    /// Was on the first question: the orchestrator leaves the flow.
    ExitFlow,
}

pub trait Flow {
    type Step: Copy + PartialEq + std::fmt::Debug + 'static;

    /// Every question in order, conditional ones included.
    const ALL: &'static [Self::Step];

    fn current(&self) -> Self::Step;

    fn set_current(&mut self, step: Self::Step);

    fn set_error(&mut self, message: String);

    /// Whether `step` is asked given the answers so far.
    fn applies(&self, step: Self::Step, today: NaiveDate) -> bool;

    /// Validate the answer belonging to `step`.
    fn validate(&self, step: Self::Step) -> ValidationResult;

    fn copy(step: Self::Step) -> StepCopy;

    fn visible_steps(&self, today: NaiveDate) -> Vec<Self::Step> {
        let current = self.current();
        Self::ALL
            .iter()
            .copied()
            .filter(|s| *s == current || self.applies(*s, today))
            .collect()
    }

    /// 1-based position of the current step among the visible steps.
    fn position(&self, today: NaiveDate) -> usize {
        let current = self.current();
        self.visible_steps(today)
            .iter()
            .position(|s| *s == current)
            .map(|i| i + 1)
            .unwrap_or(1)
    }

    fn is_terminal(&self) -> bool {
        Self::ALL.last() == Some(&self.current())
    }

    fn next(&mut self, today: NaiveDate) -> Advance<Self::Step> {
        let current = self.current();
        let result = self.validate(current);
        if let Some(message) = result.message {
            self.set_error(message.clone());
            return Advance::Rejected(message);
        }
        self.set_error(String::new());

        let visible = self.visible_steps(today);
        let idx = visible.iter().position(|s| *s == current).unwrap_or(0);
        match visible.get(idx + 1) {
            Some(next) => {
                self.set_current(*next);
                Advance::Moved(*next)
            }
            None => Advance::AtEnd,
        }
    }

    /// Re-validate every visible question before the summary. On the first
    /// failure the flow returns to that question with its error set.
    fn recheck(&mut self, today: NaiveDate) -> Option<String> {
        let summary = Self::ALL.last().copied();
        for step in self.visible_steps(today) {
            if Some(step) == summary {
                continue;
            }
            if let Some(message) = self.validate(step).message {
                self.set_current(step);
                self.set_error(message.clone());
                return Some(message);
            }
        }
        None
    }

    fn back(&mut self, today: NaiveDate) -> Back<Self::Step> {
        self.set_error(String::new());
        let current = self.current();
        let visible = self.visible_steps(today);
        let idx = visible.iter().position(|s| *s == current).unwrap_or(0);
        if idx == 0 {
            return Back::ExitFlow;
        }
        let prev = visible[idx - 1];
        self.set_current(prev);
        Back::Moved(prev)
    }
}
