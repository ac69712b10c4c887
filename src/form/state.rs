//! Wizard state: macro-phase, answers so far, progress and header copy.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dipendente::{DipendenteData, DipendenteStep};
use super::draft::FormDraft;
use super::flow::{Flow, StepCopy};
use super::model::{ContactInfo, UserPosition};
use super::pensionato::{PensionatoData, PensionatoStep};
use super::validators::FieldError;
use crate::config::PhaseOrder;

/// Pre-flow phases (contact and profile selection) count as one step each.
const PRE_FLOW_STEPS: usize = 2;

/// Progress total shown before a profile is chosen: the longest full branch.
pub const MAX_TOTAL_STEPS: usize = PRE_FLOW_STEPS + DipendenteData::ALL.len();

/// Macro-phase of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    #[default]
    CollectingContact,
    SelectingProfile,
    /// Answering the questions of the selected profile.
    RunningFlow,
    Submitted,
}

impl FormPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Submitted)
    }
}

impl std::fmt::Display for FormPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CollectingContact => "collecting_contact",
            Self::SelectingProfile => "selecting_profile",
            Self::RunningFlow => "running_flow",
            Self::Submitted => "submitted",
        };
        write!(f, "{s}")
    }
}

/// Current question of whichever flow is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlowStep {
    Pensionato(PensionatoStep),
    Dipendente(DipendenteStep),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percent: u8,
}

impl Progress {
    fn new(current: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0
        } else {
            ((current as f64 / total as f64) * 100.0).round().min(100.0) as u8
        };
        Self {
            current,
            total,
            percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Blue,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub text: &'static str,
    pub color: BadgeColor,
}

const QUICK_REPLY_BADGE: Badge = Badge {
    text: "Risposta rapida garantita",
    color: BadgeColor::Blue,
};

const SAVED_BADGE: Badge = Badge {
    text: "Dati salvati ✓",
    color: BadgeColor::Green,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<Badge>,
    pub title: &'static str,
    pub subtitle: &'static str,
}

impl From<StepCopy> for Header {
    fn from(copy: StepCopy) -> Self {
        Self {
            badge: None,
            title: copy.title,
            subtitle: copy.subtitle,
        }
    }
}

/// Everything the orchestrator tracks for one applicant session.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub phase: FormPhase,
    pub contact: ContactInfo,
    pub contact_info_submitted: bool,
    pub contact_errors: Vec<FieldError>,
    pub user_position: Option<UserPosition>,
    pub pensionato: PensionatoData,
    pub dipendente: DipendenteData,
    /// Privacy consent checkbox.
    pub consent: bool,
    /// A submission is in flight.
    pub loading: bool,
    /// Dismissible submission error.
    pub banner: Option<String>,
}

impl FormState {
    pub fn new(order: PhaseOrder) -> Self {
        let mut state = Self {
            phase: FormPhase::default(),
            contact: ContactInfo::default(),
            contact_info_submitted: false,
            contact_errors: Vec::new(),
            user_position: None,
            pensionato: PensionatoData::default(),
            dipendente: DipendenteData::default(),
            consent: false,
            loading: false,
            banner: None,
        };
        state.resolve_phase(order);
        state
    }

    pub fn from_draft(draft: FormDraft, order: PhaseOrder) -> Self {
        let mut state = Self {
            contact: draft.contact,
            contact_info_submitted: draft.contact_info_submitted,
            user_position: draft.user_position,
            pensionato: draft.pensionato,
            dipendente: draft.dipendente,
            ..Self::new(order)
        };
        state.resolve_phase(order);
        state
    }

    pub fn to_draft(&self) -> FormDraft {
        FormDraft {
            contact: self.contact.clone(),
            contact_info_submitted: self.contact_info_submitted,
            user_position: self.user_position,
            pensionato: self.pensionato.clone(),
            dipendente: self.dipendente.clone(),
        }
    }

    /// Derive the pre-submission phase from what has been answered.
    pub fn resolve_phase(&mut self, order: PhaseOrder) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = match (order, self.contact_info_submitted, self.user_position) {
            (_, true, Some(_)) => FormPhase::RunningFlow,
            (PhaseOrder::ContactFirst, false, _) => FormPhase::CollectingContact,
            (PhaseOrder::ContactFirst, true, None) => FormPhase::SelectingProfile,
            (PhaseOrder::ProfileFirst, _, None) => FormPhase::SelectingProfile,
            (PhaseOrder::ProfileFirst, false, Some(_)) => FormPhase::CollectingContact,
        };
    }

    pub fn current_step(&self) -> Option<FlowStep> {
        if self.phase != FormPhase::RunningFlow {
            return None;
        }
        self.user_position.map(|position| match position {
            UserPosition::Pensionato => FlowStep::Pensionato(self.pensionato.step),
            UserPosition::Dipendente => FlowStep::Dipendente(self.dipendente.step),
        })
    }

    /// Whether the active flow is on its summary step.
    pub fn on_summary(&self) -> bool {
        match self.user_position {
            Some(UserPosition::Pensionato) => self.pensionato.is_terminal(),
            Some(UserPosition::Dipendente) => self.dipendente.is_terminal(),
            None => false,
        }
    }

    pub fn progress(&self, order: PhaseOrder, today: NaiveDate) -> Progress {
        if self.phase.is_terminal() {
            return Progress::new(MAX_TOTAL_STEPS, MAX_TOTAL_STEPS);
        }

        let (flow_position, flow_total) = match self.user_position {
            Some(UserPosition::Pensionato) => (
                self.pensionato.position(today),
                self.pensionato.visible_steps(today).len(),
            ),
            Some(UserPosition::Dipendente) => (
                self.dipendente.position(today),
                self.dipendente.visible_steps(today).len(),
            ),
            None => (0, DipendenteData::ALL.len()),
        };
        let total = PRE_FLOW_STEPS + flow_total;

        let current = match (self.phase, order) {
            (FormPhase::CollectingContact, PhaseOrder::ContactFirst)
            | (FormPhase::SelectingProfile, PhaseOrder::ProfileFirst) => 1,
            (FormPhase::SelectingProfile, PhaseOrder::ContactFirst)
            | (FormPhase::CollectingContact, PhaseOrder::ProfileFirst) => 2,
            (FormPhase::RunningFlow, _) => PRE_FLOW_STEPS + flow_position,
            (FormPhase::Submitted, _) => total,
        };
        Progress::new(current, total)
    }

    /// Header copy for the current screen. None while loading or submitted.
    pub fn header(&self) -> Option<Header> {
        if self.loading || self.phase.is_terminal() {
            return None;
        }
        let header = match self.phase {
            FormPhase::CollectingContact => Header {
                badge: Some(QUICK_REPLY_BADGE),
                title: "Inizia la tua richiesta",
                subtitle: "Inserisci i tuoi dati di contatto. Riceverai una risposta personalizzata in meno di 2 ore",
            },
            FormPhase::SelectingProfile => Header {
                badge: Some(if self.contact_info_submitted {
                    SAVED_BADGE
                } else {
                    QUICK_REPLY_BADGE
                }),
                title: "Qual è la tua posizione?",
                subtitle: "Seleziona la tua situazione per trovare le condizioni più vantaggiose",
            },
            FormPhase::RunningFlow => match self.current_step()? {
                FlowStep::Pensionato(step) => PensionatoData::copy(step).into(),
                FlowStep::Dipendente(step) => DipendenteData::copy(step).into(),
            },
            FormPhase::Submitted => return None,
        };
        Some(header)
    }
}
