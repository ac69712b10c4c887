//! Pensioner flow: amount → pension → pension body → pension type → summary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::flow::{Flow, StepCopy};
use super::model::{AMOUNT_SLIDER, PENSION_SLIDER, PensionBody, PensionType, nullable};
use super::validators::{self, ValidationResult};

/// Questions of the pensioner flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PensionatoStep {
    Amount,
    Pension,
    PensionBody,
    /// Skipped for pensioners resident abroad.
    PensionType,
    Summary,
}

impl std::fmt::Display for PensionatoStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Amount => "amount",
            Self::Pension => "pension",
            Self::PensionBody => "pension_body",
            Self::PensionType => "pension_type",
            Self::Summary => "summary",
        };
        write!(f, "{s}")
    }
}

/// Step state of the pensioner flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionatoData {
    pub step: PensionatoStep,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Net monthly pension.
    #[serde(with = "rust_decimal::serde::float")]
    pub pension: Decimal,
    #[serde(default)]
    pub ente: Option<PensionBody>,
    #[serde(default)]
    pub tipo: Option<PensionType>,
    #[serde(default)]
    pub error: String,
}

impl Default for PensionatoData {
    fn default() -> Self {
        Self {
            step: PensionatoStep::Amount,
            amount: dec!(25000),
            pension: dec!(1200),
            ente: None,
            tipo: None,
            error: String::new(),
        }
    }
}

/// Partial update of [`PensionatoData`]'s answers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PensionatoPatch {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub pension: Option<Decimal>,
    /// `null` clears the answer.
    #[serde(default, deserialize_with = "nullable")]
    pub ente: Option<Option<PensionBody>>,
    #[serde(default, deserialize_with = "nullable")]
    pub tipo: Option<Option<PensionType>>,
}

impl PensionatoData {
    /// Merge `patch`. With `clamp` set, currency answers snap to the slider bounds.
    pub fn apply(&mut self, patch: PensionatoPatch, clamp: bool) {
        if let Some(amount) = patch.amount {
            self.amount = if clamp { AMOUNT_SLIDER.clamp(amount) } else { amount };
        }
        if let Some(pension) = patch.pension {
            self.pension = if clamp { PENSION_SLIDER.clamp(pension) } else { pension };
        }
        if let Some(ente) = patch.ente {
            self.ente = ente;
        }
        if let Some(tipo) = patch.tipo {
            self.tipo = tipo;
        }
    }

    fn resident_abroad(&self) -> bool {
        self.ente == Some(PensionBody::ResidenteEstero)
    }
}

impl Flow for PensionatoData {
    type Step = PensionatoStep;

    const ALL: &'static [PensionatoStep] = &[
        PensionatoStep::Amount,
        PensionatoStep::Pension,
        PensionatoStep::PensionBody,
        PensionatoStep::PensionType,
        PensionatoStep::Summary,
    ];

    fn current(&self) -> PensionatoStep {
        self.step
    }

    fn set_current(&mut self, step: PensionatoStep) {
        self.step = step;
    }

    fn set_error(&mut self, message: String) {
        self.error = message;
    }

    fn applies(&self, step: PensionatoStep, _today: NaiveDate) -> bool {
        match step {
            PensionatoStep::PensionType => !self.resident_abroad(),
            _ => true,
        }
    }

    fn validate(&self, step: PensionatoStep) -> ValidationResult {
        match step {
            PensionatoStep::Amount => validators::validate_amount(self.amount),
            PensionatoStep::Pension => validators::validate_pension(self.pension),
            PensionatoStep::PensionBody => validators::validate_pension_body(self.ente),
            PensionatoStep::PensionType => validators::validate_pension_type(self.tipo),
            PensionatoStep::Summary => ValidationResult::passed(),
        }
    }

    fn copy(step: PensionatoStep) -> StepCopy {
        let (title, subtitle) = match step {
            PensionatoStep::Amount => (
                "Di quanto hai bisogno?",
                "Questo ci aiuta a calcolare la rata mensile ottimale per te",
            ),
            PensionatoStep::Pension => (
                "Qual è la tua pensione mensile?",
                "Necessario per determinare l'importo massimo finanziabile",
            ),
            PensionatoStep::PensionBody => (
                "Ente pensionistico",
                "Per velocizzare la pratica con il tuo ente",
            ),
            PensionatoStep::PensionType => (
                "Tipologia di pensione",
                "Alcune tipologie hanno condizioni speciali più vantaggiose",
            ),
            PensionatoStep::Summary => (
                "Quasi fatto!",
                "Clicca per inviare la richiesta e ricevere la tua offerta personalizzata",
            ),
        };
        StepCopy { title, subtitle }
    }
}
