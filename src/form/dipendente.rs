//! Employee flow.
//!
//! Amount → salary → employee type → contract → company size → hire date →
//! TFR → summary. Public-sector employees never see company size or TFR;
//! other employees hired within the last six months skip TFR. The public
//! sector rule wins when both apply.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::flow::{Flow, StepCopy};
use super::model::{AMOUNT_SLIDER, ContractType, EmployeeType, SALARY_SLIDER, TfrAnswer, nullable};
use super::validators::{self, ValidationResult};

/// Hires more recent than this skip the TFR question.
pub const RECENT_HIRE_MONTHS: u32 = 6;

/// Questions of the employee flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DipendenteStep {
    Amount,
    Salary,
    EmployeeType,
    ContractType,
    CompanySize,
    HireDate,
    Tfr,
    Summary,
}

impl std::fmt::Display for DipendenteStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Amount => "amount",
            Self::Salary => "salary",
            Self::EmployeeType => "employee_type",
            Self::ContractType => "contract_type",
            Self::CompanySize => "company_size",
            Self::HireDate => "hire_date",
            Self::Tfr => "tfr",
            Self::Summary => "summary",
        };
        write!(f, "{s}")
    }
}

/// Step state of the employee flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DipendenteData {
    pub step: DipendenteStep,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Net monthly salary.
    #[serde(with = "rust_decimal::serde::float")]
    pub salary: Decimal,
    #[serde(default)]
    pub tipo: Option<EmployeeType>,
    #[serde(default)]
    pub contratto: Option<ContractType>,
    /// Employee count as typed.
    #[serde(default)]
    pub num_dipendenti: String,
    #[serde(default)]
    pub data_assunzione: Option<NaiveDate>,
    #[serde(default)]
    pub tfr: Option<TfrAnswer>,
    #[serde(default)]
    pub error: String,
}

impl Default for DipendenteData {
    fn default() -> Self {
        Self {
            step: DipendenteStep::Amount,
            amount: dec!(30000),
            salary: dec!(1800),
            tipo: None,
            contratto: None,
            num_dipendenti: String::new(),
            data_assunzione: None,
            tfr: None,
            error: String::new(),
        }
    }
}

/// Partial update of [`DipendenteData`]'s answers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DipendentePatch {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub salary: Option<Decimal>,
    /// `null` clears the answer, as for the other optional fields below.
    #[serde(default, deserialize_with = "nullable")]
    pub tipo: Option<Option<EmployeeType>>,
    #[serde(default, deserialize_with = "nullable")]
    pub contratto: Option<Option<ContractType>>,
    pub num_dipendenti: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub data_assunzione: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub tfr: Option<Option<TfrAnswer>>,
}

impl DipendenteData {
    /// Merge `patch`. With `clamp` set, currency answers snap to the slider bounds.
    pub fn apply(&mut self, patch: DipendentePatch, clamp: bool) {
        if let Some(amount) = patch.amount {
            self.amount = if clamp { AMOUNT_SLIDER.clamp(amount) } else { amount };
        }
        if let Some(salary) = patch.salary {
            self.salary = if clamp { SALARY_SLIDER.clamp(salary) } else { salary };
        }
        if let Some(tipo) = patch.tipo {
            self.tipo = tipo;
        }
        if let Some(contratto) = patch.contratto {
            self.contratto = contratto;
        }
        if let Some(num) = patch.num_dipendenti {
            self.num_dipendenti = num;
        }
        if let Some(date) = patch.data_assunzione {
            self.data_assunzione = date;
        }
        if let Some(tfr) = patch.tfr {
            self.tfr = tfr;
        }
    }

    pub fn is_public_sector(&self) -> bool {
        self.tipo.is_some_and(|t| t.is_public_sector())
    }

    /// Hired strictly after `today` minus six months. Unknown dates are not recent.
    pub fn is_recent_hire(&self, today: NaiveDate) -> bool {
        let Some(hired) = self.data_assunzione else {
            return false;
        };
        match today.checked_sub_months(Months::new(RECENT_HIRE_MONTHS)) {
            Some(cutoff) => hired > cutoff,
            None => false,
        }
    }
}

impl Flow for DipendenteData {
    type Step = DipendenteStep;

    const ALL: &'static [DipendenteStep] = &[
        DipendenteStep::Amount,
        DipendenteStep::Salary,
        DipendenteStep::EmployeeType,
        DipendenteStep::ContractType,
        DipendenteStep::CompanySize,
        DipendenteStep::HireDate,
        DipendenteStep::Tfr,
        DipendenteStep::Summary,
    ];

    fn current(&self) -> DipendenteStep {
        self.step
    }

    fn set_current(&mut self, step: DipendenteStep) {
        self.step = step;
    }

    fn set_error(&mut self, message: String) {
        self.error = message;
    }

    fn applies(&self, step: DipendenteStep, today: NaiveDate) -> bool {
        match step {
            DipendenteStep::CompanySize => !self.is_public_sector(),
            DipendenteStep::Tfr => !self.is_public_sector() && !self.is_recent_hire(today),
            _ => true,
        }
    }

    fn validate(&self, step: DipendenteStep) -> ValidationResult {
        match step {
            DipendenteStep::Amount => validators::validate_amount(self.amount),
            DipendenteStep::Salary => validators::validate_salary(self.salary),
            DipendenteStep::EmployeeType => validators::validate_employee_type(self.tipo),
            DipendenteStep::ContractType => validators::validate_contract(self.contratto),
            DipendenteStep::CompanySize => validators::validate_company_size(&self.num_dipendenti),
            DipendenteStep::HireDate => validators::validate_hire_date(self.data_assunzione),
            DipendenteStep::Tfr => validators::validate_tfr(self.tfr),
            DipendenteStep::Summary => ValidationResult::passed(),
        }
    }

    fn copy(step: DipendenteStep) -> StepCopy {
        let (title, subtitle) = match step {
            DipendenteStep::Amount => (
                "Di quanto hai bisogno?",
                "Questo ci aiuta a calcolare la rata mensile ottimale per te",
            ),
            DipendenteStep::Salary => (
                "Qual è il tuo stipendio netto?",
                "Necessario per determinare l'importo massimo finanziabile",
            ),
            DipendenteStep::EmployeeType => (
                "Tipo di dipendente",
                "Il settore pubblico e privato hanno condizioni diverse",
            ),
            DipendenteStep::ContractType => (
                "Tipo di contratto",
                "Richiesto per valutare l'idoneità della pratica",
            ),
            DipendenteStep::CompanySize => (
                "Dimensione dell'azienda",
                "Aziende più grandi offrono maggiori garanzie",
            ),
            DipendenteStep::HireDate => (
                "Quando sei stato assunto?",
                "Per calcolare l'anzianità lavorativa",
            ),
            DipendenteStep::Tfr => (
                "Domanda sul TFR",
                "Il TFR può essere usato come garanzia aggiuntiva",
            ),
            DipendenteStep::Summary => (
                "Quasi fatto!",
                "Clicca per inviare la richiesta e ricevere la tua offerta personalizzata",
            ),
        };
        StepCopy { title, subtitle }
    }
}
