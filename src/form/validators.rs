//! Field validators: pure predicates over a single answer.
//!
//! Every rule returns a [`ValidationResult`] carrying the exact message shown
//! inline under the field. Thresholds are business rules, not UI bounds: the
//! income sliders start at 700 but the hard gate is 660.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::model::{ContactInfo, ContractType, EmployeeType, PensionBody, PensionType, TfrAnswer};

/// Minimum net monthly salary or pension.
pub const MIN_MONTHLY_INCOME: Decimal = dec!(660);

/// Minimum number of employees at the applicant's company.
pub const MIN_COMPANY_SIZE: u32 = 11;

pub mod messages {
    pub const INVALID_AMOUNT: &str = "Inserisci un importo valido";
    pub const PENSION_BELOW_MINIMUM: &str = "Non è possibile procedere perché l'importo della pensione è al di sotto del minimo richiesto";
    pub const SALARY_BELOW_MINIMUM: &str = "Non è possibile procedere perché l'importo dello stipendio è al di sotto del minimo richiesto";
    pub const CANNOT_PROCEED: &str = "Non è possibile procedere";
    pub const SELECT_EMPLOYEE_TYPE: &str = "Seleziona una tipologia di dipendente";
    pub const SELECT_CONTRACT: &str = "Seleziona una tipologia di contratto";
    pub const FIXED_TERM_CONTRACT: &str =
        "Non è possibile procedere con contratto a tempo determinato";
    pub const SELECT_PENSION_BODY: &str = "Seleziona un ente pensionistico";
    pub const SELECT_PENSION_TYPE: &str = "Seleziona una tipologia di pensione";
    pub const NON_FINANCEABLE_PENSION: &str =
        "Spiacente, non possiamo finanziare questa tipologia di pensione";
    pub const MISSING_HIRE_DATE: &str = "Inserisci la data di assunzione";
    pub const MISSING_TFR: &str = "Rispondi alla domanda sul TFR";
    pub const FIRST_NAME_TOO_SHORT: &str = "Il nome deve contenere almeno 2 caratteri";
    pub const LAST_NAME_TOO_SHORT: &str = "Il cognome deve contenere almeno 2 caratteri";
    pub const INVALID_EMAIL: &str = "Inserisci un indirizzo email valido";
    pub const PHONE_TOO_SHORT: &str = "Il numero di telefono deve contenere almeno 10 cifre";
    pub const SELECT_BIRTH_MONTH: &str = "Seleziona il mese di nascita";
    pub const INVALID_BIRTH_YEAR: &str = "Inserisci un anno di nascita valido (4 cifre)";
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("email pattern is valid")
});

/// Outcome of a single field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn passed() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }

    fn check(ok: bool, message: &str) -> Self {
        if ok {
            Self::passed()
        } else {
            Self::failed(message)
        }
    }
}

// ── Loan answers ────────────────────────────────────────────────────

pub fn validate_amount(amount: Decimal) -> ValidationResult {
    ValidationResult::check(amount > Decimal::ZERO, messages::INVALID_AMOUNT)
}

pub fn validate_pension(pension: Decimal) -> ValidationResult {
    ValidationResult::check(pension >= MIN_MONTHLY_INCOME, messages::PENSION_BELOW_MINIMUM)
}

pub fn validate_salary(salary: Decimal) -> ValidationResult {
    ValidationResult::check(salary >= MIN_MONTHLY_INCOME, messages::SALARY_BELOW_MINIMUM)
}

/// Employee count arrives as typed text; anything non-numeric is blocked.
pub fn validate_company_size(raw: &str) -> ValidationResult {
    let ok = raw
        .trim()
        .parse::<u32>()
        .map(|n| n >= MIN_COMPANY_SIZE)
        .unwrap_or(false);
    ValidationResult::check(ok, messages::CANNOT_PROCEED)
}

pub fn validate_employee_type(tipo: Option<EmployeeType>) -> ValidationResult {
    ValidationResult::check(tipo.is_some(), messages::SELECT_EMPLOYEE_TYPE)
}

pub fn validate_contract(contratto: Option<ContractType>) -> ValidationResult {
    match contratto {
        None => ValidationResult::failed(messages::SELECT_CONTRACT),
        Some(ContractType::Determinato) => ValidationResult::failed(messages::FIXED_TERM_CONTRACT),
        Some(_) => ValidationResult::passed(),
    }
}

pub fn validate_pension_body(ente: Option<PensionBody>) -> ValidationResult {
    ValidationResult::check(ente.is_some(), messages::SELECT_PENSION_BODY)
}

pub fn validate_pension_type(tipo: Option<PensionType>) -> ValidationResult {
    match tipo {
        None => ValidationResult::failed(messages::SELECT_PENSION_TYPE),
        Some(t) if !t.is_financeable() => {
            ValidationResult::failed(messages::NON_FINANCEABLE_PENSION)
        }
        Some(_) => ValidationResult::passed(),
    }
}

/// Only presence is checked; the date itself drives branching.
pub fn validate_hire_date(date: Option<NaiveDate>) -> ValidationResult {
    ValidationResult::check(date.is_some(), messages::MISSING_HIRE_DATE)
}

pub fn validate_tfr(tfr: Option<TfrAnswer>) -> ValidationResult {
    match tfr {
        None => ValidationResult::failed(messages::MISSING_TFR),
        Some(TfrAnswer::No) => ValidationResult::failed(messages::CANNOT_PROCEED),
        Some(TfrAnswer::Si) => ValidationResult::passed(),
    }
}

// ── Contact details ─────────────────────────────────────────────────

pub fn validate_first_name(nome: &str) -> ValidationResult {
    ValidationResult::check(nome.trim().chars().count() >= 2, messages::FIRST_NAME_TOO_SHORT)
}

pub fn validate_last_name(cognome: &str) -> ValidationResult {
    ValidationResult::check(cognome.trim().chars().count() >= 2, messages::LAST_NAME_TOO_SHORT)
}

pub fn validate_email(mail: &str) -> ValidationResult {
    ValidationResult::check(EMAIL_RE.is_match(mail.trim()), messages::INVALID_EMAIL)
}

/// Raw input length, separators included.
pub fn validate_phone(telefono: &str) -> ValidationResult {
    ValidationResult::check(telefono.chars().count() >= 10, messages::PHONE_TOO_SHORT)
}

pub fn validate_birth_month(mese: &str) -> ValidationResult {
    let ok = mese.len() == 2
        && mese
            .parse::<u8>()
            .map(|m| (1..=12).contains(&m))
            .unwrap_or(false);
    ValidationResult::check(ok, messages::SELECT_BIRTH_MONTH)
}

pub fn validate_birth_year(anno: &str) -> ValidationResult {
    let ok = anno.len() == 4 && anno.bytes().all(|b| b.is_ascii_digit());
    ValidationResult::check(ok, messages::INVALID_BIRTH_YEAR)
}

/// A failed contact field, keyed by its wire name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Check every contact field. Returns all failures, in form order.
pub fn validate_contact(contact: &ContactInfo) -> Vec<FieldError> {
    let checks = [
        ("nome", validate_first_name(&contact.nome)),
        ("cognome", validate_last_name(&contact.cognome)),
        ("mail", validate_email(&contact.mail)),
        ("telefono", validate_phone(&contact.telefono)),
        ("meseNascita", validate_birth_month(&contact.mese_nascita)),
        ("annoNascita", validate_birth_year(&contact.anno_nascita)),
    ];
    checks
        .into_iter()
        .filter_map(|(field, result)| {
            result.message.map(|message| FieldError { field, message })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_contact() -> ContactInfo {
        ContactInfo {
            nome: "Mario".into(),
            cognome: "Rossi".into(),
            mail: "mario.rossi@esempio.it".into(),
            telefono: "+39 333 123 4567".into(),
            mese_nascita: "05".into(),
            anno_nascita: "1985".into(),
        }
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(!validate_amount(dec!(0)).ok);
        assert!(!validate_amount(dec!(-500)).ok);
        assert_eq!(
            validate_amount(dec!(0)).message.as_deref(),
            Some(messages::INVALID_AMOUNT)
        );
        assert!(validate_amount(dec!(1)).ok);
        assert!(validate_amount(dec!(30000)).ok);
    }

    #[test]
    fn income_gate_is_660() {
        assert!(!validate_salary(dec!(659.99)).ok);
        assert!(validate_salary(dec!(660)).ok);
        assert!(!validate_pension(dec!(0)).ok);
        assert!(validate_pension(dec!(660)).ok);
        assert_eq!(
            validate_pension(dec!(500)).message.as_deref(),
            Some(messages::PENSION_BELOW_MINIMUM)
        );
        assert_eq!(
            validate_salary(dec!(500)).message.as_deref(),
            Some(messages::SALARY_BELOW_MINIMUM)
        );
    }

    #[test]
    fn company_size_needs_eleven() {
        assert!(!validate_company_size("").ok);
        assert!(!validate_company_size("10").ok);
        assert!(!validate_company_size("abc").ok);
        assert!(!validate_company_size("-20").ok);
        assert!(validate_company_size("11").ok);
        assert!(validate_company_size(" 250 ").ok);
    }

    #[test]
    fn fixed_term_contract_blocks() {
        assert_eq!(
            validate_contract(Some(ContractType::Determinato)).message.as_deref(),
            Some(messages::FIXED_TERM_CONTRACT)
        );
        assert_eq!(
            validate_contract(None).message.as_deref(),
            Some(messages::SELECT_CONTRACT)
        );
        assert!(validate_contract(Some(ContractType::Indeterminato)).ok);
        assert!(validate_contract(Some(ContractType::Altro)).ok);
    }

    #[test]
    fn non_financeable_pension_blocks() {
        for tipo in PensionType::NON_FINANCEABLE {
            let result = validate_pension_type(Some(tipo));
            assert_eq!(result.message.as_deref(), Some(messages::NON_FINANCEABLE_PENSION));
        }
        assert!(validate_pension_type(Some(PensionType::Vecchiaia)).ok);
        assert!(!validate_pension_type(None).ok);
    }

    #[test]
    fn tfr_no_blocks() {
        assert!(validate_tfr(Some(TfrAnswer::Si)).ok);
        assert_eq!(
            validate_tfr(Some(TfrAnswer::No)).message.as_deref(),
            Some(messages::CANNOT_PROCEED)
        );
        assert_eq!(
            validate_tfr(None).message.as_deref(),
            Some(messages::MISSING_TFR)
        );
    }

    #[test]
    fn hire_date_only_needs_presence() {
        assert!(!validate_hire_date(None).ok);
        let future = NaiveDate::from_ymd_opt(2099, 1, 1).unwrap();
        assert!(validate_hire_date(Some(future)).ok);
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("a@b.it").ok);
        assert!(validate_email("mario.rossi+lead@esempio.co.uk").ok);
        assert!(!validate_email("mario").ok);
        assert!(!validate_email("mario@esempio").ok);
        assert!(!validate_email("mario @esempio.it").ok);
        assert!(!validate_email("@esempio.it").ok);
    }

    #[test]
    fn phone_counts_raw_characters() {
        // 10 characters including separators passes even with only 8 digits.
        assert!(validate_phone("333-12-345").ok);
        assert!(!validate_phone("333123456").ok);
    }

    #[test]
    fn birth_fields() {
        assert!(validate_birth_year("1985").ok);
        assert!(!validate_birth_year("85").ok);
        assert!(!validate_birth_year("19850").ok);
        assert!(!validate_birth_year("19a5").ok);
        assert!(validate_birth_month("01").ok);
        assert!(validate_birth_month("12").ok);
        assert!(!validate_birth_month("13").ok);
        assert!(!validate_birth_month("1").ok);
        assert!(!validate_birth_month("").ok);
    }

    #[test]
    fn contact_reports_every_failing_field() {
        assert!(validate_contact(&valid_contact()).is_empty());

        let contact = ContactInfo {
            nome: "M".into(),
            mail: "not-an-email".into(),
            ..valid_contact()
        };
        let errors = validate_contact(&contact);
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["nome", "mail"]);
        assert_eq!(errors[0].message, messages::FIRST_NAME_TOO_SHORT);
    }
}
