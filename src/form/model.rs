//! Applicant profile, contact details, and the answer option sets.
//!
//! Option enums serialize to the exact Italian values the CRM expects.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Which applicant flow is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserPosition {
    Pensionato,
    Dipendente,
}

impl std::fmt::Display for UserPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pensionato => write!(f, "PENSIONATO"),
            Self::Dipendente => write!(f, "DIPENDENTE"),
        }
    }
}

/// Institution paying the pension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PensionBody {
    #[serde(rename = "INPS")]
    Inps,
    #[serde(rename = "EX INPDAP")]
    ExInpdap,
    #[serde(rename = "ALTRO ENTE")]
    AltroEnte,
    /// Italian pensioner living abroad. The pension type question is skipped.
    #[serde(rename = "PENSIONATO ITALIANO RESIDENTE ESTERO")]
    ResidenteEstero,
}

impl PensionBody {
    pub const ALL: [PensionBody; 4] = [
        Self::Inps,
        Self::ExInpdap,
        Self::AltroEnte,
        Self::ResidenteEstero,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inps => "INPS",
            Self::ExInpdap => "EX INPDAP",
            Self::AltroEnte => "ALTRO ENTE",
            Self::ResidenteEstero => "PENSIONATO ITALIANO RESIDENTE ESTERO",
        }
    }
}

/// Kind of pension received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PensionType {
    #[serde(rename = "PENSIONE DI VECCHIAIA")]
    Vecchiaia,
    #[serde(rename = "PENSIONE DI ANZIANITA'")]
    Anzianita,
    #[serde(rename = "PENSIONE DI REVERSIBILITA'")]
    Reversibilita,
    #[serde(rename = "PENSIONE DI INVALIDITA'")]
    Invalidita,
    #[serde(rename = "INVALIDITA' CIVILE")]
    InvaliditaCivile,
    #[serde(rename = "APE SOCIAL")]
    ApeSocial,
    #[serde(rename = "ASSEGNO SOCIALE")]
    AssegnoSociale,
    #[serde(rename = "ALTRA TIPOLOGIA")]
    Altra,
}

impl PensionType {
    pub const ALL: [PensionType; 8] = [
        Self::Vecchiaia,
        Self::Anzianita,
        Self::Reversibilita,
        Self::Invalidita,
        Self::InvaliditaCivile,
        Self::ApeSocial,
        Self::AssegnoSociale,
        Self::Altra,
    ];

    /// Pension types a salary-assignment loan cannot be secured against.
    pub const NON_FINANCEABLE: [PensionType; 3] = [
        Self::InvaliditaCivile,
        Self::ApeSocial,
        Self::AssegnoSociale,
    ];

    pub fn is_financeable(&self) -> bool {
        !Self::NON_FINANCEABLE.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vecchiaia => "PENSIONE DI VECCHIAIA",
            Self::Anzianita => "PENSIONE DI ANZIANITA'",
            Self::Reversibilita => "PENSIONE DI REVERSIBILITA'",
            Self::Invalidita => "PENSIONE DI INVALIDITA'",
            Self::InvaliditaCivile => "INVALIDITA' CIVILE",
            Self::ApeSocial => "APE SOCIAL",
            Self::AssegnoSociale => "ASSEGNO SOCIALE",
            Self::Altra => "ALTRA TIPOLOGIA",
        }
    }
}

/// Employment sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeType {
    #[serde(rename = "PRIVATO")]
    Privato,
    /// Public sector. Company size and TFR questions never apply.
    #[serde(rename = "PUBBLICO/STATALE", alias = "PUBBLICO", alias = "STATALE")]
    Pubblico,
    #[serde(rename = "PARASUBORDINATO")]
    Parasubordinato,
}

impl EmployeeType {
    pub const ALL: [EmployeeType; 3] = [Self::Privato, Self::Pubblico, Self::Parasubordinato];

    pub fn is_public_sector(&self) -> bool {
        matches!(self, Self::Pubblico)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Privato => "PRIVATO",
            Self::Pubblico => "PUBBLICO/STATALE",
            Self::Parasubordinato => "PARASUBORDINATO",
        }
    }
}

/// Employment contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractType {
    Indeterminato,
    /// Fixed-term. Never financeable.
    Determinato,
    Altro,
}

impl ContractType {
    pub const ALL: [ContractType; 3] = [Self::Indeterminato, Self::Determinato, Self::Altro];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indeterminato => "INDETERMINATO",
            Self::Determinato => "DETERMINATO",
            Self::Altro => "ALTRO",
        }
    }
}

/// Answer to "is your TFR paid into a pension fund?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TfrAnswer {
    Si,
    No,
}

/// Applicant contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfo {
    pub nome: String,
    pub cognome: String,
    pub mail: String,
    pub telefono: String,
    /// Two-digit month, `"01"` to `"12"`.
    pub mese_nascita: String,
    pub anno_nascita: String,
}

/// Partial update of [`ContactInfo`]; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPatch {
    pub nome: Option<String>,
    pub cognome: Option<String>,
    pub mail: Option<String>,
    pub telefono: Option<String>,
    pub mese_nascita: Option<String>,
    pub anno_nascita: Option<String>,
}

impl ContactPatch {
    /// Wire names of the fields this patch sets.
    pub fn touched(&self) -> Vec<&'static str> {
        [
            ("nome", self.nome.is_some()),
            ("cognome", self.cognome.is_some()),
            ("mail", self.mail.is_some()),
            ("telefono", self.telefono.is_some()),
            ("meseNascita", self.mese_nascita.is_some()),
            ("annoNascita", self.anno_nascita.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, set)| set.then_some(field))
        .collect()
    }

    pub fn apply(self, contact: &mut ContactInfo) {
        if let Some(v) = self.nome {
            contact.nome = v;
        }
        if let Some(v) = self.cognome {
            contact.cognome = v;
        }
        if let Some(v) = self.mail {
            contact.mail = v;
        }
        if let Some(v) = self.telefono {
            contact.telefono = v;
        }
        if let Some(v) = self.mese_nascita {
            contact.mese_nascita = v;
        }
        if let Some(v) = self.anno_nascita {
            contact.anno_nascita = v;
        }
    }
}

/// Patch field where `null` clears the answer and an absent field leaves it
/// untouched. Pair with `#[serde(default)]`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Bounds of a currency slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SliderRange {
    #[serde(with = "rust_decimal::serde::float")]
    pub min: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max: Decimal,
}

impl SliderRange {
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: Decimal) -> Decimal {
        value.clamp(self.min, self.max)
    }
}

/// Requested loan amount, both profiles.
pub const AMOUNT_SLIDER: SliderRange = SliderRange::new(dec!(2000), dec!(80000));
pub const PENSION_SLIDER: SliderRange = SliderRange::new(dec!(700), dec!(5000));
pub const SALARY_SLIDER: SliderRange = SliderRange::new(dec!(700), dec!(7000));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_clamps_both_ends() {
        assert_eq!(AMOUNT_SLIDER.clamp(dec!(500)), dec!(2000));
        assert_eq!(AMOUNT_SLIDER.clamp(dec!(100000)), dec!(80000));
        assert_eq!(PENSION_SLIDER.clamp(dec!(1200)), dec!(1200));
        assert_eq!(SALARY_SLIDER.clamp(dec!(9000)), dec!(7000));
    }

    #[test]
    fn option_values_match_wire_strings() {
        for body in PensionBody::ALL {
            let json = serde_json::to_string(&body).unwrap();
            assert_eq!(json, format!("\"{}\"", body.as_str()));
        }
        for tipo in PensionType::ALL {
            let json = serde_json::to_string(&tipo).unwrap();
            assert_eq!(json, format!("\"{}\"", tipo.as_str()));
        }
        for tipo in EmployeeType::ALL {
            let json = serde_json::to_string(&tipo).unwrap();
            assert_eq!(json, format!("\"{}\"", tipo.as_str()));
        }
        for contratto in ContractType::ALL {
            let json = serde_json::to_string(&contratto).unwrap();
            assert_eq!(json, format!("\"{}\"", contratto.as_str()));
        }
    }

    #[test]
    fn public_sector_accepts_legacy_spellings() {
        for raw in ["\"PUBBLICO\"", "\"STATALE\"", "\"PUBBLICO/STATALE\""] {
            let parsed: EmployeeType = serde_json::from_str(raw).unwrap();
            assert_eq!(parsed, EmployeeType::Pubblico);
        }
    }

    #[test]
    fn non_financeable_pension_types() {
        assert!(!PensionType::InvaliditaCivile.is_financeable());
        assert!(!PensionType::ApeSocial.is_financeable());
        assert!(!PensionType::AssegnoSociale.is_financeable());
        assert!(PensionType::Vecchiaia.is_financeable());
        assert!(PensionType::Invalidita.is_financeable());
        assert!(PensionType::Altra.is_financeable());
    }

    #[test]
    fn position_display_matches_serde() {
        for position in [UserPosition::Pensionato, UserPosition::Dipendente] {
            let json = serde_json::to_string(&position).unwrap();
            assert_eq!(json, format!("\"{position}\""));
        }
    }

    #[test]
    fn contact_patch_only_touches_given_fields() {
        let mut contact = ContactInfo {
            nome: "Mario".into(),
            cognome: "Rossi".into(),
            ..Default::default()
        };
        let patch: ContactPatch =
            serde_json::from_str(r#"{"mail":"mario@example.it","annoNascita":"1960"}"#).unwrap();
        assert_eq!(patch.touched(), vec!["mail", "annoNascita"]);
        patch.apply(&mut contact);
        assert_eq!(contact.nome, "Mario");
        assert_eq!(contact.mail, "mario@example.it");
        assert_eq!(contact.anno_nascita, "1960");
        assert!(contact.telefono.is_empty());
    }
}
