//! Draft document persisted after every state change.
//!
//! Shape: the six contact fields at the top level, then
//! `contactInfoSubmitted`, `userPosition`, `pensionato` and `dipendente`.

use serde::{Deserialize, Serialize};

use super::dipendente::DipendenteData;
use super::model::{ContactInfo, UserPosition};
use super::pensionato::PensionatoData;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormDraft {
    #[serde(flatten)]
    pub contact: ContactInfo,
    pub contact_info_submitted: bool,
    pub user_position: Option<UserPosition>,
    pub pensionato: PensionatoData,
    pub dipendente: DipendenteData,
}

impl FormDraft {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored document. Malformed documents yield `None` and are
    /// otherwise ignored.
    pub fn parse(document: &str) -> Option<Self> {
        match serde_json::from_str(document) {
            Ok(draft) => Some(draft),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed form draft");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::dipendente::DipendenteStep;
    use crate::form::model::{ContractType, EmployeeType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample() -> FormDraft {
        FormDraft {
            contact: ContactInfo {
                nome: "Giulia".into(),
                cognome: "Bianchi".into(),
                mail: "giulia@example.it".into(),
                telefono: "3331234567".into(),
                mese_nascita: "04".into(),
                anno_nascita: "1975".into(),
            },
            contact_info_submitted: true,
            user_position: Some(UserPosition::Dipendente),
            pensionato: PensionatoData::default(),
            dipendente: DipendenteData {
                step: DipendenteStep::HireDate,
                amount: dec!(18000),
                tipo: Some(EmployeeType::Privato),
                contratto: Some(ContractType::Indeterminato),
                num_dipendenti: "40".into(),
                data_assunzione: NaiveDate::from_ymd_opt(2015, 3, 1),
                ..Default::default()
            },
        }
    }

    #[test]
    fn save_then_load_restores_everything() {
        let draft = sample();
        let json = draft.to_json().unwrap();
        assert_eq!(FormDraft::parse(&json), Some(draft));
    }

    #[test]
    fn contact_fields_sit_at_top_level() {
        let value: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(value["nome"], "Giulia");
        assert_eq!(value["meseNascita"], "04");
        assert_eq!(value["contactInfoSubmitted"], true);
        assert_eq!(value["userPosition"], "DIPENDENTE");
        assert_eq!(value["dipendente"]["dataAssunzione"], "2015-03-01");
        assert_eq!(value["dipendente"]["amount"], 18000.0);
    }

    #[test]
    fn malformed_documents_are_ignored() {
        assert!(FormDraft::parse("not json").is_none());
        assert!(FormDraft::parse(r#"{"userPosition": "ASTRONAUTA"}"#).is_none());
    }

    #[test]
    fn partial_documents_fill_defaults() {
        let draft = FormDraft::parse(r#"{"nome":"Paolo"}"#).unwrap();
        assert_eq!(draft.contact.nome, "Paolo");
        assert!(!draft.contact_info_submitted);
        assert!(draft.user_position.is_none());
        assert_eq!(draft.dipendente.amount, dec!(30000));
    }
}
