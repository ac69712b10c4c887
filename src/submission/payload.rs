//! Lead payload posted to the CRM.
//!
//! Contact fields and the profile answers are flattened into one object,
//! followed by `userPosition` and `submittedAt`. Employee answers whose
//! question was skipped are omitted.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::form::dipendente::{DipendenteData, DipendenteStep};
use crate::form::flow::Flow;
use crate::form::model::{
    ContactInfo, ContractType, EmployeeType, PensionBody, PensionType, TfrAnswer, UserPosition,
};
use crate::form::pensionato::{PensionatoData, PensionatoStep};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(flatten)]
    pub answers: ProfileAnswers,
    pub user_position: UserPosition,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProfileAnswers {
    Pensionato(PensionatoAnswers),
    Dipendente(DipendenteAnswers),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PensionatoAnswers {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub pension: Decimal,
    pub ente: Option<PensionBody>,
    /// `null` for pensioners resident abroad.
    pub tipo: Option<PensionType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DipendenteAnswers {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub salary: Decimal,
    pub tipo: Option<EmployeeType>,
    pub contratto: Option<ContractType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_dipendenti: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_assunzione: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tfr: Option<TfrAnswer>,
}

impl SubmissionPayload {
    pub fn pensionato(
        contact: ContactInfo,
        data: &PensionatoData,
        today: NaiveDate,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let tipo = if data.applies(PensionatoStep::PensionType, today) {
            data.tipo
        } else {
            None
        };
        Self {
            contact,
            answers: ProfileAnswers::Pensionato(PensionatoAnswers {
                amount: data.amount,
                pension: data.pension,
                ente: data.ente,
                tipo,
            }),
            user_position: UserPosition::Pensionato,
            submitted_at,
        }
    }

    pub fn dipendente(
        contact: ContactInfo,
        data: &DipendenteData,
        today: NaiveDate,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let num_dipendenti = data
            .applies(DipendenteStep::CompanySize, today)
            .then(|| data.num_dipendenti.clone());
        let tfr = if data.applies(DipendenteStep::Tfr, today) {
            data.tfr
        } else {
            None
        };
        Self {
            contact,
            answers: ProfileAnswers::Dipendente(DipendenteAnswers {
                amount: data.amount,
                salary: data.salary,
                tipo: data.tipo,
                contratto: data.contratto,
                num_dipendenti,
                data_assunzione: data.data_assunzione,
                tfr,
            }),
            user_position: UserPosition::Dipendente,
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()
    }

    fn contact() -> ContactInfo {
        ContactInfo {
            nome: "Mario".into(),
            cognome: "Rossi".into(),
            mail: "mario.rossi@example.it".into(),
            telefono: "3401234567".into(),
            mese_nascita: "07".into(),
            anno_nascita: "1980".into(),
        }
    }

    #[test]
    fn employee_payload_is_flat() {
        let data = DipendenteData {
            amount: dec!(20000),
            salary: dec!(1800),
            tipo: Some(EmployeeType::Privato),
            contratto: Some(ContractType::Indeterminato),
            num_dipendenti: "50".into(),
            data_assunzione: NaiveDate::from_ymd_opt(2018, 5, 2),
            tfr: Some(TfrAnswer::Si),
            ..Default::default()
        };
        let payload = SubmissionPayload::dipendente(contact(), &data, today(), now());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["nome"], "Mario");
        assert_eq!(json["annoNascita"], "1980");
        assert_eq!(json["amount"], 20000.0);
        assert_eq!(json["salary"], 1800.0);
        assert_eq!(json["tipo"], "PRIVATO");
        assert_eq!(json["contratto"], "INDETERMINATO");
        assert_eq!(json["numDipendenti"], "50");
        assert_eq!(json["dataAssunzione"], "2018-05-02");
        assert_eq!(json["tfr"], "SI");
        assert_eq!(json["userPosition"], "DIPENDENTE");
        assert!(json["submittedAt"].as_str().unwrap().starts_with("2026-10-18T09:30:00"));
    }

    #[test]
    fn public_sector_omits_skipped_answers() {
        let data = DipendenteData {
            tipo: Some(EmployeeType::Pubblico),
            contratto: Some(ContractType::Indeterminato),
            num_dipendenti: "stale".into(),
            data_assunzione: NaiveDate::from_ymd_opt(2026, 9, 18),
            tfr: Some(TfrAnswer::No),
            ..Default::default()
        };
        let json =
            serde_json::to_value(SubmissionPayload::dipendente(contact(), &data, today(), now()))
                .unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("numDipendenti"));
        assert!(!obj.contains_key("tfr"));
        assert_eq!(json["tipo"], "PUBBLICO/STATALE");
        assert_eq!(json["dataAssunzione"], "2026-09-18");
    }

    #[test]
    fn pensioner_payload() {
        let data = PensionatoData {
            ente: Some(PensionBody::ExInpdap),
            tipo: Some(PensionType::Reversibilita),
            ..Default::default()
        };
        let json =
            serde_json::to_value(SubmissionPayload::pensionato(contact(), &data, today(), now()))
                .unwrap();
        assert_eq!(json["amount"], 25000.0);
        assert_eq!(json["pension"], 1200.0);
        assert_eq!(json["ente"], "EX INPDAP");
        assert_eq!(json["tipo"], "PENSIONE DI REVERSIBILITA'");
        assert_eq!(json["userPosition"], "PENSIONATO");
        assert!(json.get("salary").is_none());
    }

    #[test]
    fn resident_abroad_sends_null_type() {
        let data = PensionatoData {
            ente: Some(PensionBody::ResidenteEstero),
            tipo: Some(PensionType::Vecchiaia),
            ..Default::default()
        };
        let json =
            serde_json::to_value(SubmissionPayload::pensionato(contact(), &data, today(), now()))
                .unwrap();
        assert!(json["tipo"].is_null());
        assert_eq!(json["ente"], "PENSIONATO ITALIANO RESIDENTE ESTERO");
    }
}
