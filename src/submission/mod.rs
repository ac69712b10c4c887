//! Lead submission: payload construction and delivery to the CRM.

pub mod dispatcher;
pub mod payload;

pub use dispatcher::{HttpLeadSink, LeadSink, SubmissionReceipt};
pub use payload::{ProfileAnswers, SubmissionPayload};
