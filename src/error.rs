//! Error types for the lead funnel.

use std::time::Duration;

/// Top-level error type for the operations an applicant triggers.
///
/// Configuration and draft store failures stay in their own enums: config
/// errors end the process in `main`, draft errors are logged and dropped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Form error: {0}")]
    Form(#[from] FormError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Draft store errors.
///
/// These never reach the applicant: the orchestrator logs them and moves on.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("Failed to open draft database: {0}")]
    Open(String),

    #[error("Draft query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Failures while forwarding a completed lead to the CRM.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The endpoint answered with a non-2xx status.
    #[error("Lead endpoint returned {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Connection failure, DNS failure, or other transport error.
    #[error("Lead endpoint unreachable: {reason}")]
    Network { reason: String },

    #[error("Lead endpoint timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

/// Generic message shown when the endpoint gives no usable error body.
pub const GENERIC_SUBMIT_MESSAGE: &str =
    "Si è verificato un errore durante l'invio della richiesta. Riprova.";

/// Message shown on transport failures and timeouts.
pub const NETWORK_SUBMIT_MESSAGE: &str =
    "Impossibile contattare il server. Controlla la connessione e riprova.";

impl SubmissionError {
    /// Text for the dismissible banner shown to the applicant.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::Network { .. } | Self::Timeout { .. } => NETWORK_SUBMIT_MESSAGE.to_string(),
        }
    }
}

/// Orchestrator-level rejections. None of these touch the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Seleziona se sei pensionato o dipendente prima di inviare la richiesta")]
    NoProfileSelected,

    #[error("Action not allowed in phase {phase}")]
    WrongPhase { phase: String },

    #[error("Completa tutti i passaggi prima di inviare la richiesta")]
    NotOnSummary,

    #[error("Devi accettare l'informativa sulla privacy per continuare")]
    ConsentMissing,

    #[error("Controlla i tuoi dati di contatto")]
    InvalidContact,

    #[error("Invio già in corso")]
    SubmissionInFlight,

    /// An answer no longer validates; the flow was moved back to it.
    #[error("{message}")]
    FlowIncomplete { message: String },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
