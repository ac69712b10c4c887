//! The loan-request wizard: answer model, validators, the two profile
//! flows, and the orchestrator tying them to drafts and submission.

pub mod dipendente;
pub mod draft;
pub mod flow;
pub mod model;
pub mod orchestrator;
pub mod pensionato;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod validators;

pub use orchestrator::{ContactOutcome, FormOrchestrator, FormView, SubmitOutcome};
pub use routes::{FormRouteState, form_routes};
pub use sessions::{FormSessions, SESSION_HEADER};
pub use state::{FlowStep, FormPhase, FormState, Progress};
