//! FormOrchestrator: owns the wizard state, routes actions to the active
//! flow, persists the draft and hands completed leads to the dispatcher.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::dipendente::{DipendenteData, DipendentePatch};
use super::draft::FormDraft;
use super::flow::{Advance, Back, Flow};
use super::model::{ContactInfo, ContactPatch, UserPosition};
use super::pensionato::{PensionatoData, PensionatoPatch};
use super::state::{FlowStep, FormPhase, FormState, Header, Progress};
use super::validators::{self, FieldError};
use crate::config::{FormConfig, InputMode, PhaseOrder};
use crate::error::FormError;
use crate::store::DraftStore;
use crate::submission::{LeadSink, SubmissionPayload, SubmissionReceipt};

/// Snapshot returned to clients after every action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub phase: FormPhase,
    pub user_position: Option<UserPosition>,
    pub step: Option<FlowStep>,
    pub progress: Progress,
    pub header: Option<Header>,
    pub contact: ContactInfo,
    pub contact_info_submitted: bool,
    pub contact_errors: Vec<FieldError>,
    pub pensionato: PensionatoData,
    pub dipendente: DipendenteData,
    pub consent: bool,
    pub loading: bool,
    /// Dismissible submission error.
    pub error: Option<String>,
    /// Confirmation page to navigate to once submitted.
    pub redirect: Option<String>,
}

/// Result of submitting the contact screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    Accepted(FormPhase),
    Rejected(Vec<FieldError>),
}

/// A lead the CRM accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitOutcome {
    pub receipt: SubmissionReceipt,
    pub redirect: String,
}

pub struct FormOrchestrator {
    config: FormConfig,
    drafts: Arc<dyn DraftStore>,
    sink: Arc<dyn LeadSink>,
    state: Arc<RwLock<FormState>>,
}

impl FormOrchestrator {
    /// Build the orchestrator, restoring any stored draft.
    pub async fn start(
        config: FormConfig,
        drafts: Arc<dyn DraftStore>,
        sink: Arc<dyn LeadSink>,
    ) -> Self {
        let order = config.phase_order;
        let state = match drafts.load(&config.draft_key).await {
            Ok(Some(document)) => match FormDraft::parse(&document) {
                Some(draft) => {
                    tracing::info!(key = %config.draft_key, "Restored form draft");
                    FormState::from_draft(draft, order)
                }
                None => FormState::new(order),
            },
            Ok(None) => FormState::new(order),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load form draft");
                FormState::new(order)
            }
        };

        Self {
            config,
            drafts,
            sink,
            state: Arc::new(RwLock::new(state)),
        }
    }

    fn order(&self) -> PhaseOrder {
        self.config.phase_order
    }

    fn clamp(&self) -> bool {
        self.config.input_mode == InputMode::Slider
    }

    fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    pub async fn snapshot(&self) -> FormState {
        self.state.read().await.clone()
    }

    pub async fn view(&self) -> FormView {
        let state = self.state.read().await;
        FormView {
            phase: state.phase,
            user_position: state.user_position,
            step: state.current_step(),
            progress: state.progress(self.order(), Self::today()),
            header: state.header(),
            contact: state.contact.clone(),
            contact_info_submitted: state.contact_info_submitted,
            contact_errors: state.contact_errors.clone(),
            pensionato: state.pensionato.clone(),
            dipendente: state.dipendente.clone(),
            consent: state.consent,
            loading: state.loading,
            error: state.banner.clone(),
            redirect: state
                .phase
                .is_terminal()
                .then(|| self.config.confirmation_path.clone()),
        }
    }

    pub async fn progress(&self) -> Progress {
        self.state
            .read()
            .await
            .progress(self.order(), Self::today())
    }

    /// Merge contact fields. No validation; errors on touched fields clear.
    pub async fn update_contact(&self, patch: ContactPatch) -> Result<(), FormError> {
        {
            let mut state = self.state.write().await;
            ensure_idle(&state)?;
            ensure_not_submitted(&state)?;
            let touched = patch.touched();
            state.contact_errors.retain(|e| !touched.contains(&e.field));
            patch.apply(&mut state.contact);
        }
        self.persist().await;
        Ok(())
    }

    pub async fn submit_contact(&self) -> Result<ContactOutcome, FormError> {
        let outcome = {
            let mut state = self.state.write().await;
            ensure_idle(&state)?;
            ensure_phase(&state, FormPhase::CollectingContact)?;
            let errors = validators::validate_contact(&state.contact);
            if errors.is_empty() {
                state.contact_errors.clear();
                state.contact_info_submitted = true;
                state.resolve_phase(self.order());
                tracing::info!(phase = %state.phase, "Contact details accepted");
                ContactOutcome::Accepted(state.phase)
            } else {
                tracing::debug!(failures = errors.len(), "Contact details rejected");
                state.contact_errors = errors.clone();
                ContactOutcome::Rejected(errors)
            }
        };
        self.persist().await;
        Ok(outcome)
    }

    /// Choose the applicant profile and start its flow from the first step.
    pub async fn select_profile(&self, position: UserPosition) -> Result<FormPhase, FormError> {
        let phase = {
            let mut state = self.state.write().await;
            ensure_idle(&state)?;
            ensure_phase(&state, FormPhase::SelectingProfile)?;
            state.user_position = Some(position);
            match position {
                UserPosition::Pensionato => state.pensionato = PensionatoData::default(),
                UserPosition::Dipendente => state.dipendente = DipendenteData::default(),
            }
            state.resolve_phase(self.order());
            tracing::info!(%position, phase = %state.phase, "Profile selected");
            state.phase
        };
        self.persist().await;
        Ok(phase)
    }

    pub async fn update_pensionato(&self, patch: PensionatoPatch) -> Result<(), FormError> {
        {
            let mut state = self.state.write().await;
            ensure_idle(&state)?;
            ensure_position(&state, UserPosition::Pensionato)?;
            let clamp = self.clamp();
            state.pensionato.apply(patch, clamp);
        }
        self.persist().await;
        Ok(())
    }

    pub async fn update_dipendente(&self, patch: DipendentePatch) -> Result<(), FormError> {
        {
            let mut state = self.state.write().await;
            ensure_idle(&state)?;
            ensure_position(&state, UserPosition::Dipendente)?;
            let clamp = self.clamp();
            state.dipendente.apply(patch, clamp);
        }
        self.persist().await;
        Ok(())
    }

    /// Validate the current answer and move to the next visible question.
    pub async fn next(&self) -> Result<Advance<FlowStep>, FormError> {
        let today = Self::today();
        let advance = {
            let mut state = self.state.write().await;
            ensure_idle(&state)?;
            ensure_phase(&state, FormPhase::RunningFlow)?;
            match state.user_position {
                Some(UserPosition::Pensionato) => {
                    map_advance(state.pensionato.next(today), FlowStep::Pensionato)
                }
                Some(UserPosition::Dipendente) => {
                    map_advance(state.dipendente.next(today), FlowStep::Dipendente)
                }
                None => return Err(FormError::NoProfileSelected),
            }
        };
        tracing::debug!(?advance, "Flow advanced");
        self.persist().await;
        Ok(advance)
    }

    /// Step back one question, or out of the flow / pre-flow phase.
    pub async fn go_back(&self) -> Result<FormPhase, FormError> {
        let today = Self::today();
        let order = self.order();
        let phase = {
            let mut state = self.state.write().await;
            ensure_idle(&state)?;
            match (state.phase, order) {
                (FormPhase::RunningFlow, _) => {
                    let exited = match state.user_position {
                        Some(UserPosition::Pensionato) => {
                            state.pensionato.back(today) == Back::ExitFlow
                        }
                        Some(UserPosition::Dipendente) => {
                            state.dipendente.back(today) == Back::ExitFlow
                        }
                        None => return Err(FormError::NoProfileSelected),
                    };
                    if exited {
                        match state.user_position.take() {
                            Some(UserPosition::Pensionato) => {
                                state.pensionato = PensionatoData::default()
                            }
                            Some(UserPosition::Dipendente) => {
                                state.dipendente = DipendenteData::default()
                            }
                            None => {}
                        }
                        tracing::info!("Left profile flow");
                    }
                }
                (FormPhase::SelectingProfile, PhaseOrder::ContactFirst) => {
                    state.contact_info_submitted = false;
                }
                (FormPhase::CollectingContact, PhaseOrder::ProfileFirst) => {
                    state.user_position = None;
                }
                (phase, _) => {
                    return Err(FormError::WrongPhase {
                        phase: phase.to_string(),
                    });
                }
            }
            state.resolve_phase(order);
            state.phase
        };
        self.persist().await;
        Ok(phase)
    }

    pub async fn set_consent(&self, accepted: bool) -> Result<(), FormError> {
        let mut state = self.state.write().await;
        ensure_idle(&state)?;
        state.consent = accepted;
        Ok(())
    }

    /// Send the completed lead. Only one submission may be in flight.
    pub async fn submit(&self) -> crate::error::Result<SubmitOutcome> {
        let payload = {
            let mut state = self.state.write().await;
            ensure_idle(&state)?;
            let position = state.user_position.ok_or(FormError::NoProfileSelected)?;
            ensure_phase(&state, FormPhase::RunningFlow)?;
            if !state.on_summary() {
                return Err(FormError::NotOnSummary.into());
            }
            let today = Self::today();
            let stale = match position {
                UserPosition::Pensionato => state.pensionato.recheck(today),
                UserPosition::Dipendente => state.dipendente.recheck(today),
            };
            if let Some(message) = stale {
                drop(state);
                tracing::debug!(%message, "Submission sent back to an invalid answer");
                self.persist().await;
                return Err(FormError::FlowIncomplete { message }.into());
            }
            if !state.consent {
                return Err(FormError::ConsentMissing.into());
            }
            let errors = validators::validate_contact(&state.contact);
            if !errors.is_empty() {
                state.contact_errors = errors;
                return Err(FormError::InvalidContact.into());
            }

            state.loading = true;
            state.banner = None;
            let now = Utc::now();
            match position {
                UserPosition::Pensionato => {
                    SubmissionPayload::pensionato(state.contact.clone(), &state.pensionato, today, now)
                }
                UserPosition::Dipendente => {
                    SubmissionPayload::dipendente(state.contact.clone(), &state.dipendente, today, now)
                }
            }
        };

        tracing::info!(position = %payload.user_position, "Submitting lead");
        let result = self.sink.submit(&payload).await;

        match result {
            Ok(receipt) => {
                {
                    let mut state = self.state.write().await;
                    *state = FormState::new(self.order());
                    state.phase = FormPhase::Submitted;
                }
                self.clear_draft().await;
                Ok(SubmitOutcome {
                    receipt,
                    redirect: self.config.confirmation_path.clone(),
                })
            }
            Err(e) => {
                {
                    let mut state = self.state.write().await;
                    state.loading = false;
                    state.banner = Some(e.user_message());
                }
                self.persist().await;
                Err(e.into())
            }
        }
    }

    pub async fn dismiss_error(&self) {
        self.state.write().await.banner = None;
    }

    /// Back to a blank form; the stored draft is removed.
    pub async fn reset(&self) -> Result<(), FormError> {
        {
            let mut state = self.state.write().await;
            ensure_idle(&state)?;
            *state = FormState::new(self.order());
        }
        self.clear_draft().await;
        tracing::info!("Form reset");
        Ok(())
    }

    async fn persist(&self) {
        let draft = self.state.read().await.to_draft();
        let document = match draft.to_json() {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize form draft");
                return;
            }
        };
        if let Err(e) = self.drafts.save(&self.config.draft_key, &document).await {
            tracing::warn!(error = %e, "Failed to persist form draft");
        }
    }

    async fn clear_draft(&self) {
        if let Err(e) = self.drafts.clear(&self.config.draft_key).await {
            tracing::warn!(error = %e, "Failed to clear form draft");
        }
    }
}

fn map_advance<S>(advance: Advance<S>, wrap: fn(S) -> FlowStep) -> Advance<FlowStep> {
    match advance {
        Advance::Moved(step) => Advance::Moved(wrap(step)),
        Advance::Rejected(message) => Advance::Rejected(message),
        Advance::AtEnd => Advance::AtEnd,
    }
}

/// Nothing changes while a submission is pending.
fn ensure_idle(state: &FormState) -> Result<(), FormError> {
    if state.loading {
        Err(FormError::SubmissionInFlight)
    } else {
        Ok(())
    }
}

fn ensure_phase(state: &FormState, expected: FormPhase) -> Result<(), FormError> {
    if state.phase == expected {
        Ok(())
    } else {
        Err(FormError::WrongPhase {
            phase: state.phase.to_string(),
        })
    }
}

fn ensure_not_submitted(state: &FormState) -> Result<(), FormError> {
    if state.phase.is_terminal() {
        Err(FormError::WrongPhase {
            phase: state.phase.to_string(),
        })
    } else {
        Ok(())
    }
}

fn ensure_position(state: &FormState, position: UserPosition) -> Result<(), FormError> {
    ensure_not_submitted(state)?;
    match state.user_position {
        Some(p) if p == position => Ok(()),
        Some(_) => Err(FormError::WrongPhase {
            phase: state.phase.to_string(),
        }),
        None => Err(FormError::NoProfileSelected),
    }
}
