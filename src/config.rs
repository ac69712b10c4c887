//! Configuration types.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::form::model::UserPosition;

/// Default key the form draft is stored under.
pub const DEFAULT_DRAFT_KEY: &str = "creditplan_form_data";

/// Where the applicant is sent after a successful submission.
pub const DEFAULT_CONFIRMATION_PATH: &str = "/grazie";

/// Which of the two pre-flow phases comes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseOrder {
    /// Contact details, then profile selection, then the profile flow.
    #[default]
    ContactFirst,
    /// Profile selection, then contact details, then the profile flow.
    ProfileFirst,
}

/// How currency answers are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Free numeric entry, no bounds beyond the validators.
    #[default]
    FreeEntry,
    /// Range sliders: amounts are clamped to the slider bounds on update.
    Slider,
}

/// Wizard behaviour knobs.
#[derive(Debug, Clone)]
pub struct FormConfig {
    pub phase_order: PhaseOrder,
    pub input_mode: InputMode,
    /// Key under which the draft is persisted.
    pub draft_key: String,
    pub confirmation_path: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            phase_order: PhaseOrder::default(),
            input_mode: InputMode::default(),
            draft_key: DEFAULT_DRAFT_KEY.to_string(),
            confirmation_path: DEFAULT_CONFIRMATION_PATH.to_string(),
        }
    }
}

/// Lead endpoints and HTTP client settings.
#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    /// CRM webhook receiving pensioner leads.
    pub pensionato_endpoint: String,
    /// CRM webhook receiving employee leads.
    pub dipendente_endpoint: String,
    pub timeout: Duration,
}

impl SubmissionConfig {
    pub fn new(pensionato_endpoint: impl Into<String>, dipendente_endpoint: impl Into<String>) -> Self {
        Self {
            pensionato_endpoint: pensionato_endpoint.into(),
            dipendente_endpoint: dipendente_endpoint.into(),
            timeout: Duration::from_secs(20),
        }
    }

    /// Endpoint that receives leads for `position`.
    pub fn endpoint_for(&self, position: UserPosition) -> &str {
        match position {
            UserPosition::Pensionato => &self.pensionato_endpoint,
            UserPosition::Dipendente => &self.dipendente_endpoint,
        }
    }
}

/// Service configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct FunnelConfig {
    pub form: FormConfig,
    pub submission: SubmissionConfig,
    /// Interface the API listens on. Loopback unless `FUNNEL_BIND_ADDR` says otherwise.
    pub bind_addr: IpAddr,
    pub port: u16,
    /// libSQL database holding drafts. `None` keeps drafts in memory.
    pub db_path: Option<PathBuf>,
    /// Origins allowed to call the wizard API. Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl FunnelConfig {
    /// Build config from `FUNNEL_*` environment variables.
    ///
    /// Both lead endpoints are required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let pensionato_endpoint = require("FUNNEL_PENSIONATO_ENDPOINT")?;
        let dipendente_endpoint = require("FUNNEL_DIPENDENTE_ENDPOINT")?;

        let mut submission = SubmissionConfig::new(pensionato_endpoint, dipendente_endpoint);
        if let Some(secs) = parse_var::<u64>("FUNNEL_SUBMIT_TIMEOUT_SECS")? {
            submission.timeout = Duration::from_secs(secs);
        }

        let phase_order = match std::env::var("FUNNEL_PHASE_ORDER").ok().as_deref() {
            None | Some("contact_first") => PhaseOrder::ContactFirst,
            Some("profile_first") => PhaseOrder::ProfileFirst,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "FUNNEL_PHASE_ORDER".into(),
                    message: format!("expected contact_first or profile_first, got {other}"),
                });
            }
        };

        let input_mode = match std::env::var("FUNNEL_INPUT_MODE").ok().as_deref() {
            None | Some("free") => InputMode::FreeEntry,
            Some("slider") => InputMode::Slider,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "FUNNEL_INPUT_MODE".into(),
                    message: format!("expected free or slider, got {other}"),
                });
            }
        };

        let form = FormConfig {
            phase_order,
            input_mode,
            draft_key: std::env::var("FUNNEL_DRAFT_KEY")
                .unwrap_or_else(|_| DEFAULT_DRAFT_KEY.to_string()),
            confirmation_path: std::env::var("FUNNEL_CONFIRMATION_PATH")
                .unwrap_or_else(|_| DEFAULT_CONFIRMATION_PATH.to_string()),
        };

        let bind_addr =
            parse_var::<IpAddr>("FUNNEL_BIND_ADDR")?.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let port = parse_var::<u16>("FUNNEL_PORT")?.unwrap_or(8080);
        let db_path = std::env::var("FUNNEL_DB_PATH").ok().map(PathBuf::from);

        let allowed_origins: Vec<String> = std::env::var("FUNNEL_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            form,
            submission,
            bind_addr,
            port,
            db_path,
            allowed_origins,
        })
    }
}

fn require(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
