//! Lead funnel: multi-step loan request wizard for pensioners and employees.

pub mod config;
pub mod error;
pub mod form;
pub mod store;
pub mod submission;
