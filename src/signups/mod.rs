//! Email signup domain: validation, payloads, and the public handlers.

pub mod email;
pub mod handlers;
pub mod types;

pub use types::{
    AdminSignupsResponse, InsertOutcome, NewSignup, SignupRecord, SignupResponse, StatsResponse,
};
