//! Typed client for the launch waitlist HTTP API.

pub mod client;

pub use client::{
    AdminSignups, ClientError, Signup, SignupReply, Stats, WaitlistClient,
};
