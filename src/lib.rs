//! Interview scheduling core for recruitment pipelines.
//!
//! Turns a reviewer's recurring availability into bookable slots and drives
//! the two-party negotiation that ends with one confirmed appointment. The
//! outer onboarding workflow, persistence, and notification delivery stay
//! behind the seams in [`workflows::scheduling::repository`].

pub mod config;
pub mod error;
pub mod infra;
pub mod telemetry;
pub mod workflows;
