//! Watermark advancement and poll loop orchestration
//!
//! This module is the heart of the crate. [`advance::advance_watermark`]
//! is the pure cursor arithmetic; [`controller::PollController`] wraps it
//! in the fetch/persist/sink cycle with pacing, fixed-delay retry, and
//! cooperative shutdown.
//!
//! # Guarantees
//!
//! - **Monotonic cursor**: across successful fetches the window start
//!   never regresses.
//! - **No gap**: consecutive windows tile the timeline exactly; the next
//!   `from` is either one strict millisecond past the last delivered post
//!   or the previous window's `to`.
//! - **No duplicate**: no delivered post can fall at or after the next
//!   window's `from`.
//! - **Failure isolation**: a failed fetch never moves nor persists the
//!   cursor.

pub mod advance;
pub mod config;
pub mod controller;

pub use advance::{advance_watermark, Advancement};
pub use config::PollConfig;
pub use controller::{PollController, PollOutcome, PollSummary, StopReason};
