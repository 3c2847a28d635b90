//! Redcart Bot - Concurrent checkout automation.
//!
//! When the stock monitor confirms availability of a watched product, one of
//! a fixed pool of workers reserves the item and submits payment against the
//! commerce API, racing inventory depletion and the service's anti-automation
//! defenses.
//!
//! # Architecture
//!
//! - [`orchestrator`] - Owns the worker pool and fans the event stream out to
//!   competing consumers
//! - [`worker`] - One long-lived unit of concurrency; serial task processing
//! - [`task`] - The per-event checkout state machine (reserve, then pay)
//! - [`client`] - The checkout capability seam ([`client::CheckoutClient`])
//!   with a dry-run double
//! - [`session`] - One network identity and its authentication state machine
//! - [`transport`] - The raw HTTP request/response seam behind a session
//! - [`target`] - The Target.com implementations of session and checkout
//!
//! Each worker exclusively owns its session and client for the process
//! lifetime; the shared event channel is the only structure touched by more
//! than one worker.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod error;
pub mod orchestrator;
pub mod session;
pub mod target;
pub mod task;
pub mod transport;
pub mod worker;
