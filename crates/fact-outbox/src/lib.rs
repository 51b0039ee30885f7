//! Buffered fact delivery with per-record retry.
//!
//! This crate provides:
//! - FactBuffer: pending fact queue with one concurrent delivery task per fact
//!   and a join point that resolves once every task is terminal
//! - FactSender: fixed-delay retry driver around a delivery transport
//! - HttpFactDelivery: reqwest transport for the fact intake API

mod buffer;
mod delivery;
mod error;
mod fact;
mod sender;

pub use buffer::{FactBuffer, FactOutcome};
pub use delivery::{FactDelivery, HttpFactDelivery};
pub use error::{DeliveryError, DeliveryResult, RetriesExhausted};
pub use fact::Fact;
pub use sender::{FactSender, SenderConfig, DEFAULT_AUTH_TOKEN, DEFAULT_ENDPOINT};
