//! Test harness for partyline.
//!
//! [`SimTransport`] is an in-memory [`Transport`](partyline_core::Transport)
//! that delivers events synchronously on the calling thread, so tests control
//! exactly when and in which order roster, presence and message events reach
//! a session.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation for model-based
//! testing. Operations are applied to both the model and a real session over
//! a `SimTransport`, and their observable states are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod sim_transport;

pub use model::{
    FriendId, ModelStatus, ModelWorld, ObservableState, Observed, Operation, OperationResult,
    PayloadKind, ResourceId, SmallBody, all_accounts, friend_account, resource_name,
};
pub use sim_transport::SimTransport;
