//! Reference model for model-based testing.
//!
//! The model captures what the application must observe for a sequence of
//! server-side and local operations, without listeners, escaping or JSON.
//! Payloads come from a fixed catalogue whose decoded sessions are written
//! out by hand. It serves as the oracle against which a real session over a
//! [`SimTransport`](crate::SimTransport) is verified.

pub mod operation;
mod world;

pub use operation::{
    FriendId, ModelStatus, Operation, OperationResult, PayloadKind, ResourceId, SmallBody,
    all_accounts, friend_account, resource_name,
};
pub use world::{ModelWorld, ObservableState, Observed};
