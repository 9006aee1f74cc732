//! Shared Kernel - Domain-crossing minimal core
//!
//! The smallest vocabulary shared by every crate in the workspace:
//! - Error classification ([`error::kind::ErrorKind`]) and the unified
//!   [`error::app_error::AppError`] / [`error::app_error::AppResult`]
//! - Typed identifiers ([`id::Id`])
//!
//! Only things whose meaning is stable across domains belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
