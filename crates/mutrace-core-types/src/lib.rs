//! Core types shared across mutrace facilities
//!
//! This crate provides the vocabulary used by both the error facility and
//! the logging facility:
//!
//! - **Correlation types**: TraceId, SubscriptionContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{SubscriptionContext, TraceId};
