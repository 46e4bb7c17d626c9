//! Core types, the record-store abstraction, and the request service for the
//! subsidy registry.
//!
//! This crate has no HTTP or database dependencies. Storage backends implement
//! [`store::RequestStore`]; the web layer talks only to
//! [`service::RequestService`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod request;
pub mod service;
pub mod store;

pub use error::{Error, Result};
pub use request::{NewSubsidyRequest, RequestId, RequestStatus, SubsidyRequest};
pub use service::{RequestService, StatusChange};
pub use store::RequestStore;
