//! The `RequestStore` trait.
//!
//! Implemented by storage backends (`subsidy-store-sqlite`,
//! `subsidy-store-postgres`). The only caller is
//! [`RequestService`](crate::service::RequestService).

use std::future::Future;

use crate::request::{NewSubsidyRequest, RequestId, RequestStatus, SubsidyRequest};

/// Abstraction over a durable table of subsidy requests.
///
/// Writes (`insert`, `update_status`) are transactional: on failure nothing is
/// left behind. Rows are never deleted.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RequestStore: Send + Sync {
  /// Backend error. Must convert into the core taxonomy so that
  /// [`crate::Error::NotFound`] survives the trip to the service layer.
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  /// Persist a new request with status [`RequestStatus::Pending`] and return
  /// its freshly assigned id.
  fn insert(
    &self,
    request: NewSubsidyRequest,
  ) -> impl Future<Output = Result<RequestId, Self::Error>> + Send + '_;

  /// All requests in insertion order.
  fn find_all(
    &self,
  ) -> impl Future<Output = Result<Vec<SubsidyRequest>, Self::Error>> + Send + '_;

  /// Requests whose identity number matches exactly, in insertion order.
  fn find_by_identity<'a>(
    &'a self,
    identity_number: &'a str,
  ) -> impl Future<Output = Result<Vec<SubsidyRequest>, Self::Error>> + Send + 'a;

  /// Fetch a single request. Fails with a not-found error if absent.
  fn find_by_id(
    &self,
    id: RequestId,
  ) -> impl Future<Output = Result<SubsidyRequest, Self::Error>> + Send + '_;

  /// Overwrite the status of a request and return the updated row. Fails with
  /// a not-found error if absent.
  fn update_status(
    &self,
    id: RequestId,
    status: RequestStatus,
  ) -> impl Future<Output = Result<SubsidyRequest, Self::Error>> + Send + '_;

  /// Total number of stored requests.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
