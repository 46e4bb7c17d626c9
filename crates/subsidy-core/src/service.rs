//! Request service — the only layer that talks to a [`RequestStore`].
//!
//! Enforces the submission rules and the status lifecycle on top of raw
//! persistence. The store handle is injected at construction time.

use std::sync::Arc;

use crate::{
  Error, Result,
  request::{NewSubsidyRequest, RequestId, RequestStatus, SubsidyRequest},
  store::RequestStore,
};

/// Outcome of [`RequestService::change_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
  /// The status was written; holds the updated row.
  Applied(SubsidyRequest),
  /// The requested target was not a valid status; holds the untouched row.
  Ignored(SubsidyRequest),
}

impl StatusChange {
  pub fn is_applied(&self) -> bool { matches!(self, Self::Applied(_)) }

  pub fn request(&self) -> &SubsidyRequest {
    match self {
      Self::Applied(r) | Self::Ignored(r) => r,
    }
  }

  pub fn into_request(self) -> SubsidyRequest {
    match self {
      Self::Applied(r) | Self::Ignored(r) => r,
    }
  }
}

/// Application service over a subsidy request store.
pub struct RequestService<S: RequestStore> {
  store: Arc<S>,
}

impl<S: RequestStore> Clone for RequestService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

fn store_err<E: Into<Error>>(e: E) -> Error { e.into() }

impl<S: RequestStore> RequestService<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Validate and persist a new request, returning its id.
  ///
  /// Validation failures never reach the store.
  pub async fn submit_request(&self, input: NewSubsidyRequest) -> Result<RequestId> {
    let input = input.validated()?;
    let id = self.store.insert(input).await.map_err(store_err)?;

    tracing::info!(id, "subsidy request submitted");
    Ok(id)
  }

  pub async fn list_requests(&self) -> Result<Vec<SubsidyRequest>> {
    self.store.find_all().await.map_err(store_err)
  }

  /// Requests filed under `identity_number`. A missing or blank identity
  /// number matches nothing.
  pub async fn search_by_identity(
    &self,
    identity_number: Option<&str>,
  ) -> Result<Vec<SubsidyRequest>> {
    let Some(identity_number) = identity_number
      .map(str::trim)
      .filter(|s| !s.is_empty())
    else {
      return Ok(Vec::new());
    };

    self
      .store
      .find_by_identity(identity_number)
      .await
      .map_err(store_err)
  }

  pub async fn get_request(&self, id: RequestId) -> Result<SubsidyRequest> {
    self.store.find_by_id(id).await.map_err(store_err)
  }

  /// Set the status of request `id` to `new_status`.
  ///
  /// Only `"Aprobado"` and `"Rechazado"` are applied; any other value leaves
  /// the request untouched and is not an error. A missing id is always
  /// [`Error::NotFound`], whatever the target.
  pub async fn change_status(
    &self,
    id: RequestId,
    new_status: &str,
  ) -> Result<StatusChange> {
    let current = self.store.find_by_id(id).await.map_err(store_err)?;

    let Some(target) = RequestStatus::parse_target(new_status) else {
      tracing::warn!(id, requested = new_status, "ignoring invalid status target");
      return Ok(StatusChange::Ignored(current));
    };

    let updated = self
      .store
      .update_status(id, target)
      .await
      .map_err(store_err)?;

    tracing::info!(id, from = %current.status, to = %target, "request status changed");
    Ok(StatusChange::Applied(updated))
  }

  /// Number of registered requests. Never fails: a storage error is logged
  /// and reported as zero so the landing page always renders.
  pub async fn count_registered(&self) -> u64 {
    match self.store.count().await {
      Ok(n) => n,
      Err(e) => {
        tracing::warn!(error = %e, "failed to count requests; reporting 0");
        0
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  };

  use chrono::Utc;

  use super::*;

  #[derive(Debug, thiserror::Error)]
  enum FakeError {
    #[error("no row with id {0}")]
    Missing(RequestId),
    #[error("storage offline")]
    Offline,
  }

  impl From<FakeError> for Error {
    fn from(e: FakeError) -> Self {
      match e {
        FakeError::Missing(id) => Error::NotFound(id),
        other => Error::persistence(other),
      }
    }
  }

  /// Vec-backed store with switchable failure and a call counter.
  #[derive(Default)]
  struct FakeStore {
    rows:    Mutex<Vec<SubsidyRequest>>,
    offline: AtomicBool,
    calls:   AtomicUsize,
  }

  impl FakeStore {
    fn enter(&self) -> Result<(), FakeError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.offline.load(Ordering::SeqCst) {
        Err(FakeError::Offline)
      } else {
        Ok(())
      }
    }
  }

  impl RequestStore for FakeStore {
    type Error = FakeError;

    async fn insert(&self, request: NewSubsidyRequest) -> Result<RequestId, FakeError> {
      self.enter()?;
      let mut rows = self.rows.lock().unwrap();
      let id = rows.len() as RequestId + 1;
      rows.push(SubsidyRequest {
        id,
        identity_number: request.identity_number,
        subsidy_name: request.subsidy_name,
        bonus_type: request.bonus_type,
        status: RequestStatus::Pending,
        submitted_at: Some(Utc::now()),
      });
      Ok(id)
    }

    async fn find_all(&self) -> Result<Vec<SubsidyRequest>, FakeError> {
      self.enter()?;
      Ok(self.rows.lock().unwrap().clone())
    }

    async fn find_by_identity<'a>(
      &'a self,
      identity_number: &'a str,
    ) -> Result<Vec<SubsidyRequest>, FakeError> {
      self.enter()?;
      Ok(
        self
          .rows
          .lock()
          .unwrap()
          .iter()
          .filter(|r| r.identity_number == identity_number)
          .cloned()
          .collect(),
      )
    }

    async fn find_by_id(&self, id: RequestId) -> Result<SubsidyRequest, FakeError> {
      self.enter()?;
      self
        .rows
        .lock()
        .unwrap()
        .iter()
        .find(|r| r.id == id)
        .cloned()
        .ok_or(FakeError::Missing(id))
    }

    async fn update_status(
      &self,
      id: RequestId,
      status: RequestStatus,
    ) -> Result<SubsidyRequest, FakeError> {
      self.enter()?;
      let mut rows = self.rows.lock().unwrap();
      let row = rows
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or(FakeError::Missing(id))?;
      row.status = status;
      Ok(row.clone())
    }

    async fn count(&self) -> Result<u64, FakeError> {
      self.enter()?;
      Ok(self.rows.lock().unwrap().len() as u64)
    }
  }

  fn service() -> (Arc<FakeStore>, RequestService<FakeStore>) {
    let store = Arc::new(FakeStore::default());
    (Arc::clone(&store), RequestService::new(store))
  }

  #[tokio::test]
  async fn submit_assigns_fresh_ids_and_pending_status() {
    let (_, svc) = service();
    let a = svc
      .submit_request(NewSubsidyRequest::new("0102030405", "Bono Agrícola"))
      .await
      .unwrap();
    let b = svc
      .submit_request(NewSubsidyRequest::new("0102030405", "Crédito Productivo"))
      .await
      .unwrap();
    assert_ne!(a, b);
    assert_eq!(svc.get_request(a).await.unwrap().status, RequestStatus::Pending);
  }

  #[tokio::test]
  async fn invalid_submission_never_reaches_the_store() {
    let (store, svc) = service();
    let err = svc
      .submit_request(NewSubsidyRequest::new("   ", "Bono Agrícola"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    assert_eq!(svc.count_registered().await, 0);
  }

  #[tokio::test]
  async fn submit_propagates_persistence_errors() {
    let (store, svc) = service();
    store.offline.store(true, Ordering::SeqCst);
    let err = svc
      .submit_request(NewSubsidyRequest::new("0102030405", "Bono Agrícola"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
  }

  /// In-memory log sink for asserting on formatted output.
  #[derive(Clone, Default)]
  struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

  impl CapturedLogs {
    fn contents(&self) -> String {
      String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
  }

  impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
  }

  impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer { self.clone() }
  }

  #[tokio::test]
  async fn submission_log_omits_identity_number() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
      .with_writer(logs.clone())
      .with_ansi(false)
      .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (_, svc) = service();
    svc
      .submit_request(NewSubsidyRequest::new("0102030405", "Bono Agrícola"))
      .await
      .unwrap();

    let out = logs.contents();
    assert!(out.contains("subsidy request submitted"), "got {out:?}");
    assert!(!out.contains("0102030405"), "got {out:?}");
  }

  #[tokio::test]
  async fn blank_or_missing_search_returns_empty_without_store_call() {
    let (store, svc) = service();
    assert!(svc.search_by_identity(None).await.unwrap().is_empty());
    assert!(svc.search_by_identity(Some("")).await.unwrap().is_empty());
    assert!(svc.search_by_identity(Some("  ")).await.unwrap().is_empty());
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn search_trims_the_identity_number() {
    let (_, svc) = service();
    svc
      .submit_request(NewSubsidyRequest::new("0102030405", "Bono Agrícola"))
      .await
      .unwrap();
    let found = svc.search_by_identity(Some(" 0102030405 ")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert!(svc.search_by_identity(Some("9999999999")).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn change_status_applies_and_allows_retransition() {
    let (_, svc) = service();
    let id = svc
      .submit_request(NewSubsidyRequest::new("0102030405", "Bono Agrícola"))
      .await
      .unwrap();

    let first = svc.change_status(id, "Aprobado").await.unwrap();
    assert!(first.is_applied());
    assert_eq!(first.request().status, RequestStatus::Approved);

    let second = svc.change_status(id, "Rechazado").await.unwrap();
    assert!(second.is_applied());
    assert_eq!(svc.get_request(id).await.unwrap().status, RequestStatus::Rejected);
  }

  #[tokio::test]
  async fn change_status_to_invalid_target_is_a_no_op() {
    let (_, svc) = service();
    let id = svc
      .submit_request(NewSubsidyRequest::new("0102030405", "Bono Agrícola"))
      .await
      .unwrap();
    svc.change_status(id, "Aprobado").await.unwrap();

    for target in ["Pendiente", "En revisión", "", "APROBADO"] {
      let outcome = svc.change_status(id, target).await.unwrap();
      assert!(!outcome.is_applied(), "{target:?} should be ignored");
      assert_eq!(outcome.into_request().status, RequestStatus::Approved);
    }
  }

  #[tokio::test]
  async fn change_status_on_missing_id_is_not_found() {
    let (_, svc) = service();
    let err = svc.change_status(42, "Aprobado").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(42)));

    // Invalid target does not mask the missing row.
    let err = svc.change_status(42, "Pendiente").await.unwrap_err();
    assert!(err.is_not_found());
  }

  #[tokio::test]
  async fn count_registered_degrades_to_zero() {
    let (store, svc) = service();
    svc
      .submit_request(NewSubsidyRequest::new("0102030405", "Bono Agrícola"))
      .await
      .unwrap();
    assert_eq!(svc.count_registered().await, 1);

    store.offline.store(true, Ordering::SeqCst);
    assert_eq!(svc.count_registered().await, 0);
  }

  #[tokio::test]
  async fn list_requests_propagates_store_failure() {
    let (store, svc) = service();
    store.offline.store(true, Ordering::SeqCst);
    assert!(matches!(
      svc.list_requests().await.unwrap_err(),
      Error::Persistence(_)
    ));
  }
}
