use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::Instrument;
use uuid::Uuid;

use crate::{
    error::{BlendResult, ErrorKind, SubmitError},
    models::{BlendRequest, RankedResultSet},
    services::backend::{
        classify, classify_health, BlendBackend, BlendPayload, HealthStatus, TestBlendRequest,
        TransportOutcome,
    },
    store::ResultStore,
};

type PendingCall<'a> = Pin<Box<dyn Future<Output = TransportOutcome> + Send + 'a>>;

/// Lifecycle of the session's request slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Submitting,
    Succeeded,
    Failed(ErrorKind),
}

/// Drives one request at a time against the blend service
///
/// A successful call replaces the result store's contents; a failed call
/// leaves them alone. While a call is outstanding every further submission
/// is turned away with [`SubmitError::InFlight`] before touching the network.
pub struct BlendSession {
    backend: Arc<dyn BlendBackend>,
    store: ResultStore,
    state: Mutex<SessionState>,
}

/// Marks the session as submitting until settled or dropped
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
    id: Uuid,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, next: SessionState) {
        *lock(self.state) = next;
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            // Caller dropped the submission future before the service answered
            *lock(self.state) = SessionState::Idle;
            tracing::debug!(submission_id = %self.id, "Submission abandoned");
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl BlendSession {
    pub fn new(backend: Arc<dyn BlendBackend>, store: ResultStore) -> Self {
        Self {
            backend,
            store,
            state: Mutex::new(SessionState::Idle),
        }
    }

    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    pub fn is_submitting(&self) -> bool {
        self.state() == SessionState::Submitting
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Blends two validated profiles
    pub async fn submit_blend(
        &self,
        request: &BlendRequest,
    ) -> Result<RankedResultSet, SubmitError> {
        let flight = self.begin("blend")?;
        tracing::info!(
            submission_id = %flight.id,
            first = %request.first(),
            second = %request.second(),
            "Submitting blend"
        );

        let payload = BlendPayload::from(request);
        let call = self.backend.post_blend(&payload);
        self.dispatch(flight, "blend", call).await
    }

    /// Fetches the fixed preview result set
    pub async fn submit_mock_blend(&self) -> Result<RankedResultSet, SubmitError> {
        let flight = self.begin("mock")?;
        tracing::info!(submission_id = %flight.id, "Submitting mock blend");

        let call = self.backend.get_mock();
        self.dispatch(flight, "mock", call).await
    }

    /// Blends two users from data already saved on the service
    pub async fn submit_test_blend(
        &self,
        request: &TestBlendRequest,
    ) -> Result<RankedResultSet, SubmitError> {
        let flight = self.begin("blend_test")?;
        tracing::info!(
            submission_id = %flight.id,
            user1 = %request.user1_name,
            user2 = %request.user2_name,
            "Submitting saved-data blend"
        );

        let call = self.backend.post_test_blend(request);
        self.dispatch(flight, "blend_test", call).await
    }

    /// Asks the service whether it is up; session state is not involved
    pub async fn health(&self) -> BlendResult<HealthStatus> {
        classify_health(self.backend.get_health().await)
    }

    fn begin(&self, endpoint: &'static str) -> Result<InFlight<'_>, SubmitError> {
        let mut state = lock(&self.state);
        if *state == SessionState::Submitting {
            tracing::warn!(endpoint, "Rejected submission while another is in flight");
            return Err(SubmitError::InFlight);
        }
        *state = SessionState::Submitting;

        Ok(InFlight {
            state: &self.state,
            id: Uuid::new_v4(),
            settled: false,
        })
    }

    async fn dispatch(
        &self,
        flight: InFlight<'_>,
        endpoint: &'static str,
        call: PendingCall<'_>,
    ) -> Result<RankedResultSet, SubmitError> {
        let span = tracing::info_span!(
            "blend_submission",
            submission_id = %flight.id,
            endpoint,
            backend = self.backend.name()
        );

        async move {
            match classify(call.await) {
                Ok(set) => {
                    self.store.put(&set).await;
                    flight.settle(SessionState::Succeeded);
                    tracing::info!(items = set.len(), "Blend succeeded");
                    Ok(set)
                }
                Err(e) => {
                    flight.settle(SessionState::Failed(e.kind()));
                    tracing::warn!(error = %e, kind = ?e.kind(), "Blend failed");
                    Err(e.into())
                }
            }
        }
        .instrument(span)
        .await
    }
}
