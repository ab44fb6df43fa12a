//! Sequence counter service.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::error::{InvoiceError, StoreError};
use super::metrics::{COUNTER_INCREMENTS_TOTAL, ERRORS_TOTAL};
use super::store::SequenceStore;
use crate::models::CounterScope;

/// Strictly increasing integer per scope, backed by a [`SequenceStore`].
///
/// Holds no counter state of its own; every call goes to the store so any
/// number of service instances share one source of truth.
#[derive(Clone)]
pub struct SequenceCounter {
    store: Arc<dyn SequenceStore>,
    timeout: Duration,
}

impl SequenceCounter {
    pub fn new(store: Arc<dyn SequenceStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Next value `increment_and_get` would return if nobody else got there
    /// first. Advisory only: two concurrent peeks can return the same value
    /// and the number may be taken by the time the caller saves.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn peek_next(&self, scope: &CounterScope) -> Result<i64, InvoiceError> {
        let current = self.call(scope, self.store.current_sequence(scope)).await?;
        Ok(current + 1)
    }

    /// Reserve the next value for `scope`. A failed or timed-out call yields
    /// [`InvoiceError::CounterUnavailable`]; it is never retried here.
    #[instrument(skip(self), fields(scope = %scope))]
    pub async fn increment_and_get(&self, scope: &CounterScope) -> Result<i64, InvoiceError> {
        let sequence = self.call(scope, self.store.increment_sequence(scope)).await?;

        COUNTER_INCREMENTS_TOTAL
            .with_label_values(&[scope.as_str()])
            .inc();
        info!(scope = %scope, sequence, "Invoice sequence reserved");

        Ok(sequence)
    }

    async fn call<F>(&self, scope: &CounterScope, fut: F) -> Result<i64, InvoiceError>
    where
        F: std::future::Future<Output = Result<i64, StoreError>>,
    {
        let reason = match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}ms", self.timeout.as_millis()),
        };

        warn!(scope = %scope, reason = %reason, "Invoice counter unavailable");
        ERRORS_TOTAL
            .with_label_values(&["counter_unavailable"])
            .inc();

        Err(InvoiceError::CounterUnavailable {
            scope: scope.to_string(),
            reason,
        })
    }
}
