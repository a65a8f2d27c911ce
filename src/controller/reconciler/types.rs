//! # Types
//!
//! Core types for the reconciler.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::config::ControllerConfig;
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::store::KubeStore;
use crate::errors::OperatorError;

#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Reconciliation failed: {0}")]
    ReconciliationFailed(#[from] OperatorError),
}

impl ReconcilerError {
    #[must_use]
    pub fn operator_error(&self) -> &OperatorError {
        match self {
            ReconcilerError::ReconciliationFailed(err) => err,
        }
    }
}

/// Terminal result of one successful reconciliation pass
///
/// Failures are returned as [`ReconcilerError`] and handled by the error policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Converged for now; re-checked on the next resync
    Done,
    /// Defaults were written; run again right away
    RequeueNow,
    /// Run again after the given delay
    RequeueAfter(Duration),
}

impl Outcome {
    /// Label used for the requeue metric
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Done => "resync",
            Outcome::RequeueNow => "requeue-now",
            Outcome::RequeueAfter(_) => "requeue-after",
        }
    }
}

/// Backoff state for a specific resource
/// Tracks error count and backoff calculator for progressive retries
#[derive(Debug, Clone)]
pub struct BackoffState {
    pub backoff: FibonacciBackoff,
    pub error_count: u32,
}

impl BackoffState {
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self {
            backoff: FibonacciBackoff::new(min_secs, max_secs),
            error_count: 0,
        }
    }

    pub fn increment_error(&mut self) {
        self.error_count += 1;
    }
}

/// Shared context handed to every reconciliation pass
pub struct Reconciler<S = KubeStore> {
    pub store: S,
    pub config: ControllerConfig,
    // Backoff state per resource (identified by namespace/name), owned by the error policy
    pub backoff_states: Arc<Mutex<HashMap<String, BackoffState>>>,
}

impl<S> fmt::Debug for Reconciler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S> Reconciler<S> {
    pub fn new(store: S, config: ControllerConfig) -> Self {
        Self {
            store,
            config,
            backoff_states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Key used for per-resource state
    #[must_use]
    pub fn resource_key(namespace: &str, name: &str) -> String {
        format!("{namespace}/{name}")
    }

    /// Forget the error streak of a resource after a successful pass
    pub fn reset_backoff(&self, namespace: &str, name: &str) {
        if let Ok(mut states) = self.backoff_states.lock() {
            states.remove(&Self::resource_key(namespace, name));
        }
    }
}
