//! # Operator Errors
//!
//! Structured, categorized errors raised on every fatal branch of a
//! reconciliation pass.
//!
//! An [`OperatorError`] carries:
//! - a category with a stable numeric code (`73000` operator, `79000` configuration)
//! - an [`ErrorKind`] identifying the failed step
//! - a human-readable message (also written to the resource status for validation failures)
//! - an ordered context map (`mcpServer`, `namespace`, `resource`, `operation`, ...)
//! - an optional underlying cause
//!
//! [`log_operator_error`] flattens all of this into structured `tracing` fields so
//! log aggregation can filter on `error.code` or any context key.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use tracing::Span;

/// Context attached to an error, rendered in key order
pub type ErrorContext = BTreeMap<String, String>;

/// Error category with its stable code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Operator,
    Config,
}

impl ErrorCategory {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            ErrorCategory::Operator => "73000",
            ErrorCategory::Config => "79000",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            ErrorCategory::Operator => "Operator error",
            ErrorCategory::Config => "Configuration error",
        }
    }
}

/// The step of a reconciliation pass that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FetchServer,
    ApplyDefaults,
    ReconcileDeployment,
    ReconcileService,
    ReconcileIngress,
    CheckReadiness,
    UpdateStatus,
    MissingImage,
    MissingIngressPath,
    InvalidCpuRequest,
    InvalidMemoryRequest,
    InvalidCpuLimit,
    InvalidMemoryLimit,
    InvalidConfig,
}

impl ErrorKind {
    /// Short sentinel text for the kind, e.g. "failed to reconcile deployment"
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::FetchServer => "failed to fetch MCPServer",
            ErrorKind::ApplyDefaults => "failed to apply defaults",
            ErrorKind::ReconcileDeployment => "failed to reconcile deployment",
            ErrorKind::ReconcileService => "failed to reconcile service",
            ErrorKind::ReconcileIngress => "failed to reconcile ingress",
            ErrorKind::CheckReadiness => "failed to check resource readiness",
            ErrorKind::UpdateStatus => "failed to update status",
            ErrorKind::MissingImage => "missing image",
            ErrorKind::MissingIngressPath => "missing ingress path",
            ErrorKind::InvalidCpuRequest => "invalid CPU request",
            ErrorKind::InvalidMemoryRequest => "invalid memory request",
            ErrorKind::InvalidCpuLimit => "invalid CPU limit",
            ErrorKind::InvalidMemoryLimit => "invalid memory limit",
            ErrorKind::InvalidConfig => "invalid controller configuration",
        }
    }

    /// Validation failures are reported on the resource status and are not
    /// fixed by retrying; everything else is treated as transient.
    #[must_use]
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            ErrorKind::MissingImage
                | ErrorKind::MissingIngressPath
                | ErrorKind::InvalidCpuRequest
                | ErrorKind::InvalidMemoryRequest
                | ErrorKind::InvalidCpuLimit
                | ErrorKind::InvalidMemoryLimit
        )
    }

    #[must_use]
    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorKind::InvalidConfig => ErrorCategory::Config,
            _ => ErrorCategory::Operator,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorized error with structured context
#[derive(Debug)]
pub struct OperatorError {
    kind: ErrorKind,
    message: String,
    context: ErrorContext,
    cause: Option<anyhow::Error>,
}

impl OperatorError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.category().code()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    #[must_use]
    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.kind.is_validation()
    }

    /// Add (or replace) one context entry
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Context rendered as `{k1=v1, k2=v2}`
    #[must_use]
    pub fn context_string(&self) -> String {
        let parts: Vec<String> = self
            .context
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        format!("{{{}}}", parts.join(", "))
    }

    /// Verbose single-line rendering including code, context and cause chain
    ///
    /// `code=73000 | description="Operator error" | message="..." | context={mcpServer=demo, namespace=default}`
    #[must_use]
    pub fn debug_string(&self) -> String {
        let category = self.category();
        let mut out = format!(
            "code={} | description={:?} | message={:?}",
            category.code(),
            category.description(),
            self.message
        );
        if !self.context.is_empty() {
            let _ = write!(out, " | context={}", self.context_string());
        }
        if let Some(cause) = &self.cause {
            let _ = write!(out, " | cause={:?}", format!("{cause:#}"));
        }
        out
    }
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for OperatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Build a context map for one MCPServer
#[must_use]
pub fn server_context(name: &str, namespace: &str) -> ErrorContext {
    ErrorContext::from([
        ("mcpServer".to_string(), name.to_string()),
        ("namespace".to_string(), namespace.to_string()),
    ])
}

/// Wrap an underlying failure with a kind, message and context
pub fn wrap_operator_error(
    kind: ErrorKind,
    cause: impl Into<anyhow::Error>,
    message: impl Into<String>,
    context: ErrorContext,
) -> OperatorError {
    OperatorError {
        kind,
        message: message.into(),
        context,
        cause: Some(cause.into()),
    }
}

/// Create an error that has no underlying cause (validation failures)
pub fn new_operator_error(
    kind: ErrorKind,
    message: impl Into<String>,
    context: ErrorContext,
) -> OperatorError {
    OperatorError {
        kind,
        message: message.into(),
        context,
        cause: None,
    }
}

/// Emit an error event under the given reconciliation span with the error's
/// code, category, kind, message, context and cause as structured fields.
///
/// Each known context key becomes its own `error.context.<key>` field; keys
/// the error does not carry are left out of the event.
pub fn log_operator_error(span: &Span, err: &OperatorError, msg: &str) {
    let cause = err.cause().map(|cause| format!("{cause:#}"));
    let ctx = |key: &str| err.context.get(key).map(String::as_str);
    tracing::error!(
        parent: span,
        error.code = err.code(),
        error.category = err.category().description(),
        error.kind = ?err.kind(),
        error.message = %err.message(),
        error.context.mcpServer = ctx("mcpServer"),
        error.context.namespace = ctx("namespace"),
        error.context.resource = ctx("resource"),
        error.context.operation = ctx("operation"),
        error.context.field = ctx("field"),
        error.context.value = ctx("value"),
        error.context.phase = ctx("phase"),
        error.context.setting = ctx("setting"),
        error.cause = cause.as_deref(),
        "{}",
        msg
    );
}
