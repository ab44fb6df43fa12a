use service_core::error::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::dtos::display_path;

/// Failure reported by a storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend unreachable, pool exhausted, or the call timed out.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Errors surfaced by the numbering and save workflow.
#[derive(Error, Debug)]
pub enum InvoiceError {
    /// Malformed input, rejected before the counter or store is touched.
    /// `field` uses persisted names (`items[0].price`).
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// No number could be reserved. Callers must not make one up.
    #[error("invoice counter unavailable for scope {scope}: {reason}")]
    CounterUnavailable { scope: String, reason: String },

    /// A header or item write failed. A number reserved for this save is
    /// not given back.
    #[error("failed to persist invoice {number} (submitted as '{submitted}'): {source}")]
    Persistence {
        number: String,
        submitted: String,
        #[source]
        source: StoreError,
    },

    #[error("company {0} not found")]
    CompanyNotFound(Uuid),

    #[error("invoice {0} not found")]
    NotFound(Uuid),
}

impl InvoiceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        InvoiceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Label used for the error counter metric.
    pub fn kind(&self) -> &'static str {
        match self {
            InvoiceError::Validation { .. } => "validation",
            InvoiceError::CounterUnavailable { .. } => "counter_unavailable",
            InvoiceError::Persistence { .. } => "persistence",
            InvoiceError::CompanyNotFound(_) => "company_not_found",
            InvoiceError::NotFound(_) => "not_found",
        }
    }
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::Validation { field, message } => AppError::InvalidInput(
                anyhow::anyhow!("{}: {}", display_path(&field), message),
            ),
            e @ InvoiceError::CounterUnavailable { .. } => {
                AppError::ServiceUnavailable(anyhow::Error::new(e))
            }
            e @ InvoiceError::Persistence { .. } => AppError::DatabaseError(anyhow::Error::new(e)),
            e @ InvoiceError::CompanyNotFound(_) => AppError::BadRequest(anyhow::Error::new(e)),
            e @ InvoiceError::NotFound(_) => AppError::NotFound(anyhow::Error::new(e)),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            e @ StoreError::Unavailable(_) => AppError::ServiceUnavailable(anyhow::Error::new(e)),
            e @ StoreError::Conflict(_) => AppError::Conflict(anyhow::Error::new(e)),
            e @ StoreError::Query(_) => AppError::DatabaseError(anyhow::Error::new(e)),
        }
    }
}
