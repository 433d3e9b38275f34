//! Error types for recordmap

use serde_json::Value;

use crate::remote::RemoteError;

/// A conversion function rejected a value
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot convert {value} with {conversion}")]
pub struct ConversionError {
    pub conversion: &'static str,
    pub value: Value,
}

impl ConversionError {
    pub fn new(conversion: &'static str, value: &Value) -> Self {
        Self {
            conversion,
            value: value.clone(),
        }
    }
}

/// Error type for record operations
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{entity} has no field named {field}")]
    UnknownField { entity: String, field: String },

    #[error("no {entity} matched filters {filters}")]
    NotFound { entity: String, filters: Value },

    #[error("{entity} is read-only: no {operation} operation is bound")]
    ReadOnlyEntity {
        entity: String,
        operation: &'static str,
    },

    #[error("{entity}: remote operation {operation} failed with arguments {arguments}: {source}")]
    Remote {
        entity: String,
        operation: String,
        arguments: Value,
        #[source]
        source: RemoteError,
    },

    #[error("{entity}.{field}: {source}")]
    Conversion {
        entity: String,
        field: String,
        #[source]
        source: ConversionError,
    },

    #[error("{entity}.{field} is the primary key of a persisted record and cannot change")]
    PrimaryKeyChange { entity: String, field: String },

    #[error("{entity}.{field} is not set")]
    MissingKey { entity: String, field: String },

    #[error("{entity}: remote operation {operation} returned an unexpected response: {detail}")]
    UnexpectedResponse {
        entity: String,
        operation: String,
        detail: String,
    },

    #[error("field {0} is declared more than once")]
    DuplicateField(String),

    #[error("field {field} converts with {conversion} on read but declares no write conversion")]
    MissingWriteConversion {
        field: String,
        conversion: &'static str,
    },

    #[error("{entity}: primary key {field} is not a declared field")]
    UnknownPrimaryKey { entity: String, field: String },

    #[error("{0} has no list operation bound")]
    MissingListOperation(String),
}

/// Result type alias for record operations
pub type Result<T> = std::result::Result<T, RecordError>;

impl RecordError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RecordError::NotFound { .. })
    }

    pub fn is_unknown_field(&self) -> bool {
        matches!(self, RecordError::UnknownField { .. })
    }
}
