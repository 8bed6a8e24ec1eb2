use thiserror::Error;

/// Error type returned by transports. Kept opaque so any driver's own error
/// can travel through the builder untouched.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("{label} not found")]
    NotFound { label: String },

    #[error("{label} not singular")]
    NotSingular { label: String },

    #[error("unsupported dialect: {dialect:?}")]
    UnsupportedDialect { dialect: String },

    #[error("{op}: {source}")]
    Driver {
        op: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("decoding {label}: {message}")]
    Decode { label: String, message: String },

    #[error("{op} is not achievable when selecting {count} fields")]
    MultipleFields { op: &'static str, count: usize },
}

impl QueryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::NotFound { .. })
    }

    pub fn is_not_singular(&self) -> bool {
        matches!(self, QueryError::NotSingular { .. })
    }

    pub(crate) fn driver(op: &'static str) -> impl FnOnce(BoxError) -> QueryError {
        move |source| QueryError::Driver { op, source }
    }

    pub(crate) fn decode(label: &str, message: impl ToString) -> QueryError {
        QueryError::Decode {
            label: label.to_string(),
            message: message.to_string(),
        }
    }
}
