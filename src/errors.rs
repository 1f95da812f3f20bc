use crate::models::BookingStatus;

/// Domain error for manager operations.
///
/// Every variant is recovered at the menu layer and surfaced as a declined
/// operation with a reason; none aborts the process.
#[derive(Debug)]
pub enum Error {
    /// Bad user input: invalid date range, negative price, and the like
    Validation(String),
    /// Unknown identifier for the given entity kind
    NotFound { kind: &'static str, id: String },
    /// Duplicate username, delete blocked by active bookings
    Conflict(String),
    /// Requested booking status change is not a legal transition
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    /// Bad credentials
    Unauthenticated,
    /// I/O or serialization failure on the save path
    Storage(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Validation(msg) => write!(f, "{}", msg),
            Error::NotFound { kind, id } => write!(f, "no {} found with ID: {}", kind, id),
            Error::Conflict(msg) => write!(f, "{}", msg),
            Error::InvalidTransition { from, to } => {
                write!(
                    f,
                    "cannot change booking from {} to {}",
                    from.as_str(),
                    to.as_str()
                )
            }
            Error::Unauthenticated => write!(f, "invalid username or password"),
            Error::Storage(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
