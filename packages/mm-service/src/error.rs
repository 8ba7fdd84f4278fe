pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("{operation} timed out after {timeout_ms} ms.")]
	Timeout { operation: String, timeout_ms: u64 },
	#[error("Research run was cancelled.")]
	Cancelled,
	#[error("Invalid run state: {message}")]
	InvalidState { message: String },
}
impl Error {
	/// Stable machine-readable code surfaced to API callers.
	pub fn code(&self) -> &'static str {
		match self {
			Self::InvalidRequest { .. } => "INVALID_REQUEST",
			Self::Provider { .. } => "PROVIDER_ERROR",
			Self::Storage { .. } => "STORAGE_ERROR",
			Self::Timeout { .. } => "TIMEOUT",
			Self::Cancelled => "CANCELLED",
			Self::InvalidState { .. } => "INTERNAL_ERROR",
		}
	}
}

impl From<mm_providers::Error> for Error {
	fn from(err: mm_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<mm_storage::Error> for Error {
	fn from(err: mm_storage::Error) -> Self {
		match err {
			mm_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			mm_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}
