//! Error types for proxy interception and materialization.

use thiserror::Error;

/// Result type for proxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// The real target's own failure kind, type-erased.
///
/// Entities report their domain failures through this so the interceptor can
/// re-raise them without inventing a wrapper of its own.
pub type TargetError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced to callers of an intercepted call.
///
/// This layer recovers nothing: session failures pass through transparently
/// and target failures are re-raised with their original content. A call
/// arriving before the proxy finished constructing is not an error at all;
/// interception is silently skipped.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProxyError {
	/// The session collaborator failed to load the real instance.
	#[error(transparent)]
	Session(#[from] SessionError),

	/// The real member's own logic failed. Displays as the target failure
	/// itself; the concrete type stays reachable via [`ProxyError::target_error`].
	#[error("{inner}")]
	Target {
		/// Member whose invocation failed.
		member: String,
		/// The target's original failure.
		inner: TargetError,
	},

	/// The call names a member the real instance does not have.
	#[error("entity `{entity}` has no member `{member}`")]
	UnknownMember {
		/// Entity name.
		entity: String,
		/// Requested member.
		member: String,
	},

	/// A [`Value`](crate::Value) accessor was used against the wrong variant.
	#[error("expected {expected}, got {actual}")]
	TypeMismatch {
		/// Expected variant.
		expected: String,
		/// Actual value.
		actual: String,
	},
}

impl ProxyError {
	/// The original target failure, when this error re-raises one.
	///
	/// Callers downcast this to the target's concrete error type, exactly as
	/// if they had called the real instance directly.
	pub fn target_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
		match self {
			ProxyError::Target { inner, .. } => Some(inner.as_ref()),
			_ => None,
		}
	}
}

/// Errors reported by the session/storage collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
	/// The session is closed or disconnected.
	#[error("session is closed")]
	Closed,

	/// No stored row for the requested entity.
	#[error("no stored entity `{entity}` with identifier {id}")]
	NotFound {
		/// Entity name.
		entity: String,
		/// Identifier, rendered for diagnostics.
		id: String,
	},

	/// Backing-store failure.
	#[error("storage error: {0}")]
	Storage(String),
}
