//! Entity invocation contract
//!
//! The materialized real instance is reached only through [`Entity`]:
//! string-keyed member dispatch over [`Call`] descriptors. Target failures
//! are wrapped into [`InvocationError::Target`] here and unwrapped again by
//! the interceptor; the wrap/unwrap pair is the explicit contract, so a
//! caller never observes dispatch machinery in a failure.

use thiserror::Error;

use crate::call::Call;
use crate::error::TargetError;
use crate::value::Value;

/// A materialized persistent entity, able to answer described calls.
///
/// Implementations match on [`Call::member`] and evaluate against their own
/// state; a member that produces nothing returns [`Value::Null`]. Domain
/// failures are reported through [`InvocationError::target`] so their
/// original type survives the dispatch boundary.
///
/// ## Example
///
/// ```rust,ignore
/// impl Entity for Order {
///     fn entity_name(&self) -> &str {
///         "Order"
///     }
///
///     fn invoke(&self, call: &Call) -> Result<Value, InvocationError> {
///         match call.member() {
///             "get_total" => Ok(Value::Integer(self.total)),
///             "ship" => self
///                 .ship()
///                 .map(|_| Value::Null)
///                 .map_err(|e| InvocationError::target("ship", e)),
///             member => Err(InvocationError::unknown_member("Order", member)),
///         }
///     }
/// }
/// ```
pub trait Entity: Send + Sync {
	/// Entity name as registered with the persistence layer.
	fn entity_name(&self) -> &str;

	/// Invoke the described member against this instance.
	fn invoke(&self, call: &Call) -> Result<Value, InvocationError>;
}

/// Failure reported by [`Entity::invoke`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvocationError {
	/// The described member does not exist on the target.
	#[error("entity `{entity}` has no member `{member}`")]
	UnknownMember {
		/// Entity name.
		entity: String,
		/// Requested member.
		member: String,
	},

	/// The member's own logic failed; `inner` is the target's failure.
	#[error("{inner}")]
	Target {
		/// Member whose invocation failed.
		member: String,
		/// The target's original failure.
		inner: TargetError,
	},
}

impl InvocationError {
	/// Report a member the target does not have.
	pub fn unknown_member(entity: impl Into<String>, member: impl Into<String>) -> Self {
		InvocationError::UnknownMember {
			entity: entity.into(),
			member: member.into(),
		}
	}

	/// Wrap a target failure for transport across the dispatch boundary.
	pub fn target(member: impl Into<String>, inner: impl Into<TargetError>) -> Self {
		InvocationError::Target {
			member: member.into(),
			inner: inner.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, Error)]
	#[error("insufficient stock")]
	struct StockError;

	struct Item {
		quantity: i64,
	}

	impl Entity for Item {
		fn entity_name(&self) -> &str {
			"Item"
		}

		fn invoke(&self, call: &Call) -> Result<Value, InvocationError> {
			match call.member() {
				"get_quantity" => Ok(Value::Integer(self.quantity)),
				"reserve" => Err(InvocationError::target("reserve", StockError)),
				member => Err(InvocationError::unknown_member("Item", member)),
			}
		}
	}

	#[test]
	fn test_invoke_returns_member_value() {
		let item = Item { quantity: 3 };
		let value = item.invoke(&Call::getter("get_quantity")).unwrap();
		assert_eq!(value, Value::Integer(3));
	}

	#[test]
	fn test_target_wrapper_preserves_display() {
		let item = Item { quantity: 3 };
		let err = item.invoke(&Call::getter("reserve")).unwrap_err();
		assert_eq!(err.to_string(), "insufficient stock");
		assert!(matches!(err, InvocationError::Target { .. }));
	}

	#[test]
	fn test_unknown_member_reported() {
		let item = Item { quantity: 3 };
		let err = item.invoke(&Call::getter("get_weight")).unwrap_err();
		assert_eq!(err.to_string(), "entity `Item` has no member `get_weight`");
	}
}
