//! Opaque value model for intercepted calls
//!
//! Arguments and return values cross the interception boundary as [`Value`]s
//! so the core never depends on concrete entity types.

use serde::{Deserialize, Serialize};

use crate::error::{ProxyError, ProxyResult};

/// A call argument or return value.
///
/// Identifier values are also carried as `Value`s, so a proxy can hand its
/// identifier back without knowing anything about the identifier's type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
	Null,
	Boolean(bool),
	Integer(i64),
	Float(f64),
	String(String),
	/// A reference to another persisted entity, by name and identifier.
	Entity(EntityKey),
}

/// Entity name plus identifier: enough to compare two persistent objects
/// without loading either of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash)]
pub struct EntityKey {
	/// Entity name as registered with the persistence layer.
	pub entity: String,

	/// Identifier value.
	pub id: Box<Value>,
}

impl EntityKey {
	pub fn new(entity: impl Into<String>, id: impl Into<Value>) -> Self {
		Self {
			entity: entity.into(),
			id: Box::new(id.into()),
		}
	}

	/// Stable hash over entity name and identifier.
	///
	/// Two keys for the same entity/identifier pair hash identically, which
	/// is what proxy-local hash-code answers are built from.
	pub fn identity_hash(&self) -> i64 {
		use std::hash::{Hash, Hasher};

		let mut hasher = std::collections::hash_map::DefaultHasher::new();
		self.hash(&mut hasher);
		hasher.finish() as i64
	}
}

impl std::fmt::Display for EntityKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}#{}", self.entity, self.id)
	}
}

impl From<String> for Value {
	fn from(s: String) -> Self {
		Value::String(s)
	}
}

impl From<&str> for Value {
	fn from(s: &str) -> Self {
		Value::String(s.to_string())
	}
}

impl From<i64> for Value {
	fn from(i: i64) -> Self {
		Value::Integer(i)
	}
}

impl From<f64> for Value {
	fn from(f: f64) -> Self {
		Value::Float(f)
	}
}

impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Boolean(b)
	}
}

impl From<EntityKey> for Value {
	fn from(key: EntityKey) -> Self {
		Value::Entity(key)
	}
}

impl Value {
	/// Try to convert to String
	///
	/// # Examples
	///
	/// ```
	/// use torpor::Value;
	///
	/// let value = Value::String("hello".to_string());
	/// assert_eq!(value.as_string().unwrap(), "hello");
	///
	/// let int_value = Value::Integer(42);
	/// assert!(int_value.as_string().is_err());
	/// ```
	pub fn as_string(&self) -> ProxyResult<String> {
		match self {
			Value::String(s) => Ok(s.clone()),
			_ => Err(ProxyError::TypeMismatch {
				expected: "String".to_string(),
				actual: format!("{:?}", self),
			}),
		}
	}

	/// Try to convert to i64
	///
	/// # Examples
	///
	/// ```
	/// use torpor::Value;
	///
	/// let value = Value::Integer(42);
	/// assert_eq!(value.as_integer().unwrap(), 42);
	/// ```
	pub fn as_integer(&self) -> ProxyResult<i64> {
		match self {
			Value::Integer(i) => Ok(*i),
			_ => Err(ProxyError::TypeMismatch {
				expected: "Integer".to_string(),
				actual: format!("{:?}", self),
			}),
		}
	}

	/// Try to convert to f64
	pub fn as_float(&self) -> ProxyResult<f64> {
		match self {
			Value::Float(f) => Ok(*f),
			_ => Err(ProxyError::TypeMismatch {
				expected: "Float".to_string(),
				actual: format!("{:?}", self),
			}),
		}
	}

	/// Try to convert to bool
	pub fn as_boolean(&self) -> ProxyResult<bool> {
		match self {
			Value::Boolean(b) => Ok(*b),
			_ => Err(ProxyError::TypeMismatch {
				expected: "Boolean".to_string(),
				actual: format!("{:?}", self),
			}),
		}
	}

	/// Try to convert to an entity reference
	pub fn as_entity(&self) -> ProxyResult<&EntityKey> {
		match self {
			Value::Entity(key) => Ok(key),
			_ => Err(ProxyError::TypeMismatch {
				expected: "Entity".to_string(),
				actual: format!("{:?}", self),
			}),
		}
	}

	/// Check if value is null
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}
}

impl std::hash::Hash for Value {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		std::mem::discriminant(self).hash(state);
		match self {
			Value::Null => {}
			Value::Boolean(b) => b.hash(state),
			Value::Integer(i) => i.hash(state),
			// NaN payloads are not meaningful identifiers; bit equality is enough
			Value::Float(f) => f.to_bits().hash(state),
			Value::String(s) => s.hash(state),
			Value::Entity(key) => key.hash(state),
		}
	}
}

impl std::fmt::Display for Value {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Null => write!(f, "null"),
			Value::Boolean(b) => write!(f, "{}", b),
			Value::Integer(i) => write!(f, "{}", i),
			Value::Float(v) => write!(f, "{}", v),
			Value::String(s) => write!(f, "{}", s),
			Value::Entity(key) => write!(f, "{}", key),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_value_conversions_unit() {
		let s = Value::from("test");
		assert_eq!(s.as_string().unwrap(), "test");

		let i = Value::from(42i64);
		assert_eq!(i.as_integer().unwrap(), 42);

		let f = Value::from(3.14);
		assert_eq!(f.as_float().unwrap(), 3.14);

		let b = Value::from(true);
		assert_eq!(b.as_boolean().unwrap(), true);
	}

	#[test]
	fn test_value_type_mismatch_unit() {
		let s = Value::String("test".to_string());
		assert!(s.as_integer().is_err());
		assert!(s.as_entity().is_err());
	}

	#[test]
	fn test_entity_key_display() {
		let key = EntityKey::new("Order", 42i64);
		assert_eq!(key.to_string(), "Order#42");
	}

	#[test]
	fn test_entity_key_identity_hash_is_stable() {
		let a = EntityKey::new("Order", 42i64);
		let b = EntityKey::new("Order", 42i64);
		let c = EntityKey::new("Order", 43i64);

		assert_eq!(a.identity_hash(), b.identity_hash());
		assert_ne!(a.identity_hash(), c.identity_hash());
	}

	#[test]
	fn test_value_serde_untagged() {
		let value = Value::Entity(EntityKey::new("Order", 42i64));
		let json = serde_json::to_string(&value).unwrap();
		assert_eq!(json, r#"{"entity":"Order","id":42}"#);

		let back: Value = serde_json::from_str(&json).unwrap();
		assert_eq!(back, value);

		let scalar: Value = serde_json::from_str("7").unwrap();
		assert_eq!(scalar, Value::Integer(7));
	}
}
