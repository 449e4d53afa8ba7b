//! Proxy identity metadata
//!
//! Everything a proxy knows about its entity without touching storage: the
//! entity name, the declared type, the identifier value, and which members
//! read or write that identifier. Immutable once constructed; materializing
//! the real instance never changes it.

use serde::{Deserialize, Serialize};

use crate::value::{EntityKey, Value};

/// Name-based descriptor of a declared entity type.
///
/// Session factories key session creation on this, and the proxy answers
/// type-name and instance-check calls from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
	name: String,
}

impl TypeDescriptor {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

impl std::fmt::Display for TypeDescriptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name)
	}
}

/// Which members of the proxied type read and write the identifier.
///
/// Either side may be absent. An entity with no identifier accessor simply
/// never gets identifier calls short-circuited.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IdentifierAccessor {
	getter: Option<String>,
	setter: Option<String>,
	id_type: Option<TypeDescriptor>,
}

impl IdentifierAccessor {
	pub fn new(
		getter: Option<String>,
		setter: Option<String>,
		id_type: Option<TypeDescriptor>,
	) -> Self {
		Self {
			getter,
			setter,
			id_type,
		}
	}

	/// Accessor with conventional `get`/`set` member names.
	///
	/// # Examples
	///
	/// ```
	/// use torpor::IdentifierAccessor;
	///
	/// let accessor = IdentifierAccessor::conventional("get_id", "set_id");
	/// assert_eq!(accessor.getter(), Some("get_id"));
	/// assert_eq!(accessor.setter(), Some("set_id"));
	/// ```
	pub fn conventional(getter: impl Into<String>, setter: impl Into<String>) -> Self {
		Self {
			getter: Some(getter.into()),
			setter: Some(setter.into()),
			id_type: None,
		}
	}

	pub fn with_id_type(mut self, id_type: TypeDescriptor) -> Self {
		self.id_type = Some(id_type);
		self
	}

	pub fn getter(&self) -> Option<&str> {
		self.getter.as_deref()
	}

	pub fn setter(&self) -> Option<&str> {
		self.setter.as_deref()
	}

	pub fn id_type(&self) -> Option<&TypeDescriptor> {
		self.id_type.as_ref()
	}
}

/// Identity metadata for one proxy instance.
///
/// Created when the proxy-generation host instantiates a stand-in for a
/// given entity/identifier pair; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProxyIdentity {
	entity_name: String,
	entity_type: TypeDescriptor,
	id: Value,
	id_accessor: IdentifierAccessor,
}

impl ProxyIdentity {
	/// Identity for `entity_name` of declared type `entity_type` with the
	/// given identifier value.
	pub fn new(
		entity_name: impl Into<String>,
		entity_type: TypeDescriptor,
		id: impl Into<Value>,
	) -> Self {
		Self {
			entity_name: entity_name.into(),
			entity_type,
			id: id.into(),
			id_accessor: IdentifierAccessor::default(),
		}
	}

	/// Attach identifier accessor metadata.
	pub fn with_id_accessor(mut self, id_accessor: IdentifierAccessor) -> Self {
		self.id_accessor = id_accessor;
		self
	}

	pub fn entity_name(&self) -> &str {
		&self.entity_name
	}

	pub fn entity_type(&self) -> &TypeDescriptor {
		&self.entity_type
	}

	pub fn id(&self) -> &Value {
		&self.id
	}

	pub fn id_accessor(&self) -> &IdentifierAccessor {
		&self.id_accessor
	}

	/// The entity-name + identifier pair this proxy stands in for.
	pub fn key(&self) -> EntityKey {
		EntityKey::new(self.entity_name.clone(), self.id.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_identity_construction() {
		let identity = ProxyIdentity::new("Order", TypeDescriptor::new("Order"), 42i64)
			.with_id_accessor(IdentifierAccessor::conventional("get_id", "set_id"));

		assert_eq!(identity.entity_name(), "Order");
		assert_eq!(identity.entity_type().name(), "Order");
		assert_eq!(identity.id(), &Value::Integer(42));
		assert_eq!(identity.id_accessor().getter(), Some("get_id"));
	}

	#[test]
	fn test_identity_key() {
		let identity = ProxyIdentity::new("Order", TypeDescriptor::new("Order"), 42i64);
		assert_eq!(identity.key().to_string(), "Order#42");
	}

	#[test]
	fn test_default_accessor_has_no_members() {
		let accessor = IdentifierAccessor::default();
		assert_eq!(accessor.getter(), None);
		assert_eq!(accessor.setter(), None);
		assert!(accessor.id_type().is_none());
	}
}
