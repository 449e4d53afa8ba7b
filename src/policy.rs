//! Interception policy configuration
//!
//! The set of call shapes a proxy answers from identity metadata alone is
//! explicit configuration, not an implicit convention. The default policy
//! covers the usual pattern family: identifier getter, equality, hash code,
//! type name, and instance checks.

use crate::identity::IdentifierAccessor;

/// Which call shapes are answerable without materializing the entity.
///
/// Each rule group can be renamed or disabled. The identifier getter rule is
/// always driven by the proxy's [`IdentifierAccessor`] metadata; aliases
/// configured here are answered in addition to it.
///
/// # Examples
///
/// ```
/// use torpor::InterceptionPolicy;
///
/// let policy = InterceptionPolicy::new()
///     .with_getter_alias("id")
///     .without_hash();
///
/// assert!(policy.hash_member().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct InterceptionPolicy {
	getter_aliases: Vec<String>,
	equality_member: Option<String>,
	hash_member: Option<String>,
	type_name_member: Option<String>,
	instance_check_member: Option<String>,
}

impl InterceptionPolicy {
	/// Policy with the default member names.
	pub fn new() -> Self {
		Self {
			getter_aliases: Vec::new(),
			equality_member: Some("eq".to_string()),
			hash_member: Some("hash_key".to_string()),
			type_name_member: Some("type_name".to_string()),
			instance_check_member: Some("is_instance_of".to_string()),
		}
	}

	/// Answer this member as an identifier getter, in addition to the one
	/// named by the identity metadata.
	pub fn with_getter_alias(mut self, member: impl Into<String>) -> Self {
		self.getter_aliases.push(member.into());
		self
	}

	/// Rename the locally-answered equality member.
	pub fn with_equality_member(mut self, member: impl Into<String>) -> Self {
		self.equality_member = Some(member.into());
		self
	}

	/// Never answer equality locally; always dispatch to the real instance.
	pub fn without_equality(mut self) -> Self {
		self.equality_member = None;
		self
	}

	/// Rename the locally-answered hash-code member.
	pub fn with_hash_member(mut self, member: impl Into<String>) -> Self {
		self.hash_member = Some(member.into());
		self
	}

	/// Never answer hash codes locally.
	pub fn without_hash(mut self) -> Self {
		self.hash_member = None;
		self
	}

	/// Rename the locally-answered type-name member.
	pub fn with_type_name_member(mut self, member: impl Into<String>) -> Self {
		self.type_name_member = Some(member.into());
		self
	}

	/// Never answer type names locally.
	pub fn without_type_name(mut self) -> Self {
		self.type_name_member = None;
		self
	}

	/// Rename the locally-answered instance-check member.
	pub fn with_instance_check_member(mut self, member: impl Into<String>) -> Self {
		self.instance_check_member = Some(member.into());
		self
	}

	/// Never answer instance checks locally.
	pub fn without_instance_check(mut self) -> Self {
		self.instance_check_member = None;
		self
	}

	pub fn getter_aliases(&self) -> &[String] {
		&self.getter_aliases
	}

	pub fn equality_member(&self) -> Option<&str> {
		self.equality_member.as_deref()
	}

	pub fn hash_member(&self) -> Option<&str> {
		self.hash_member.as_deref()
	}

	pub fn type_name_member(&self) -> Option<&str> {
		self.type_name_member.as_deref()
	}

	pub fn instance_check_member(&self) -> Option<&str> {
		self.instance_check_member.as_deref()
	}

	/// Does `member` read the identifier, per metadata or configured alias?
	pub fn is_identifier_getter(&self, member: &str, accessor: &IdentifierAccessor) -> bool {
		accessor.getter() == Some(member) || self.getter_aliases.iter().any(|m| m == member)
	}

	/// Does `member` write the identifier, per metadata?
	pub fn is_identifier_setter(&self, member: &str, accessor: &IdentifierAccessor) -> bool {
		accessor.setter() == Some(member)
	}

	pub fn is_equality(&self, member: &str) -> bool {
		self.equality_member.as_deref() == Some(member)
	}

	pub fn is_hash(&self, member: &str) -> bool {
		self.hash_member.as_deref() == Some(member)
	}

	pub fn is_type_name(&self, member: &str) -> bool {
		self.type_name_member.as_deref() == Some(member)
	}

	pub fn is_instance_check(&self, member: &str) -> bool {
		self.instance_check_member.as_deref() == Some(member)
	}
}

impl Default for InterceptionPolicy {
	fn default() -> Self {
		Self::new()
	}
}
