//! Call descriptors
//!
//! A [`Call`] is a tagged description of a call attempted against a proxy:
//! the member being invoked plus its argument values. It deliberately carries
//! no reflection handle; the proxy-generation host translates whatever its
//! dispatch mechanism produces into this shape.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Description of one intercepted call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Call {
	member: String,
	args: Vec<Value>,
}

impl Call {
	/// Describe a call to `member` with the given arguments.
	pub fn new(member: impl Into<String>, args: Vec<Value>) -> Self {
		Self {
			member: member.into(),
			args,
		}
	}

	/// Describe a zero-argument accessor call.
	///
	/// # Examples
	///
	/// ```
	/// use torpor::Call;
	///
	/// let call = Call::getter("get_id");
	/// assert_eq!(call.member(), "get_id");
	/// assert_eq!(call.arity(), 0);
	/// ```
	pub fn getter(member: impl Into<String>) -> Self {
		Self::new(member, Vec::new())
	}

	/// Describe a single-argument mutator call.
	pub fn setter(member: impl Into<String>, value: impl Into<Value>) -> Self {
		Self::new(member, vec![value.into()])
	}

	/// Describe a general method call.
	pub fn method(member: impl Into<String>, args: Vec<Value>) -> Self {
		Self::new(member, args)
	}

	/// The member this call targets.
	pub fn member(&self) -> &str {
		&self.member
	}

	/// The call's arguments, in order.
	pub fn args(&self) -> &[Value] {
		&self.args
	}

	/// Number of arguments.
	pub fn arity(&self) -> usize {
		self.args.len()
	}
}

impl std::fmt::Display for Call {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}(", self.member)?;
		for (i, arg) in self.args.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{}", arg)?;
		}
		write!(f, ")")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_call_constructors() {
		let getter = Call::getter("get_total");
		assert_eq!(getter.member(), "get_total");
		assert!(getter.args().is_empty());

		let setter = Call::setter("set_total", 10i64);
		assert_eq!(setter.arity(), 1);
		assert_eq!(setter.args()[0], Value::Integer(10));

		let method = Call::method("apply_discount", vec![Value::Float(0.1), Value::Boolean(true)]);
		assert_eq!(method.arity(), 2);
	}

	#[test]
	fn test_call_display() {
		let call = Call::method("apply_discount", vec![Value::Float(0.5)]);
		assert_eq!(call.to_string(), "apply_discount(0.5)");

		let call = Call::getter("get_total");
		assert_eq!(call.to_string(), "get_total()");
	}
}
