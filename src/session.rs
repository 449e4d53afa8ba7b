//! Session collaborator contracts
//!
//! The backing store is reached through these traits only. The proxy core
//! never owns a session: an externally-supplied one is held weakly, and a
//! session the core opens itself (to reconnect for a load) is released back
//! to its factory before the load call returns.

use std::sync::Arc;

use crate::entity::Entity;
use crate::error::SessionError;
use crate::identity::TypeDescriptor;
use crate::value::Value;

/// A unit-of-work handle to the backing store.
///
/// Loads are synchronous, blocking calls; cancellation and timeouts are the
/// implementation's concern, not the proxy core's.
pub trait Session: Send + Sync {
	/// Has this session been closed?
	fn is_open(&self) -> bool;

	/// Does this session still hold a live connection?
	fn is_connected(&self) -> bool;

	/// Load the entity with the given name and identifier.
	fn load(&self, entity_name: &str, id: &Value) -> Result<Arc<dyn Entity>, SessionError>;
}

/// Creates and releases [`Session`]s, keyed by declared entity type.
///
/// Injected into each proxy's state machine rather than reached globally, so
/// the core stays testable against fakes.
pub trait SessionFactory: Send + Sync {
	/// Open a session suitable for loading entities of `entity_type`.
	fn create_session(
		&self,
		entity_type: &TypeDescriptor,
	) -> Result<Arc<dyn Session>, SessionError>;

	/// Return a session obtained from [`SessionFactory::create_session`].
	fn release_session(&self, session: Arc<dyn Session>);
}
