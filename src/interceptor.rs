//! Call interception
//!
//! [`LazyInterceptor`] is the bridge between the proxy-generation host's
//! dispatch hook and the materialization state machine: every call made
//! against a proxy lands here, gets answered from identity metadata when
//! possible, and otherwise rides a materialized real instance. Failures of
//! the real member are re-raised as themselves, never as dispatch wrappers.

use std::sync::Arc;

use crate::call::Call;
use crate::entity::InvocationError;
use crate::error::{ProxyError, ProxyResult};
use crate::materializer::{Materializer, Resolution};
use crate::value::Value;

/// Polymorphic interception entry point.
///
/// The proxy-generation host holds an `Arc<dyn Intercept>` per proxy object
/// and routes every generated-member call through it. `Ok(None)` means this
/// layer produced no value: the call arrived before the proxy finished
/// constructing, and the host's own construction path owns any behavior.
pub trait Intercept: Send + Sync {
	/// Answer one call made against the proxy.
	fn intercept(&self, call: &Call) -> ProxyResult<Option<Value>>;
}

/// Interceptor backed by a [`Materializer`].
///
/// ## Example
///
/// ```rust,ignore
/// let core = Arc::new(Materializer::new(identity, factory).with_session(&session));
/// let interceptor = LazyInterceptor::new(Arc::clone(&core));
/// core.finish_construction();
///
/// // identifier access never touches storage
/// let id = interceptor.intercept(&Call::getter("get_id"))?;
///
/// // first state-bearing call loads the entity, later ones reuse it
/// let total = interceptor.intercept(&Call::getter("get_total"))?;
/// ```
pub struct LazyInterceptor {
	core: Arc<Materializer>,
}

impl LazyInterceptor {
	pub fn new(core: Arc<Materializer>) -> Self {
		Self { core }
	}

	/// The state machine behind this interceptor.
	pub fn materializer(&self) -> &Arc<Materializer> {
		&self.core
	}
}

impl Intercept for LazyInterceptor {
	fn intercept(&self, call: &Call) -> ProxyResult<Option<Value>> {
		match self.core.resolve(call) {
			Resolution::PassThrough => Ok(None),
			Resolution::Handled(value) => {
				tracing::trace!(
					entity = self.core.identity().entity_name(),
					call = %call,
					"answered from identity metadata"
				);
				Ok(Some(value))
			}
			Resolution::RequiresMaterialization => {
				let target = self.core.materialize()?;
				match target.invoke(call) {
					Ok(value) => Ok(Some(value)),
					Err(InvocationError::UnknownMember { entity, member }) => {
						Err(ProxyError::UnknownMember { entity, member })
					}
					// unwrap the dispatch wrapper: the caller gets the
					// member's own failure, as a direct call would raise it
					Err(InvocationError::Target { member, inner }) => {
						Err(ProxyError::Target { member, inner })
					}
				}
			}
		}
	}
}
