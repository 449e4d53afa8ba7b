//! # Torpor
//!
//! Lazy-loading entity proxies for object-relational persistence layers.
//!
//! A torpor proxy is a placeholder standing in for a persisted entity that
//! has not been loaded yet. Every call made against the proxy is routed
//! through a [`LazyInterceptor`]; calls answerable from identity metadata
//! alone (identifier access, equality, hash codes, type checks) are answered
//! on the spot, and the first call that needs real state materializes the
//! entity from the backing store, exactly once per proxy, reconnecting
//! through the session factory if the original session has gone away.
//!
//! ## Core Principles
//!
//! - **Interception over inheritance**: the proxy-generation host routes
//!   generated-member calls to one [`Intercept`] entry point
//! - **At-most-once materialization**: the real instance is loaded on first
//!   need and cached for the proxy's lifetime
//! - **Sessions are borrowed, never owned**: an externally-supplied session
//!   is held weakly; a session opened to reconnect is always released back
//! - **Failures keep their identity**: a failing member surfaces its own
//!   error to the caller, never a dispatch wrapper
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use torpor::{
//!     Call, Entity, Intercept, InvocationError, LazyInterceptor, Materializer,
//!     IdentifierAccessor, ProxyIdentity, Session, SessionError, SessionFactory,
//!     TypeDescriptor, Value,
//! };
//!
//! struct Order {
//!     total: i64,
//! }
//!
//! impl Entity for Order {
//!     fn entity_name(&self) -> &str {
//!         "Order"
//!     }
//!
//!     fn invoke(&self, call: &Call) -> Result<Value, InvocationError> {
//!         match call.member() {
//!             "get_total" => Ok(Value::Integer(self.total)),
//!             member => Err(InvocationError::unknown_member("Order", member)),
//!         }
//!     }
//! }
//!
//! struct OrderSession;
//!
//! impl Session for OrderSession {
//!     fn is_open(&self) -> bool {
//!         true
//!     }
//!
//!     fn is_connected(&self) -> bool {
//!         true
//!     }
//!
//!     fn load(&self, _entity: &str, _id: &Value) -> Result<Arc<dyn Entity>, SessionError> {
//!         Ok(Arc::new(Order { total: 250 }))
//!     }
//! }
//!
//! struct Pool;
//!
//! impl SessionFactory for Pool {
//!     fn create_session(
//!         &self,
//!         _entity_type: &TypeDescriptor,
//!     ) -> Result<Arc<dyn Session>, SessionError> {
//!         Ok(Arc::new(OrderSession))
//!     }
//!
//!     fn release_session(&self, _session: Arc<dyn Session>) {}
//! }
//!
//! let identity = ProxyIdentity::new("Order", TypeDescriptor::new("Order"), 42i64)
//!     .with_id_accessor(IdentifierAccessor::conventional("get_id", "set_id"));
//! let core = Arc::new(Materializer::new(identity, Arc::new(Pool) as Arc<dyn SessionFactory>));
//! let proxy = LazyInterceptor::new(Arc::clone(&core));
//! core.finish_construction();
//!
//! // identifier access never touches storage
//! let id = proxy.intercept(&Call::getter("get_id")).unwrap();
//! assert_eq!(id, Some(Value::Integer(42)));
//! assert!(!core.is_materialized());
//!
//! // the first state-bearing call loads the entity; later calls reuse it
//! let total = proxy.intercept(&Call::getter("get_total")).unwrap();
//! assert_eq!(total, Some(Value::Integer(250)));
//! assert!(core.is_materialized());
//! ```

pub mod call;
pub mod entity;
pub mod error;
pub mod identity;
pub mod interceptor;
pub mod materializer;
pub mod policy;
pub mod session;
pub mod value;

pub use call::Call;
pub use entity::{Entity, InvocationError};
pub use error::{ProxyError, ProxyResult, SessionError, TargetError};
pub use identity::{IdentifierAccessor, ProxyIdentity, TypeDescriptor};
pub use interceptor::{Intercept, LazyInterceptor};
pub use materializer::{Materializer, Resolution};
pub use policy::InterceptionPolicy;
pub use session::{Session, SessionFactory};
pub use value::{EntityKey, Value};
