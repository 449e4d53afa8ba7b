//! Materialization state machine
//!
//! One [`Materializer`] backs each proxy instance. It owns the proxy's
//! identity metadata and decides, per intercepted call, whether identity
//! alone can answer it; the first call that cannot be answered locally
//! triggers the one and only load of the real instance. A proxy whose bound
//! session has died reconnects through the injected session factory, and the
//! session opened for that purpose is always handed back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::call::Call;
use crate::entity::Entity;
use crate::error::ProxyResult;
use crate::identity::ProxyIdentity;
use crate::policy::InterceptionPolicy;
use crate::session::{Session, SessionFactory};
use crate::value::Value;

/// Outcome of asking the state machine about one call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
	/// Construction has not finished; no interception semantics apply.
	PassThrough,
	/// Answerable from identity metadata; the value is the call's result.
	Handled(Value),
	/// The real instance is needed to answer this call.
	RequiresMaterialization,
}

/// State machine for one proxy: identity metadata, construction gate,
/// session slot, and the at-most-once materialized target.
///
/// State progresses `Unconstructed → Constructed-Unmaterialized →
/// Constructed-Materialized`; both transitions are irreversible. The
/// identifier fields never change, even after materialization.
pub struct Materializer {
	identity: ProxyIdentity,
	policy: InterceptionPolicy,
	factory: Arc<dyn SessionFactory>,
	constructed: AtomicBool,
	session: RwLock<Option<Weak<dyn Session>>>,
	target: RwLock<Option<Arc<dyn Entity>>>,
	// serializes the first load; the materialized fast path never takes it
	init_lock: Mutex<()>,
}

impl Materializer {
	/// State machine for a proxy of `identity`, reconnecting through
	/// `factory` when no usable session is bound.
	///
	/// Starts unconstructed, with the default [`InterceptionPolicy`] and no
	/// bound session.
	pub fn new(identity: ProxyIdentity, factory: Arc<dyn SessionFactory>) -> Self {
		Self {
			identity,
			policy: InterceptionPolicy::default(),
			factory,
			constructed: AtomicBool::new(false),
			session: RwLock::new(None),
			target: RwLock::new(None),
			init_lock: Mutex::new(()),
		}
	}

	/// Replace the interception policy.
	pub fn with_policy(mut self, policy: InterceptionPolicy) -> Self {
		self.policy = policy;
		self
	}

	/// Bind the externally-supplied session this proxy was created in.
	pub fn with_session(self, session: &Arc<dyn Session>) -> Self {
		*self.session.write() = Some(Arc::downgrade(session));
		self
	}

	/// Signal that the proxy object has finished its construction phase.
	///
	/// Until this is called every intercepted call resolves to
	/// [`Resolution::PassThrough`]. Idempotent.
	pub fn finish_construction(&self) {
		self.constructed.store(true, Ordering::Release);
	}

	pub fn is_constructed(&self) -> bool {
		self.constructed.load(Ordering::Acquire)
	}

	/// Has the real instance been loaded or bound?
	pub fn is_materialized(&self) -> bool {
		self.target.read().is_some()
	}

	pub fn identity(&self) -> &ProxyIdentity {
		&self.identity
	}

	/// The proxy-local identifier value; never changes after construction.
	pub fn identifier(&self) -> &Value {
		self.identity.id()
	}

	pub fn policy(&self) -> &InterceptionPolicy {
		&self.policy
	}

	/// Rebind the weakly-held session.
	pub fn bind_session(&self, session: &Arc<dyn Session>) {
		*self.session.write() = Some(Arc::downgrade(session));
	}

	/// Detach the proxy from its session; the next materialization will
	/// reconnect through the factory.
	pub fn unbind_session(&self) {
		*self.session.write() = None;
	}

	/// Pre-bind an already-loaded instance, e.g. one the session found in
	/// its first-level cache. First bind wins; once a target exists later
	/// binds are ignored.
	pub fn bind_implementation(&self, entity: Arc<dyn Entity>) {
		let mut target = self.target.write();
		if target.is_none() {
			*target = Some(entity);
		}
	}

	/// The materialized instance, if any, without triggering a load.
	pub fn target_if_materialized(&self) -> Option<Arc<dyn Entity>> {
		self.target.read().as_ref().map(Arc::clone)
	}

	/// Decide how the given call is to be answered.
	///
	/// Pure decision logic over current state and call shape; never loads.
	pub fn resolve(&self, call: &Call) -> Resolution {
		if !self.is_constructed() {
			return Resolution::PassThrough;
		}
		match self.answer_locally(call) {
			Some(value) => Resolution::Handled(value),
			None => Resolution::RequiresMaterialization,
		}
	}

	/// Produce the real instance, loading it on first need.
	///
	/// Idempotent: once a target exists it is returned without any session
	/// activity. Concurrent first calls are serialized and observe a single
	/// load. A load failure propagates unchanged.
	pub fn materialize(&self) -> ProxyResult<Arc<dyn Entity>> {
		if let Some(target) = self.target.read().as_ref() {
			return Ok(Arc::clone(target));
		}

		let _init = self.init_lock.lock();

		// another call may have finished the load while we waited
		if let Some(target) = self.target.read().as_ref() {
			return Ok(Arc::clone(target));
		}

		let loaded = self.load_target()?;
		*self.target.write() = Some(Arc::clone(&loaded));
		tracing::debug!(
			entity = self.identity.entity_name(),
			id = %self.identity.id(),
			"proxy materialized"
		);
		Ok(loaded)
	}

	/// Identity-based answers: the call shapes enumerated by the policy.
	fn answer_locally(&self, call: &Call) -> Option<Value> {
		let identity = &self.identity;
		let accessor = identity.id_accessor();

		if call.args().is_empty() && self.policy.is_identifier_getter(call.member(), accessor) {
			return Some(identity.id().clone());
		}

		// the proxy-local identifier is frozen; a setter call must reach
		// the real instance
		if self.policy.is_identifier_setter(call.member(), accessor) {
			return None;
		}

		if self.policy.is_equality(call.member()) && call.arity() == 1 {
			if let Value::Entity(key) = &call.args()[0] {
				let same = key.entity == identity.entity_name() && *key.id == *identity.id();
				return Some(Value::Boolean(same));
			}
			// unknown right-hand shape: let the real instance decide
			return None;
		}

		if self.policy.is_hash(call.member()) && call.args().is_empty() {
			return Some(Value::Integer(identity.key().identity_hash()));
		}

		if self.policy.is_type_name(call.member()) && call.args().is_empty() {
			return Some(Value::String(identity.entity_type().name().to_string()));
		}

		if self.policy.is_instance_check(call.member()) && call.arity() == 1 {
			if let Value::String(name) = &call.args()[0] {
				return Some(Value::Boolean(name == identity.entity_type().name()));
			}
		}

		None
	}

	/// Load through the bound session if it is still usable, otherwise open
	/// a scoped session from the factory for just this load.
	fn load_target(&self) -> ProxyResult<Arc<dyn Entity>> {
		let identity = &self.identity;
		let bound = self.session.read().as_ref().and_then(Weak::upgrade);

		match bound {
			Some(session) if session.is_open() && session.is_connected() => {
				tracing::debug!(
					entity = identity.entity_name(),
					id = %identity.id(),
					"loading through the bound session"
				);
				Ok(session.load(identity.entity_name(), identity.id())?)
			}
			bound => {
				if bound.is_some() {
					tracing::warn!(
						entity = identity.entity_name(),
						"bound session is no longer usable, reconnecting"
					);
				}
				let fresh = self.factory.create_session(identity.entity_type())?;
				*self.session.write() = Some(Arc::downgrade(&fresh));
				// released on every exit path, load success or not
				let fresh = scopeguard::guard(fresh, |session| {
					self.factory.release_session(session);
				});
				tracing::debug!(
					entity = identity.entity_name(),
					id = %identity.id(),
					"loading through a fresh session"
				);
				Ok(fresh.load(identity.entity_name(), identity.id())?)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::AtomicUsize;

	use super::*;
	use crate::entity::InvocationError;
	use crate::error::{ProxyError, SessionError};
	use crate::identity::{IdentifierAccessor, TypeDescriptor};
	use crate::value::EntityKey;

	struct Order {
		total: i64,
	}

	impl Entity for Order {
		fn entity_name(&self) -> &str {
			"Order"
		}

		fn invoke(&self, call: &Call) -> Result<Value, InvocationError> {
			match call.member() {
				"get_total" => Ok(Value::Integer(self.total)),
				member => Err(InvocationError::unknown_member("Order", member)),
			}
		}
	}

	struct StubSession {
		open: bool,
		connected: bool,
		loads: AtomicUsize,
		fail: bool,
	}

	impl StubSession {
		fn live() -> Self {
			Self {
				open: true,
				connected: true,
				loads: AtomicUsize::new(0),
				fail: false,
			}
		}

		fn dead() -> Self {
			Self {
				open: false,
				connected: false,
				loads: AtomicUsize::new(0),
				fail: false,
			}
		}
	}

	impl Session for StubSession {
		fn is_open(&self) -> bool {
			self.open
		}

		fn is_connected(&self) -> bool {
			self.connected
		}

		fn load(&self, entity_name: &str, _id: &Value) -> Result<Arc<dyn Entity>, SessionError> {
			self.loads.fetch_add(1, Ordering::SeqCst);
			if self.fail {
				return Err(SessionError::Storage("disk gone".to_string()));
			}
			assert_eq!(entity_name, "Order");
			Ok(Arc::new(Order { total: 100 }))
		}
	}

	#[derive(Default)]
	struct StubFactory {
		created: AtomicUsize,
		released: AtomicUsize,
		fail_loads: bool,
	}

	impl SessionFactory for StubFactory {
		fn create_session(
			&self,
			_entity_type: &TypeDescriptor,
		) -> Result<Arc<dyn Session>, SessionError> {
			self.created.fetch_add(1, Ordering::SeqCst);
			Ok(Arc::new(StubSession {
				fail: self.fail_loads,
				..StubSession::live()
			}))
		}

		fn release_session(&self, _session: Arc<dyn Session>) {
			self.released.fetch_add(1, Ordering::SeqCst);
		}
	}

	fn order_identity() -> ProxyIdentity {
		ProxyIdentity::new("Order", TypeDescriptor::new("Order"), 42i64)
			.with_id_accessor(IdentifierAccessor::conventional("get_id", "set_id"))
	}

	fn constructed(factory: &Arc<StubFactory>) -> Materializer {
		let materializer =
			Materializer::new(order_identity(), Arc::clone(factory) as Arc<dyn SessionFactory>);
		materializer.finish_construction();
		materializer
	}

	#[test]
	fn test_unconstructed_resolves_to_pass_through() {
		let factory = Arc::new(StubFactory::default());
		let materializer =
			Materializer::new(order_identity(), factory as Arc<dyn SessionFactory>);

		assert_eq!(
			materializer.resolve(&Call::getter("get_total")),
			Resolution::PassThrough
		);
		assert!(!materializer.is_constructed());
	}

	#[test]
	fn test_identifier_getter_is_handled_locally() {
		let factory = Arc::new(StubFactory::default());
		let materializer = constructed(&factory);

		assert_eq!(
			materializer.resolve(&Call::getter("get_id")),
			Resolution::Handled(Value::Integer(42))
		);
		assert!(!materializer.is_materialized());
	}

	#[test]
	fn test_identifier_setter_requires_materialization() {
		let factory = Arc::new(StubFactory::default());
		let materializer = constructed(&factory);

		assert_eq!(
			materializer.resolve(&Call::setter("set_id", 7i64)),
			Resolution::RequiresMaterialization
		);
	}

	#[test]
	fn test_equality_against_entity_key_is_handled() {
		let factory = Arc::new(StubFactory::default());
		let materializer = constructed(&factory);

		let same = Call::method("eq", vec![Value::Entity(EntityKey::new("Order", 42i64))]);
		assert_eq!(
			materializer.resolve(&same),
			Resolution::Handled(Value::Boolean(true))
		);

		let other = Call::method("eq", vec![Value::Entity(EntityKey::new("Order", 7i64))]);
		assert_eq!(
			materializer.resolve(&other),
			Resolution::Handled(Value::Boolean(false))
		);

		// a non-entity right-hand side defers to the real instance
		let odd = Call::method("eq", vec![Value::Integer(42)]);
		assert_eq!(materializer.resolve(&odd), Resolution::RequiresMaterialization);
	}

	#[test]
	fn test_type_rules_are_handled_locally() {
		let factory = Arc::new(StubFactory::default());
		let materializer = constructed(&factory);

		assert_eq!(
			materializer.resolve(&Call::getter("type_name")),
			Resolution::Handled(Value::String("Order".to_string()))
		);
		assert_eq!(
			materializer.resolve(&Call::method("is_instance_of", vec![Value::from("Order")])),
			Resolution::Handled(Value::Boolean(true))
		);
		assert_eq!(
			materializer.resolve(&Call::method("is_instance_of", vec![Value::from("Invoice")])),
			Resolution::Handled(Value::Boolean(false))
		);
	}

	#[test]
	fn test_materialize_loads_once_and_caches() {
		let factory = Arc::new(StubFactory::default());
		let materializer = constructed(&factory);
		assert!(materializer.target_if_materialized().is_none());

		let first = materializer.materialize().unwrap();
		let second = materializer.materialize().unwrap();

		assert!(Arc::ptr_eq(&first, &second));
		assert!(materializer.is_materialized());
		assert!(materializer.target_if_materialized().is_some());
		assert_eq!(factory.created.load(Ordering::SeqCst), 1);
		assert_eq!(factory.released.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_live_bound_session_is_used_without_factory_activity() {
		let factory = Arc::new(StubFactory::default());
		let session = Arc::new(StubSession::live());
		let materializer = Materializer::new(
			order_identity(),
			Arc::clone(&factory) as Arc<dyn SessionFactory>,
		)
		.with_session(&(Arc::clone(&session) as Arc<dyn Session>));
		materializer.finish_construction();

		materializer.materialize().unwrap();

		assert_eq!(session.loads.load(Ordering::SeqCst), 1);
		assert_eq!(factory.created.load(Ordering::SeqCst), 0);
		assert_eq!(factory.released.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_dead_bound_session_forces_reconnect_and_release() {
		let factory = Arc::new(StubFactory::default());
		let session = Arc::new(StubSession::dead());
		let materializer = Materializer::new(
			order_identity(),
			Arc::clone(&factory) as Arc<dyn SessionFactory>,
		)
		.with_session(&(Arc::clone(&session) as Arc<dyn Session>));
		materializer.finish_construction();

		materializer.materialize().unwrap();

		// the dead session is never asked to load, and never released
		assert_eq!(session.loads.load(Ordering::SeqCst), 0);
		assert_eq!(factory.created.load(Ordering::SeqCst), 1);
		assert_eq!(factory.released.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_failed_load_still_releases_the_fresh_session() {
		let factory = Arc::new(StubFactory {
			fail_loads: true,
			..StubFactory::default()
		});
		let materializer = constructed(&factory);

		let err = match materializer.materialize() {
			Ok(_) => panic!("expected materialization to fail"),
			Err(e) => e,
		};
		assert!(matches!(
			err,
			ProxyError::Session(SessionError::Storage(_))
		));
		assert!(!materializer.is_materialized());
		assert_eq!(factory.created.load(Ordering::SeqCst), 1);
		assert_eq!(factory.released.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn test_bind_implementation_wins_only_once() {
		let factory = Arc::new(StubFactory::default());
		let materializer = constructed(&factory);

		let first: Arc<dyn Entity> = Arc::new(Order { total: 1 });
		let second: Arc<dyn Entity> = Arc::new(Order { total: 2 });
		materializer.bind_implementation(Arc::clone(&first));
		materializer.bind_implementation(second);

		let target = materializer.materialize().unwrap();
		assert!(Arc::ptr_eq(&target, &first));
		assert_eq!(factory.created.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_unbind_session_reconnects_through_factory() {
		let factory = Arc::new(StubFactory::default());
		let session = Arc::new(StubSession::live());
		let materializer = Materializer::new(
			order_identity(),
			Arc::clone(&factory) as Arc<dyn SessionFactory>,
		)
		.with_session(&(Arc::clone(&session) as Arc<dyn Session>));
		materializer.finish_construction();
		materializer.unbind_session();

		materializer.materialize().unwrap();

		assert_eq!(session.loads.load(Ordering::SeqCst), 0);
		assert_eq!(factory.created.load(Ordering::SeqCst), 1);
	}
}
