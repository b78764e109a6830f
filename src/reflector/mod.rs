/// Reflector facades.
///
/// A reflector turns a name into a reflection by asking its source locator.
/// Locators answer "not found" with `Ok(None)`; the facade is the one place
/// that turns that into [`Error::IdentifierNotFound`](crate::error::Error).
mod class;
mod constant;
mod function;

use std::sync::atomic::{AtomicU64, Ordering};

pub use class::ClassReflector;
pub use constant::ConstantReflector;
pub use function::FunctionReflector;

/// Process-unique identity of a reflector instance, used to key caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReflectorId(u64);

impl ReflectorId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ReflectorId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The reflector a lookup is performed for. Passed down through locators
/// so reflections can resolve further symbols and caches can tell callers
/// apart.
pub trait Reflector: Send + Sync {
    fn id(&self) -> ReflectorId;
}
