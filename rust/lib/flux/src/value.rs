use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A type-erased, shared state value.
///
/// Readers get an `Arc` clone; the state itself is never copied until a
/// caller asks for an owned value with [`StateValue::cloned`].
#[derive(Clone)]
pub struct StateValue {
    inner: Arc<dyn Any + Send + Sync>,
}

impl StateValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Borrow the value as `T`, or `None` if it holds another type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Clone the value out as `T`.
    pub fn cloned<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    pub fn type_id(&self) -> TypeId {
        (*self.inner).type_id()
    }

    /// Strong reference count of the shared value.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl fmt::Debug for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateValue")
            .field("type_id", &(*self.inner).type_id())
            .finish()
    }
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Session {
        user: Option<String>,
        initialized: bool,
    }

    #[test]
    fn downcast_matching_type() {
        let v = StateValue::new(Session {
            user: Some("u1".into()),
            initialized: true,
        });
        let s = v.downcast_ref::<Session>().unwrap();
        assert_eq!(s.user.as_deref(), Some("u1"));
        assert!(v.is::<Session>());
    }

    #[test]
    fn downcast_other_type_is_none() {
        let v = StateValue::new(7u32);
        assert!(v.downcast_ref::<Session>().is_none());
        assert!(v.cloned::<String>().is_none());
    }

    #[test]
    fn cloned_returns_owned_copy() {
        let v = StateValue::new(Session {
            user: None,
            initialized: false,
        });
        let mut owned = v.cloned::<Session>().unwrap();
        owned.initialized = true;
        assert!(!v.downcast_ref::<Session>().unwrap().initialized);
    }

    #[test]
    fn clone_shares_allocation() {
        let v = StateValue::new(vec![1u8; 64]);
        let w = v.clone();
        assert_eq!(v.ref_count(), 2);
        drop(w);
        assert_eq!(v.ref_count(), 1);
    }

    #[test]
    fn type_id_reports_inner_type() {
        let v = StateValue::new(String::from("feed"));
        assert_eq!(v.type_id(), TypeId::of::<String>());
    }
}
