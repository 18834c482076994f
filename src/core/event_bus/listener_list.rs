//=========================================================================
// Listener List Trait
//=========================================================================
//
// Type-erased trait for per-event listener lists that preserves Vec
// operations while allowing storage in a HashMap without concrete type
// knowledge.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::sync::Arc;

//=== Internal Dependencies ===============================================

use super::{Event, EventListener};

//=========================================================================

/// Ordered listener list for a single event type.
pub(super) type Listeners<E> = Vec<Arc<dyn EventListener<E>>>;

/// Type-erased trait for listener list storage.
///
/// Allows the bus to count and clear lists without knowing the concrete
/// event type at compile time.
pub(super) trait ListenerList: Send + Sync {
    /// Returns the number of registered listeners.
    fn len(&self) -> usize;

    /// Returns true if no listener is registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Downcasts to `&dyn Any` for type-specific operations.
    fn as_any(&self) -> &dyn Any;

    /// Downcasts to `&mut dyn Any` for type-specific operations.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

//=========================================================================

impl<E: Event> ListenerList for Listeners<E> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//=== Identity ============================================================

/// Compares two listeners by the address of their shared allocation.
///
/// Vtable pointers are ignored: the same allocation can be reached through
/// different vtables across codegen units.
pub(super) fn same_listener<E>(a: &Arc<dyn EventListener<E>>, b: &Arc<dyn EventListener<E>>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Ping;

    #[test]
    fn len_and_is_empty_work() {
        let mut list: Listeners<Ping> = Vec::new();

        {
            let erased: &dyn ListenerList = &list;
            assert!(erased.is_empty());
            assert_eq!(erased.len(), 0);
        }

        list.push(Arc::new(|_: &Ping| {}));

        let erased: &dyn ListenerList = &list;
        assert!(!erased.is_empty());
        assert_eq!(erased.len(), 1);
    }

    #[test]
    fn downcast_recovers_concrete_list() {
        let mut list: Listeners<Ping> = Vec::new();
        list.push(Arc::new(|_: &Ping| {}));

        let erased: &mut dyn ListenerList = &mut list;
        let concrete = erased.as_any_mut().downcast_mut::<Listeners<Ping>>();
        assert!(concrete.is_some());
        assert_eq!(concrete.map(|l| l.len()), Some(1));
    }

    #[test]
    fn identity_follows_allocation_not_behavior() {
        let a: Arc<dyn EventListener<Ping>> = Arc::new(|_: &Ping| {});
        let b: Arc<dyn EventListener<Ping>> = Arc::new(|_: &Ping| {});
        let a_again = Arc::clone(&a);

        assert!(same_listener(&a, &a_again));
        assert!(!same_listener(&a, &b));
    }
}
