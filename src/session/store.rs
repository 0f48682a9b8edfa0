//! Durable storage for the session token.
//!
//! Mirrors the synchronous `localStorage` semantics the session lifecycle
//! relies on: the token must be persisted before any network call so a reload
//! mid-flow never loses the credential. The production store (the identity
//! cookie) lives in `front/`; this module stays framework-free so the manager
//! can be tested without a web stack.

#[cfg(test)]
use std::{cell::RefCell, rc::Rc};

#[cfg_attr(test, mockall::automock)]
pub trait TokenStore {
    fn load(&self) -> Option<String>;

    fn save(&self, token: &str);

    fn clear(&self);
}

pub type ImplTokenStore = Box<dyn TokenStore>;

/// In-memory store. Clones share the same slot, which lets tests hand the
/// same "storage" to two managers to simulate a page reload.
#[cfg(test)]
#[derive(Default, Clone)]
pub struct MemoryTokenStore {
    slot: Rc<RefCell<Option<String>>>,
}

#[cfg(test)]
impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    fn save(&self, token: &str) {
        *self.slot.borrow_mut() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_clones_share_the_same_slot() {
        let store = MemoryTokenStore::default();
        let reloaded = store.clone();

        store.save("tok");
        assert_eq!(reloaded.load().as_deref(), Some("tok"));

        reloaded.clear();
        assert!(store.load().is_none());
    }
}
