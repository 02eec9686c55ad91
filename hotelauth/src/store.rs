use parking_lot::Mutex;
use std::ops::Deref;
use std::sync::Arc;

//--------------------------------------------------------------------------------------------------
// Persistent slot holding the current token
//--------------------------------------------------------------------------------------------------

/// A single persisted token slot. The host supplies the storage; last write wins.
pub trait TokenStore {
    fn get(&self) -> Option<String>;
    fn set(&self, token: String);
    fn remove(&self);
}

impl<T: TokenStore> TokenStore for Arc<T> {
    fn get(&self) -> Option<String> {
        self.deref().get()
    }

    fn set(&self, token: String) {
        self.deref().set(token)
    }

    fn remove(&self) {
        self.deref().remove()
    }
}

//--------------------------------------------------------------------------------------------------
// In-memory store
//--------------------------------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.slot.lock().clone()
    }

    fn set(&self, token: String) {
        *self.slot.lock() = Some(token);
    }

    fn remove(&self) {
        self.slot.lock().take();
    }
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
