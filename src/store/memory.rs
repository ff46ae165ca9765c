//! In-memory store for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::GreetingStore;
use crate::errors::AppError;
use crate::models::Greeting;

#[derive(Debug, Default)]
pub struct MemoryStore {
    greetings: Mutex<Vec<Greeting>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_greetings(greetings: Vec<Greeting>) -> Self {
        Self {
            greetings: Mutex::new(greetings),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `save` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<Greeting> {
        self.greetings.lock().clone()
    }
}

impl GreetingStore for MemoryStore {
    fn load(&self) -> Result<Vec<Greeting>, AppError> {
        Ok(self.greetings.lock().clone())
    }

    fn save(&self, greetings: &[Greeting]) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::StorageWrite("simulated write failure".to_string()));
        }
        *self.greetings.lock() = greetings.to_vec();
        Ok(())
    }
}
