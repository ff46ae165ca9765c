//! Persistence layer for the greeting collection.
//!
//! The whole collection is the unit of read and write: there is no partial load
//! and no partial save.

mod json_file;
#[cfg(test)]
mod memory;

pub use json_file::*;
#[cfg(test)]
pub use memory::*;

use crate::errors::AppError;
use crate::models::Greeting;

/// Durable storage for the ordered greeting collection.
pub trait GreetingStore: Send + Sync {
    /// Read the full collection.
    fn load(&self) -> Result<Vec<Greeting>, AppError>;

    /// Replace the stored collection. On failure the previous content is left intact.
    fn save(&self, greetings: &[Greeting]) -> Result<(), AppError>;
}
