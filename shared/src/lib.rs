//! Fruit Pilot Shared Library
//!
//! Wire types, error taxonomy and input validation shared by the auth
//! backend and its tests.

pub mod errors;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
