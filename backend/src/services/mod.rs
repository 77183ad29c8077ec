//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the credential store and the token service.

pub mod user;

pub use user::UserService;
