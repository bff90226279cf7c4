//! Password hashing and the credential check.

pub mod authenticator;
pub mod hasher;

pub use authenticator::Authenticator;
pub use hasher::PasswordHasher;
