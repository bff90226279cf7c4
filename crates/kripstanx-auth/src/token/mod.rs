//! Signed session tokens.

pub mod claims;
pub mod codec;

pub use claims::TokenClaims;
pub use codec::TokenCodec;
