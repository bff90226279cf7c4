//! # kripstanx-auth
//!
//! Authentication and session management for KripStanx.
//!
//! ## Modules
//!
//! - `token`: signed session token issue and verification
//! - `session`: per-user token rotation with a grace window, invalidation, sweep
//! - `guard`: inactivity and failed-attempt account lockout
//! - `password`: Argon2id hashing and the credential check
//! - `login`: the login flow tying the above together
//! - `seed`: accounts created at startup

pub mod guard;
pub mod login;
pub mod password;
pub mod principal;
pub mod seed;
pub mod session;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

pub use guard::LoginGuard;
pub use login::{LoginManager, LoginOutcome};
pub use password::{Authenticator, PasswordHasher};
pub use principal::Principal;
pub use seed::provision_seed_users;
pub use session::{SessionService, UserSessionStore};
pub use token::{TokenClaims, TokenCodec};
