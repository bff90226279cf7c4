//! Account lockout policy applied at login time.

pub mod login;

pub use login::LoginGuard;
