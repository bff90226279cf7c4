//! User records, their embedded session state, and authority names.

pub mod authority;
pub mod model;
pub mod session;

pub use model::UserRecord;
pub use session::UserSessionState;
