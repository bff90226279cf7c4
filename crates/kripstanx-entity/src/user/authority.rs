//! Authority (role) names.

/// Administrator.
pub const ADMIN: &str = "ROLE_ADMIN";

/// Regular user.
pub const USER: &str = "ROLE_USER";

/// Unauthenticated caller.
pub const ANONYMOUS: &str = "ROLE_ANONYMOUS";

/// May write while the system runs in restricted mode.
pub const TECHNICAL: &str = "ROLE_TECHNICAL";

/// Database administrator.
pub const DBA: &str = "ROLE_DBA";
