//! Session and navigation seams
//!
//! The dialog never touches credentials or the browser directly; the host
//! supplies these two implementations.

/// Login entry point the user is sent to when the session dies
pub const LOGIN_ROUTE: &str = "/login";

/// Owner of the local session
pub trait SessionManager: Send + Sync {
    /// Drop the local session and send the user to `route`
    fn reset_and_redirect(&self, route: &str);
}

/// Moves the user to an external page (e.g. hosted checkout)
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}
