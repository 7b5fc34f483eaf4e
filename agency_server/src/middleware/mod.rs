mod session_guard;

pub use session_guard::{SessionGuardFactory, SessionGuardService};
