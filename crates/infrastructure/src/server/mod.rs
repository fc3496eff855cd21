//! Local hosting of handlers under test.

mod echo;
mod local;

pub use echo::{capture, echo_router, echo_router_with};
pub use local::{DEFAULT_SHUTDOWN_GRACE, LocalServer};
