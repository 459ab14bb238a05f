//! Session with the core
//!
//! A session owns one connection to the core: it registers every application,
//! installs one dispatcher per intent and then serves invocations until it is
//! stopped.

pub mod dispatcher;
pub mod lifecycle;
pub mod types;

pub use dispatcher::IntentDispatcher;
pub use lifecycle::Session;
pub use types::*;
