pub mod errors;

pub use errors::{IntentLinkError, IntentLinkResult};
