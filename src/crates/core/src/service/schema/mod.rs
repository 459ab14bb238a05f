//! Registration schema
//!
//! Builds the document an application registers with the core: its intents
//! with sample phrases and typed slots, and the expanded value list of every
//! finite data type the slots use.

pub mod generator;
pub mod types;

pub use generator::build_registration_document;
pub use types::*;
