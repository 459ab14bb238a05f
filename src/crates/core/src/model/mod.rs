//! Application model
//!
//! Applications, intents, parameters and data types as the host builds them.
//! The core only reads this model: it derives the registration document from
//! it and dispatches invocations to the intent behaviors.

pub mod application;
pub mod context;
pub mod data_type;
pub mod intent;

pub use application::{handler_key, Application};
pub use context::{ClientApi, InvocationContext, DEFAULT_LANG};
pub use data_type::{DataType, DataTypeKind};
pub use intent::{FnBehavior, Intent, IntentArgs, IntentBehavior, IntentBuilder, Parameter};
