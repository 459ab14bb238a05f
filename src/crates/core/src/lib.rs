// IntentLink Core Library - intent registration and invocation protocol
// Three-layer architecture: Util -> Model -> Service

pub mod model; // Model layer - Applications, intents, data types, client API
pub mod service; // Service layer - Config, Schema, RPC, Session
pub mod util; // Utility layer - Errors

// Export main types
pub use util::errors::*;

pub use model::{
    Application, ClientApi, DataType, DataTypeKind, Intent, IntentArgs, IntentBehavior,
    InvocationContext, Parameter,
};

pub use service::{
    config::CoreConfig,
    rpc::{CallHandler, CallRouter, Connector, RpcConnection, WebSocketConnector},
    schema::{build_registration_document, RegistrationDocument},
    session::{InvocationRequest, InvocationResponse, Session, SessionState},
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
