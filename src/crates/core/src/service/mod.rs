pub mod config;
pub mod rpc;
pub mod schema;
pub mod session;
