// src/rpc/mod.rs

//! Line-delimited JSON-RPC surface.
//!
//! One request per line in, one response per line out. The dispatcher
//! knows exactly three methods; everything else is answered with an error
//! object and the read loop moves on to the next line.

pub mod dispatcher;
pub mod message;
pub mod server;

pub use dispatcher::{Dispatcher, TOOL_NAME};
pub use message::{Request, Response, RpcError};
pub use server::serve;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
