//! ttlkv daemon internals: the two front ends over one shared store

pub mod frame;
pub mod handler;
pub mod http;
pub mod rpc;

pub use handler::CommandHandler;
