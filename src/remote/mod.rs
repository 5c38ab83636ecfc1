//! Remote module - Single-shot remote evolution over TCP.
//!
//! A client hands an entire multi-turn run to the server in one
//! request/response exchange: one connection, one call, no streaming.
//! Any transport failure is fatal to the run; nothing is retried.

mod client;
mod protocol;
mod server;

pub use client::*;
pub use protocol::*;
pub use server::*;
