//! Helpers shared by the integration tests: run a router on an ephemeral
//! port and talk to it over HTTP.

pub mod client;
pub mod server;

pub use client::McpClient;
pub use server::TestServer;
