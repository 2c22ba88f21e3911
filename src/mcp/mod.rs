pub mod handlers;
pub mod sampler;
pub mod schema;
pub mod server;
pub mod tools;

pub use server::MockToolServer;
