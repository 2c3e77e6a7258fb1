// reportly-api: async Rust client for REST reporting resources

pub mod client;
pub mod error;
pub mod resource;
pub mod transport;

pub use client::ResourceClient;
pub use error::Error;
pub use resource::{RecordId, Resource};
pub use transport::{TlsMode, TransportConfig};
