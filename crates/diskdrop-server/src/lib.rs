pub mod config;
pub mod connection;
pub mod error;
pub mod lobby;
pub mod registry;
pub mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::Server;
