pub mod config;
pub mod error;
pub mod indexer;
pub mod server;
pub mod tools;
pub mod vfs;
pub mod workspace;
