pub mod message;
pub mod event;
pub mod action;
pub mod config;
pub mod error;


pub use error::OpsError;
pub type Result<T> = std::result::Result<T, OpsError>;
