pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod gate;
pub mod list;
pub mod mutation;
pub mod resource;
pub mod selection;

#[cfg(test)]
pub mod testing;

pub use client::{ApiClient, ApiRequest, HttpMethod, Transport};
pub use error::ClientError;
