pub mod auth;
pub mod client;
pub mod cluster;
pub mod common;
pub mod error;
pub mod network;
pub mod protocols;
pub mod snapshot;
pub mod storagepool;

pub use client::{Client, ClientConfig};
pub use common::ApiQueryParams;
pub use error::ApiError;
