//! tfplug - Terraform Plugin Framework for Rust
//!
//! The trait layer of a Terraform provider: providers, resources and data
//! sources exchange [`DynamicValue`]s and [`types::Diagnostic`]s through
//! async request/response methods. Transport is left to the embedding binary.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod plan_modifier;
pub mod validator;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use provider::{Provider, ProviderMetadataRequest, ProviderMetadataResponse};
pub use resource::{
    Resource, ResourceWithConfigure, ResourceWithImportState, ResourceWithModifyPlan,
};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{Dynamic, DynamicValue};
