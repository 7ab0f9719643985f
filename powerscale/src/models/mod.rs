//! Typed resource models and their conversions to and from state and API
//! payloads

pub mod ldap_provider;
pub mod network_settings;
pub mod s3_global_setting;
pub mod smartpool_settings;
pub mod writable_snapshot;
