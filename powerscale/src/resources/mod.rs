//! Resource implementations

pub mod ldap_provider;
pub mod s3_global_setting;
pub mod smartpool_settings;
pub mod writable_snapshot;

pub use ldap_provider::LdapProviderResource;
pub use s3_global_setting::S3GlobalSettingResource;
pub use smartpool_settings::SmartpoolSettingsResource;
pub use writable_snapshot::WritableSnapshotResource;
