pub mod network_settings;
pub mod smartpool_settings;

pub use network_settings::NetworkSettingsDataSource;
pub use smartpool_settings::SmartpoolSettingsDataSource;
