use crate::api::network::NetworkExternalSettings;
use crate::mapper::{write_field, Field, MappingError};
use tfplug::types::DynamicValue;

pub const NETWORK_SETTINGS_ID: &str = "network_settings";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkSettingsModel {
    pub id: Field<String>,
    pub default_groupnet: Field<String>,
    pub source_based_routing_enabled: Field<bool>,
    pub sc_rebalance_delay: Field<i64>,
    pub tcp_ports: Field<Vec<i64>>,
}

impl NetworkSettingsModel {
    pub fn from_api(settings: &NetworkExternalSettings) -> Self {
        Self {
            id: Field::Set(NETWORK_SETTINGS_ID.to_string()),
            default_groupnet: Field::from_option(settings.default_groupnet.clone()),
            source_based_routing_enabled: Field::from_option(settings.sbr),
            sc_rebalance_delay: Field::from_option(settings.sc_rebalance_delay),
            tcp_ports: Field::from_option(settings.tcp_ports.clone()),
        }
    }

    pub fn to_state(&self) -> Result<DynamicValue, MappingError> {
        let mut state = DynamicValue::object();
        write_field(&mut state, "id", &self.id)?;
        write_field(&mut state, "default_groupnet", &self.default_groupnet)?;
        write_field(
            &mut state,
            "source_based_routing_enabled",
            &self.source_based_routing_enabled,
        )?;
        write_field(&mut state, "sc_rebalance_delay", &self.sc_rebalance_delay)?;
        write_field(&mut state, "tcp_ports", &self.tcp_ports)?;
        Ok(state)
    }
}
