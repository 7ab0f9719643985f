//! SmartPools settings
//!
//! The appliance expresses automatic management of I/O optimization and
//! protection as one of `none`, `files_at_default` or `all`; the Terraform
//! model splits each into a "manage" flag and an "apply to files" flag.

use crate::api::storagepool::{
    SpilloverTarget, SpilloverTargetUpdate, StoragepoolSettings, StoragepoolSettingsUpdate,
    TransferLimitUpdate,
};
use crate::error::PowerscaleError;
use crate::mapper::{read_field, read_object, write_field, write_object, Field, MappingError};
use crate::version::{require, OnefsVersion, StoragepoolApi, ONEFS_9_5};
use tfplug::types::DynamicValue;

pub const SMARTPOOL_SETTINGS_ID: &str = "smartpool_settings";

pub const MANAGE_NONE: &str = "none";
pub const MANAGE_FILES_AT_DEFAULT: &str = "files_at_default";
pub const MANAGE_ALL: &str = "all";

/// `(manage, apply_to_files)` for an appliance value
pub fn management_flags(attribute: &str, value: &str) -> Result<(bool, bool), MappingError> {
    match value {
        MANAGE_NONE => Ok((false, false)),
        MANAGE_FILES_AT_DEFAULT => Ok((true, false)),
        MANAGE_ALL => Ok((true, true)),
        other => Err(MappingError::UnexpectedValue {
            attribute: attribute.to_string(),
            value: other.to_string(),
        }),
    }
}

pub fn management_value(manage: bool, apply_to_files: bool) -> &'static str {
    match (manage, apply_to_files) {
        (false, _) => MANAGE_NONE,
        (true, false) => MANAGE_FILES_AT_DEFAULT,
        (true, true) => MANAGE_ALL,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpilloverTargetModel {
    pub id: Field<i64>,
    pub name: Field<String>,
    pub target_type: Field<String>,
}

impl SpilloverTargetModel {
    fn from_value(value: &DynamicValue) -> Result<Self, MappingError> {
        Ok(Self {
            id: read_field(value, "id")?,
            name: read_field(value, "name")?,
            target_type: read_field(value, "type")?,
        })
    }

    fn to_value(&self) -> Result<DynamicValue, MappingError> {
        let mut value = DynamicValue::object();
        write_field(&mut value, "id", &self.id)?;
        write_field(&mut value, "name", &self.name)?;
        write_field(&mut value, "type", &self.target_type)?;
        Ok(value)
    }

    fn from_api(target: &SpilloverTarget) -> Self {
        Self {
            id: Field::from_option(target.id),
            name: Field::from_option(target.name.clone()),
            target_type: Field::from_option(target.target_type.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SmartpoolSettingsModel {
    pub default_transfer_limit_pct: Field<f64>,
    pub default_transfer_limit_state: Field<String>,
    pub global_namespace_acceleration_enabled: Field<bool>,
    pub global_namespace_acceleration_state: Field<String>,
    pub manage_io_optimization: Field<bool>,
    pub manage_io_optimization_apply_to_files: Field<bool>,
    pub manage_protection: Field<bool>,
    pub manage_protection_apply_to_files: Field<bool>,
    pub protect_directories_one_level_higher: Field<bool>,
    pub spillover_enabled: Field<bool>,
    pub spillover_target: Field<SpilloverTargetModel>,
    pub ssd_l3_cache_default_enabled: Field<bool>,
    pub ssd_qab_mirrors: Field<String>,
    pub ssd_system_btree_mirrors: Field<String>,
    pub ssd_system_delta_mirrors: Field<String>,
    pub virtual_hot_spare_deny_writes: Field<bool>,
    pub virtual_hot_spare_hide_spare: Field<bool>,
    pub virtual_hot_spare_limit_drives: Field<i64>,
    pub virtual_hot_spare_limit_percent: Field<i64>,
}

impl SmartpoolSettingsModel {
    pub fn from_state(value: &DynamicValue) -> Result<Self, MappingError> {
        let spillover_target = match read_object(value, "spillover_target")? {
            Field::Set(target) => Field::Set(SpilloverTargetModel::from_value(&target)?),
            Field::Null => Field::Null,
            Field::Unknown => Field::Unknown,
        };

        Ok(Self {
            default_transfer_limit_pct: read_field(value, "default_transfer_limit_pct")?,
            default_transfer_limit_state: read_field(value, "default_transfer_limit_state")?,
            global_namespace_acceleration_enabled: read_field(
                value,
                "global_namespace_acceleration_enabled",
            )?,
            global_namespace_acceleration_state: read_field(
                value,
                "global_namespace_acceleration_state",
            )?,
            manage_io_optimization: read_field(value, "manage_io_optimization")?,
            manage_io_optimization_apply_to_files: read_field(
                value,
                "manage_io_optimization_apply_to_files",
            )?,
            manage_protection: read_field(value, "manage_protection")?,
            manage_protection_apply_to_files: read_field(value, "manage_protection_apply_to_files")?,
            protect_directories_one_level_higher: read_field(
                value,
                "protect_directories_one_level_higher",
            )?,
            spillover_enabled: read_field(value, "spillover_enabled")?,
            spillover_target,
            ssd_l3_cache_default_enabled: read_field(value, "ssd_l3_cache_default_enabled")?,
            ssd_qab_mirrors: read_field(value, "ssd_qab_mirrors")?,
            ssd_system_btree_mirrors: read_field(value, "ssd_system_btree_mirrors")?,
            ssd_system_delta_mirrors: read_field(value, "ssd_system_delta_mirrors")?,
            virtual_hot_spare_deny_writes: read_field(value, "virtual_hot_spare_deny_writes")?,
            virtual_hot_spare_hide_spare: read_field(value, "virtual_hot_spare_hide_spare")?,
            virtual_hot_spare_limit_drives: read_field(value, "virtual_hot_spare_limit_drives")?,
            virtual_hot_spare_limit_percent: read_field(value, "virtual_hot_spare_limit_percent")?,
        })
    }

    /// Writes every attribute into `object`, leaving other attributes alone
    pub fn write_to(&self, object: &mut DynamicValue) -> Result<(), MappingError> {
        write_field(object, "default_transfer_limit_pct", &self.default_transfer_limit_pct)?;
        write_field(object, "default_transfer_limit_state", &self.default_transfer_limit_state)?;
        write_field(
            object,
            "global_namespace_acceleration_enabled",
            &self.global_namespace_acceleration_enabled,
        )?;
        write_field(
            object,
            "global_namespace_acceleration_state",
            &self.global_namespace_acceleration_state,
        )?;
        write_field(object, "manage_io_optimization", &self.manage_io_optimization)?;
        write_field(
            object,
            "manage_io_optimization_apply_to_files",
            &self.manage_io_optimization_apply_to_files,
        )?;
        write_field(object, "manage_protection", &self.manage_protection)?;
        write_field(
            object,
            "manage_protection_apply_to_files",
            &self.manage_protection_apply_to_files,
        )?;
        write_field(
            object,
            "protect_directories_one_level_higher",
            &self.protect_directories_one_level_higher,
        )?;
        write_field(object, "spillover_enabled", &self.spillover_enabled)?;
        let target = match &self.spillover_target {
            Field::Set(target) => Field::Set(target.to_value()?),
            Field::Null => Field::Null,
            Field::Unknown => Field::Unknown,
        };
        write_object(object, "spillover_target", target)?;
        write_field(object, "ssd_l3_cache_default_enabled", &self.ssd_l3_cache_default_enabled)?;
        write_field(object, "ssd_qab_mirrors", &self.ssd_qab_mirrors)?;
        write_field(object, "ssd_system_btree_mirrors", &self.ssd_system_btree_mirrors)?;
        write_field(object, "ssd_system_delta_mirrors", &self.ssd_system_delta_mirrors)?;
        write_field(object, "virtual_hot_spare_deny_writes", &self.virtual_hot_spare_deny_writes)?;
        write_field(object, "virtual_hot_spare_hide_spare", &self.virtual_hot_spare_hide_spare)?;
        write_field(object, "virtual_hot_spare_limit_drives", &self.virtual_hot_spare_limit_drives)?;
        write_field(
            object,
            "virtual_hot_spare_limit_percent",
            &self.virtual_hot_spare_limit_percent,
        )?;
        Ok(())
    }

    pub fn from_api(settings: &StoragepoolSettings, api: StoragepoolApi) -> Result<Self, MappingError> {
        let (manage_io, io_files) = split_management(
            "automatically_manage_io_optimization",
            settings.automatically_manage_io_optimization.as_deref(),
        )?;
        let (manage_protection, protection_files) = split_management(
            "automatically_manage_protection",
            settings.automatically_manage_protection.as_deref(),
        )?;

        let (transfer_pct, transfer_state) = if api.supports_transfer_limits() {
            (
                Field::from_option(settings.default_transfer_limit_pct),
                Field::from_option(settings.default_transfer_limit_state.clone()),
            )
        } else {
            (Field::Null, Field::Null)
        };

        Ok(Self {
            default_transfer_limit_pct: transfer_pct,
            default_transfer_limit_state: transfer_state,
            global_namespace_acceleration_enabled: Field::from_option(
                settings.global_namespace_acceleration_enabled,
            ),
            global_namespace_acceleration_state: Field::from_option(
                settings.global_namespace_acceleration_state.clone(),
            ),
            manage_io_optimization: manage_io,
            manage_io_optimization_apply_to_files: io_files,
            manage_protection,
            manage_protection_apply_to_files: protection_files,
            protect_directories_one_level_higher: Field::from_option(
                settings.protect_directories_one_level_higher,
            ),
            spillover_enabled: Field::from_option(settings.spillover_enabled),
            spillover_target: Field::from_option(
                settings
                    .spillover_target
                    .as_ref()
                    .map(SpilloverTargetModel::from_api),
            ),
            ssd_l3_cache_default_enabled: Field::from_option(settings.ssd_l3_cache_default_enabled),
            ssd_qab_mirrors: Field::from_option(settings.ssd_qab_mirrors.clone()),
            ssd_system_btree_mirrors: Field::from_option(settings.ssd_system_btree_mirrors.clone()),
            ssd_system_delta_mirrors: Field::from_option(settings.ssd_system_delta_mirrors.clone()),
            virtual_hot_spare_deny_writes: Field::from_option(settings.virtual_hot_spare_deny_writes),
            virtual_hot_spare_hide_spare: Field::from_option(settings.virtual_hot_spare_hide_spare),
            virtual_hot_spare_limit_drives: Field::from_option(
                settings.virtual_hot_spare_limit_drives,
            ),
            virtual_hot_spare_limit_percent: Field::from_option(
                settings.virtual_hot_spare_limit_percent,
            ),
        })
    }

    /// Every known settable value. A transfer limit on a cluster whose API
    /// has none is an error rather than a silently dropped field.
    pub fn to_request(
        &self,
        api: StoragepoolApi,
        version: OnefsVersion,
    ) -> Result<StoragepoolSettingsUpdate, PowerscaleError> {
        let transfer_limits = match self.default_transfer_limit_pct.value() {
            Some(pct) => {
                if !api.supports_transfer_limits() {
                    require("default_transfer_limit_pct", ONEFS_9_5, version)?;
                }
                Some(TransferLimitUpdate {
                    default_transfer_limit_pct: Some(*pct),
                })
            }
            None => None,
        };

        Ok(StoragepoolSettingsUpdate {
            automatically_manage_io_optimization: join_management(
                &self.manage_io_optimization,
                &self.manage_io_optimization_apply_to_files,
            ),
            automatically_manage_protection: join_management(
                &self.manage_protection,
                &self.manage_protection_apply_to_files,
            ),
            global_namespace_acceleration_enabled: self
                .global_namespace_acceleration_enabled
                .cloned_value(),
            protect_directories_one_level_higher: self
                .protect_directories_one_level_higher
                .cloned_value(),
            spillover_enabled: self.spillover_enabled.cloned_value(),
            spillover_target: self
                .spillover_target
                .value()
                .map(|target| SpilloverTargetUpdate {
                    name: target.name.cloned_value(),
                    target_type: target.target_type.cloned_value(),
                }),
            ssd_l3_cache_default_enabled: self.ssd_l3_cache_default_enabled.cloned_value(),
            ssd_qab_mirrors: self.ssd_qab_mirrors.cloned_value(),
            ssd_system_btree_mirrors: self.ssd_system_btree_mirrors.cloned_value(),
            ssd_system_delta_mirrors: self.ssd_system_delta_mirrors.cloned_value(),
            virtual_hot_spare_deny_writes: self.virtual_hot_spare_deny_writes.cloned_value(),
            virtual_hot_spare_hide_spare: self.virtual_hot_spare_hide_spare.cloned_value(),
            virtual_hot_spare_limit_drives: self.virtual_hot_spare_limit_drives.cloned_value(),
            virtual_hot_spare_limit_percent: self.virtual_hot_spare_limit_percent.cloned_value(),
            transfer_limits,
        })
    }
}

fn split_management(
    attribute: &str,
    value: Option<&str>,
) -> Result<(Field<bool>, Field<bool>), MappingError> {
    match value {
        Some(value) => {
            let (manage, apply_to_files) = management_flags(attribute, value)?;
            Ok((Field::Set(manage), Field::Set(apply_to_files)))
        }
        None => Ok((Field::Null, Field::Null)),
    }
}

/// The appliance value for a flag pair. Nothing is sent unless the "manage"
/// flag is set. A null or unknown "apply to files" flag is sent as false, so
/// a plan that only sets `manage = true` selects `files_at_default` even when
/// the cluster currently reports `all`.
fn join_management(manage: &Field<bool>, apply_to_files: &Field<bool>) -> Option<String> {
    manage.value().map(|manage| {
        management_value(*manage, apply_to_files.value().copied().unwrap_or(false)).to_string()
    })
}
