//! LDAP provider model
//!
//! The appliance exposes some seventy optional settings on an LDAP provider.
//! They are declared once in `ldap_settings!`, which generates the typed
//! struct together with its state, API and schema mappings.

use crate::api::auth::{
    CreateLdapProviderRequest, LdapProvider, LdapProviderFields, LdapRevocationFields,
    UpdateLdapProviderRequest,
};
use crate::error::PowerscaleError;
use crate::mapper::{read_field, required, write_field, Field, MappingError, SchemaType};
use crate::version::{LdapApi, OnefsVersion, UnsupportedVersionError, ONEFS_9_5};
use tfplug::schema::AttributeType;
use tfplug::types::DynamicValue;

macro_rules! ldap_settings {
    ($($name:ident: $ty:ty => $desc:literal,)*) => {
        /// Settings shared by every LDAP provider API version
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct LdapSettings {
            $(pub $name: Field<$ty>,)*
        }

        impl LdapSettings {
            /// `(attribute, type, description)` in declaration order
            pub fn attributes() -> Vec<(&'static str, AttributeType, &'static str)> {
                vec![$((stringify!($name), <$ty as SchemaType>::attribute_type(), $desc),)*]
            }

            pub fn read(value: &DynamicValue) -> Result<Self, MappingError> {
                Ok(Self {
                    $($name: read_field(value, stringify!($name))?,)*
                })
            }

            pub fn write(&self, value: &mut DynamicValue) -> Result<(), MappingError> {
                $(write_field(value, stringify!($name), &self.$name)?;)*
                Ok(())
            }

            pub fn from_api(fields: &LdapProviderFields) -> Self {
                Self {
                    $($name: Field::from_option(fields.$name.clone()),)*
                }
            }

            /// Copies every known value into a request
            pub fn apply_all(&self, fields: &mut LdapProviderFields) {
                $(fields.$name = self.$name.cloned_value();)*
            }

            /// Copies only the values that differ from `prior`
            pub fn apply_changes(&self, prior: &Self, fields: &mut LdapProviderFields) {
                $(fields.$name = self.$name.changed_from(&prior.$name).cloned();)*
            }
        }
    };
}

ldap_settings! {
    alternate_security_identities_attribute: String => "Specifies the attribute name used when searching for alternate security identities.",
    authentication: bool => "If true, enables authentication and identity management through the authentication provider.",
    balance_servers: bool => "If true, connects the provider to a random server.",
    base_dn: String => "Specifies the root of the tree in which to search identities.",
    bind_dn: String => "Specifies the distinguished name for binding to the LDAP server.",
    bind_mechanism: String => "Specifies which bind mechanism to use when connecting to an LDAP server. The only supported option is the 'simple' value.",
    bind_timeout: i64 => "Specifies the timeout in seconds when binding to an LDAP server.",
    certificate_authority_file: String => "Specifies the path to the root certificates file.",
    check_online_interval: i64 => "Specifies the time in seconds between provider online checks.",
    cn_attribute: String => "Specifies the canonical name.",
    create_home_directory: bool => "Automatically create the home directory on the first login.",
    crypt_password_attribute: String => "Specifies the hashed password value.",
    email_attribute: String => "Specifies the LDAP Email attribute.",
    enabled: bool => "If true, enables the LDAP provider.",
    enumerate_groups: bool => "If true, allows the provider to enumerate groups.",
    enumerate_users: bool => "If true, allows the provider to enumerate users.",
    findable_groups: Vec<String> => "Specifies the list of groups that can be resolved.",
    findable_users: Vec<String> => "Specifies the list of users that can be resolved.",
    gecos_attribute: String => "Specifies the LDAP GECOS attribute.",
    gid_attribute: String => "Specifies the LDAP GID attribute.",
    group_base_dn: String => "Specifies the distinguished name of the entry where LDAP searches for groups are started.",
    group_domain: String => "Specifies the domain for this provider through which groups are qualified.",
    group_filter: String => "Specifies the LDAP filter for group objects.",
    group_members_attribute: String => "Specifies the LDAP Group Members attribute.",
    group_search_scope: String => "Specifies the depth from the base DN to perform LDAP searches. Acceptable values: \"default\", \"base\", \"onelevel\", \"subtree\", \"children\".",
    home_directory_template: String => "Specifies the path to the home directory template.",
    homedir_attribute: String => "Specifies the LDAP Homedir attribute.",
    ignore_tls_errors: bool => "If true, continues over secure connections even if identity checks fail.",
    listable_groups: Vec<String> => "Specifies the groups that can be viewed in the provider.",
    listable_users: Vec<String> => "Specifies the users that can be viewed in the provider.",
    login_shell: String => "Specifies the login shell path.",
    member_lookup_method: String => "Sets the method by which group member lookups are performed. Use caution when changing this option directly. Acceptable values: \"default\", \"rfc2307bis\".",
    member_of_attribute: String => "Specifies the LDAP Query Member Of attribute, which performs reverse membership queries.",
    name_attribute: String => "Specifies the LDAP UID attribute, which is used as the login name.",
    netgroup_base_dn: String => "Specifies the distinguished name of the entry where LDAP searches for netgroups are started.",
    netgroup_filter: String => "Specifies the LDAP filter for netgroup objects.",
    netgroup_members_attribute: String => "Specifies the LDAP Netgroup Members attribute.",
    netgroup_search_scope: String => "Specifies the depth from the base DN to perform LDAP searches. Acceptable values: \"default\", \"base\", \"onelevel\", \"subtree\", \"children\".",
    netgroup_triple_attribute: String => "Specifies the LDAP Netgroup Triple attribute.",
    normalize_groups: bool => "Normalizes group names to lowercase before look up.",
    normalize_users: bool => "Normalizes user names to lowercase before look up.",
    nt_password_attribute: String => "Specifies the LDAP NT Password attribute.",
    ntlm_support: String => "Specifies which NTLM versions to support for users with NTLM-compatible credentials. Acceptable values: \"all\", \"v2only\", \"none\".",
    provider_domain: String => "Specifies the provider domain.",
    require_secure_connection: bool => "Determines whether to continue over a non-TLS connection.",
    restrict_findable: bool => "If true, checks the provider for filtered lists of findable and unfindable users and groups.",
    restrict_listable: bool => "If true, checks the provider for filtered lists of listable and unlistable users and groups.",
    search_scope: String => "Specifies the default depth from the base DN to perform LDAP searches. Acceptable values: \"base\", \"onelevel\", \"subtree\", \"children\".",
    search_timeout: i64 => "Specifies the search timeout period in seconds.",
    server_uris: Vec<String> => "Specifies the server URIs.",
    shadow_expire_attribute: String => "Sets the attribute name that indicates the absolute date to expire the account.",
    shadow_flag_attribute: String => "Sets the attribute name that indicates the section of the shadow map that is used to store the flag value.",
    shadow_inactive_attribute: String => "Sets the attribute name that indicates the number of days of inactivity that is allowed for the user.",
    shadow_last_change_attribute: String => "Sets the attribute name that indicates the last change of the shadow information.",
    shadow_max_attribute: String => "Sets the attribute name that indicates the maximum number of days a password can be valid.",
    shadow_min_attribute: String => "Sets the attribute name that indicates the minimum number of days between shadow changes.",
    shadow_user_filter: String => "Sets LDAP filter for shadow user objects.",
    shadow_warning_attribute: String => "Sets the attribute name that indicates the number of days before the password expires to warn the user.",
    shell_attribute: String => "Specifies the LDAP Shell attribute.",
    ssh_public_key_attribute: String => "Sets the attribute name that indicates the SSH Public Key for the user.",
    system: bool => "If true, indicates that this provider instance was created by OneFS and cannot be removed.",
    tls_protocol_min: String => "Specifies the minimum TLS protocol version.",
    uid_attribute: String => "Specifies the LDAP UID Number attribute.",
    unfindable_groups: Vec<String> => "Specifies the groups that cannot be resolved by the provider.",
    unfindable_users: Vec<String> => "Specifies users that cannot be resolved by the provider.",
    unique_group_members_attribute: String => "Sets the LDAP Unique Group Members attribute.",
    unlistable_groups: Vec<String> => "Specifies a group that cannot be listed by the provider.",
    unlistable_users: Vec<String> => "Specifies a user that cannot be listed by the provider.",
    user_base_dn: String => "Specifies the distinguished name of the entry at which to start LDAP searches for users.",
    user_domain: String => "Specifies the domain for this provider through which users are qualified.",
    user_filter: String => "Specifies the LDAP filter for user objects.",
    user_search_scope: String => "Specifies the depth from the base DN to perform LDAP searches. Acceptable values: \"default\", \"base\", \"onelevel\", \"subtree\", \"children\".",
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LdapProviderModel {
    pub id: Field<String>,
    pub name: Field<String>,
    pub groupnet: Field<String>,
    pub zone_name: Field<String>,
    pub status: Field<String>,
    /// Request-only flag; the appliance never reports it
    pub ignore_unresolvable_server_urls: Field<bool>,
    pub ocsp_server_uris: Field<Vec<String>>,
    pub tls_revocation_check_level: Field<String>,
    pub settings: LdapSettings,
}

impl LdapProviderModel {
    pub fn from_state(value: &DynamicValue) -> Result<Self, MappingError> {
        Ok(Self {
            id: read_field(value, "id")?,
            name: read_field(value, "name")?,
            groupnet: read_field(value, "groupnet")?,
            zone_name: read_field(value, "zone_name")?,
            status: read_field(value, "status")?,
            ignore_unresolvable_server_urls: read_field(value, "ignore_unresolvable_server_urls")?,
            ocsp_server_uris: read_field(value, "ocsp_server_uris")?,
            tls_revocation_check_level: read_field(value, "tls_revocation_check_level")?,
            settings: LdapSettings::read(value)?,
        })
    }

    pub fn to_state(&self) -> Result<DynamicValue, MappingError> {
        let mut state = DynamicValue::object();
        write_field(&mut state, "id", &self.id)?;
        write_field(&mut state, "name", &self.name)?;
        write_field(&mut state, "groupnet", &self.groupnet)?;
        write_field(&mut state, "zone_name", &self.zone_name)?;
        write_field(&mut state, "status", &self.status)?;
        write_field(
            &mut state,
            "ignore_unresolvable_server_urls",
            &self.ignore_unresolvable_server_urls,
        )?;
        write_field(&mut state, "ocsp_server_uris", &self.ocsp_server_uris)?;
        write_field(
            &mut state,
            "tls_revocation_check_level",
            &self.tls_revocation_check_level,
        )?;
        self.settings.write(&mut state)?;
        Ok(state)
    }

    /// Revocation settings are only meaningful on API version 16 and are
    /// left null otherwise.
    pub fn from_api(item: &LdapProvider, api: LdapApi, ignore_unresolvable: Field<bool>) -> Self {
        let (ocsp_server_uris, tls_revocation_check_level) = if api.supports_revocation_checks() {
            (
                Field::from_option(item.revocation.ocsp_server_uris.clone()),
                Field::from_option(item.revocation.tls_revocation_check_level.clone()),
            )
        } else {
            (Field::Null, Field::Null)
        };

        Self {
            id: Field::Set(item.id.clone()),
            name: Field::Set(item.name.clone()),
            groupnet: Field::from_option(item.groupnet.clone()),
            zone_name: Field::from_option(item.zone_name.clone()),
            status: Field::from_option(item.status.clone()),
            ignore_unresolvable_server_urls: match ignore_unresolvable {
                Field::Unknown => Field::Null,
                other => other,
            },
            ocsp_server_uris,
            tls_revocation_check_level,
            settings: LdapSettings::from_api(&item.fields),
        }
    }

    pub fn to_create_request(
        &self,
        api: LdapApi,
        version: OnefsVersion,
    ) -> Result<CreateLdapProviderRequest, PowerscaleError> {
        let mut fields = LdapProviderFields::default();
        self.settings.apply_all(&mut fields);

        Ok(CreateLdapProviderRequest {
            name: required(self.name.cloned_value(), "name")?,
            groupnet: self.groupnet.cloned_value(),
            fields,
            revocation: self.revocation_request(None, api, version)?,
        })
    }

    /// Only attributes whose planned value differs from `prior` are sent.
    /// A new name renames the provider; the groupnet is fixed at creation.
    pub fn to_update_request(
        &self,
        prior: &Self,
        api: LdapApi,
        version: OnefsVersion,
    ) -> Result<UpdateLdapProviderRequest, PowerscaleError> {
        if let (Some(planned), Some(current)) = (self.groupnet.value(), prior.groupnet.value()) {
            if planned != current {
                return Err(PowerscaleError::Validation(format!(
                    "groupnet cannot be changed after creation (from {current:?} to {planned:?})"
                )));
            }
        }

        let mut fields = LdapProviderFields::default();
        self.settings.apply_changes(&prior.settings, &mut fields);

        Ok(UpdateLdapProviderRequest {
            name: self.name.changed_from(&prior.name).cloned(),
            fields,
            revocation: self.revocation_request(Some(prior), api, version)?,
        })
    }

    fn revocation_request(
        &self,
        prior: Option<&Self>,
        api: LdapApi,
        version: OnefsVersion,
    ) -> Result<Option<LdapRevocationFields>, PowerscaleError> {
        let request = match prior {
            Some(prior) => LdapRevocationFields {
                ocsp_server_uris: self
                    .ocsp_server_uris
                    .changed_from(&prior.ocsp_server_uris)
                    .cloned(),
                tls_revocation_check_level: self
                    .tls_revocation_check_level
                    .changed_from(&prior.tls_revocation_check_level)
                    .cloned(),
            },
            None => LdapRevocationFields {
                ocsp_server_uris: self.ocsp_server_uris.cloned_value(),
                tls_revocation_check_level: self.tls_revocation_check_level.cloned_value(),
            },
        };

        if request.is_empty() {
            return Ok(None);
        }
        if !api.supports_revocation_checks() {
            let feature = if request.tls_revocation_check_level.is_some() {
                "tls_revocation_check_level"
            } else {
                "ocsp_server_uris"
            };
            return Err(UnsupportedVersionError {
                feature: feature.to_string(),
                required: ONEFS_9_5,
                actual: version,
            }
            .into());
        }
        Ok(Some(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V9_4: OnefsVersion = OnefsVersion::new(9, 4, 0);
    const V9_5: OnefsVersion = OnefsVersion::new(9, 5, 0);

    fn item() -> LdapProvider {
        serde_json::from_str(
            r#"{
                "id": "corp",
                "name": "corp",
                "groupnet": "groupnet0",
                "zone_name": "System",
                "status": "online",
                "base_dn": "dc=corp,dc=com",
                "server_uris": ["ldap://10.0.0.1"],
                "bind_timeout": 10,
                "enabled": true,
                "tls_revocation_check_level": "none",
                "ocsp_server_uris": []
            }"#,
        )
        .unwrap()
    }

    fn planned(json: &str) -> LdapProviderModel {
        LdapProviderModel::from_state(&DynamicValue::decode_json(json.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn attribute_table_covers_every_setting() {
        let attributes = LdapSettings::attributes();
        assert_eq!(attributes.len(), 72);
        let (_, server_uris, _) = attributes
            .iter()
            .find(|(name, _, _)| *name == "server_uris")
            .unwrap();
        assert_eq!(*server_uris, AttributeType::List(Box::new(AttributeType::String)));
        assert!(attributes
            .iter()
            .all(|(_, _, description)| !description.is_empty()));
    }

    #[test]
    fn revocation_fields_are_null_on_v11() {
        let v11 = LdapProviderModel::from_api(&item(), LdapApi::V11, Field::Null);
        assert_eq!(v11.tls_revocation_check_level, Field::Null);
        assert_eq!(v11.ocsp_server_uris, Field::Null);
        assert_eq!(v11.settings.bind_timeout, Field::Set(10));

        let v16 = LdapProviderModel::from_api(&item(), LdapApi::V16, Field::Set(true));
        assert_eq!(v16.tls_revocation_check_level, Field::Set("none".to_string()));
        assert_eq!(v16.ocsp_server_uris, Field::Set(vec![]));
        assert_eq!(v16.ignore_unresolvable_server_urls, Field::Set(true));
    }

    #[test]
    fn create_request_sends_known_values_only() {
        let plan = planned(
            r#"{"name": "corp", "base_dn": "dc=corp,dc=com",
                "server_uris": ["ldap://10.0.0.1"], "id": "__unknown__",
                "enabled": "__unknown__", "tls_revocation_check_level": "__unknown__"}"#,
        );
        let request = plan.to_create_request(LdapApi::V11, V9_4).unwrap();
        assert_eq!(request.name, "corp");
        assert_eq!(request.fields.base_dn.as_deref(), Some("dc=corp,dc=com"));
        assert_eq!(request.fields.enabled, None);
        assert_eq!(request.revocation, None);
    }

    #[test]
    fn revocation_settings_need_onefs_9_5() {
        let plan = planned(
            r#"{"name": "corp", "base_dn": "dc=corp,dc=com",
                "server_uris": ["ldap://10.0.0.1"], "tls_revocation_check_level": "strict"}"#,
        );
        let err = plan.to_create_request(LdapApi::V11, V9_4).unwrap_err();
        match err {
            PowerscaleError::UnsupportedVersion(e) => {
                assert_eq!(e.feature, "tls_revocation_check_level");
                assert_eq!(e.actual, V9_4);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let request = plan.to_create_request(LdapApi::V16, V9_5).unwrap();
        assert_eq!(
            request.revocation.unwrap().tls_revocation_check_level.as_deref(),
            Some("strict")
        );
    }

    #[test]
    fn update_request_carries_only_changes() {
        let prior = LdapProviderModel::from_api(&item(), LdapApi::V16, Field::Null);
        let mut plan = prior.clone();
        plan.settings.bind_timeout = Field::Set(20);
        plan.name = Field::Set("corp2".to_string());

        let request = plan.to_update_request(&prior, LdapApi::V16, V9_5).unwrap();
        assert_eq!(request.name.as_deref(), Some("corp2"));
        assert_eq!(request.fields.bind_timeout, Some(20));
        assert_eq!(request.fields.base_dn, None);
        assert_eq!(request.revocation, None);

        let unchanged = prior.to_update_request(&prior, LdapApi::V16, V9_5).unwrap();
        assert!(unchanged.is_empty());
    }

    #[test]
    fn groupnet_is_fixed_after_creation() {
        let prior = LdapProviderModel::from_api(&item(), LdapApi::V11, Field::Null);
        let mut plan = prior.clone();
        plan.groupnet = Field::Set("groupnet1".to_string());
        let err = plan.to_update_request(&prior, LdapApi::V11, V9_4).unwrap_err();
        assert!(matches!(err, PowerscaleError::Validation(_)));
    }

    #[test]
    fn state_round_trip() {
        let model = LdapProviderModel::from_api(&item(), LdapApi::V16, Field::Set(false));
        let state = model.to_state().unwrap();
        assert_eq!(LdapProviderModel::from_state(&state).unwrap(), model);
    }
}
