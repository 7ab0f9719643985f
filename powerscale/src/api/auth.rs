//! Authentication providers API (LDAP)

use super::common::encode_path;
use super::{ApiError, ApiQueryParams, Client};
use crate::version::LdapApi;
use serde::{Deserialize, Serialize};

/// LDAP provider settings common to API versions 11 and 16
///
/// Shared by request and response bodies. Fields left as `None` are omitted
/// from requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdapProviderFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_security_identities_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_servers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_dn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_mechanism: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_online_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cn_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_home_directory: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crypt_password_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumerate_groups: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumerate_users: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findable_groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub findable_users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gecos_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gid_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_base_dn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_members_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_search_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homedir_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_tls_errors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listable_groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listable_users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_shell: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_lookup_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_of_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netgroup_base_dn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netgroup_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netgroup_members_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netgroup_search_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netgroup_triple_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalize_groups: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalize_users: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nt_password_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ntlm_support: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_secure_connection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict_findable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict_listable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_timeout: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_expire_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_flag_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_inactive_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_last_change_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_max_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_min_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_user_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_warning_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_public_key_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_protocol_min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unfindable_groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unfindable_users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_group_members_attribute: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlistable_groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlistable_users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_base_dn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_search_scope: Option<String>,
}

/// OCSP and TLS revocation settings, added in API version 16
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdapRevocationFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocsp_server_uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_revocation_check_level: Option<String>,
}

impl LdapRevocationFields {
    pub fn is_empty(&self) -> bool {
        self.ocsp_server_uris.is_none() && self.tls_revocation_check_level.is_none()
    }
}

/// Request body for POST /platform/{v}/auth/providers/ldap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateLdapProviderRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groupnet: Option<String>,
    #[serde(flatten)]
    pub fields: LdapProviderFields,
    /// Must stay `None` for version 11
    #[serde(flatten)]
    pub revocation: Option<LdapRevocationFields>,
}

/// Request body for PUT /platform/{v}/auth/providers/ldap/{name}
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateLdapProviderRequest {
    /// New name, set only when renaming
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub fields: LdapProviderFields,
    #[serde(flatten)]
    pub revocation: Option<LdapRevocationFields>,
}

impl UpdateLdapProviderRequest {
    /// Nothing to send
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.fields == LdapProviderFields::default()
            && self.revocation.as_ref().map_or(true, LdapRevocationFields::is_empty)
    }
}

/// An LDAP provider as reported by the appliance
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LdapProvider {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub groupnet: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub zone_name: Option<String>,
    #[serde(flatten)]
    pub fields: LdapProviderFields,
    #[serde(flatten)]
    pub revocation: LdapRevocationFields,
}

#[derive(Debug, Deserialize)]
struct LdapProviderList {
    #[serde(default)]
    ldap: Vec<LdapProvider>,
}

pub struct AuthApi<'a> {
    client: &'a Client,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// LDAP provider operations for the selected API variant
    pub fn ldap(&self, api: LdapApi) -> LdapProvidersApi<'a> {
        LdapProvidersApi {
            client: self.client,
            api,
        }
    }
}

pub struct LdapProvidersApi<'a> {
    client: &'a Client,
    api: LdapApi,
}

impl<'a> LdapProvidersApi<'a> {
    fn collection_path(&self) -> String {
        format!("/platform/{}/auth/providers/ldap", self.api.api_version())
    }

    fn item_path(&self, name: &str) -> String {
        format!("{}/{}", self.collection_path(), encode_path(name))
    }

    /// POST /platform/{v}/auth/providers/ldap
    pub async fn create(
        &self,
        request: &CreateLdapProviderRequest,
        ignore_unresolvable_server_urls: Option<bool>,
    ) -> Result<(), ApiError> {
        let params = Self::server_url_params(ignore_unresolvable_server_urls);
        self.client
            .post_with_params(&self.collection_path(), &params, request)
            .await
    }

    /// GET /platform/{v}/auth/providers/ldap/{name}; `None` when the
    /// appliance returns an empty list
    pub async fn get(&self, name: &str) -> Result<Option<LdapProvider>, ApiError> {
        let response: LdapProviderList = self.client.get(&self.item_path(name)).await?;
        Ok(response.ldap.into_iter().next())
    }

    /// PUT /platform/{v}/auth/providers/ldap/{name}
    pub async fn update(
        &self,
        name: &str,
        request: &UpdateLdapProviderRequest,
        ignore_unresolvable_server_urls: Option<bool>,
    ) -> Result<(), ApiError> {
        let params = Self::server_url_params(ignore_unresolvable_server_urls);
        self.client
            .put_with_params(&self.item_path(name), &params, request)
            .await
    }

    /// DELETE /platform/{v}/auth/providers/ldap/{name}
    pub async fn delete(&self, name: &str) -> Result<(), ApiError> {
        self.client.delete(&self.item_path(name)).await
    }

    fn server_url_params(ignore_unresolvable_server_urls: Option<bool>) -> ApiQueryParams {
        ApiQueryParams::new().add_optional(
            "ignore_unresolvable_server_urls",
            ignore_unresolvable_server_urls,
        )
    }
}
