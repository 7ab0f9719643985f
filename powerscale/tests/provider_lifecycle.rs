//! Resource and data source lifecycles against a mocked OneFS endpoint

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use mockito::{Matcher, Server, ServerGuard};
use powerscale::api::{Client, ClientConfig};
use powerscale::data_sources::{NetworkSettingsDataSource, SmartpoolSettingsDataSource};
use powerscale::resources::{
    LdapProviderResource, S3GlobalSettingResource, SmartpoolSettingsResource,
    WritableSnapshotResource,
};
use powerscale::PowerscaleProviderData;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, DataSource, DataSourceWithConfigure, ReadDataSourceRequest,
};
use tfplug::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ReadResourceRequest, Resource, ResourceWithConfigure,
    UpdateResourceRequest,
};
use tfplug::types::{has_errors, AttributePath, ClientCapabilities, Dynamic, DynamicValue};
use tokio_test::assert_ok;

const LDAP_CORP: &str = r#"{"ldap":[{
    "id": "corp",
    "name": "corp",
    "groupnet": "groupnet0",
    "status": "online",
    "zone_name": "System",
    "base_dn": "dc=corp,dc=example,dc=com",
    "server_uris": ["ldap://10.0.0.1"],
    "bind_timeout": 10,
    "enabled": true,
    "search_scope": "subtree",
    "findable_groups": [],
    "tls_revocation_check_level": "none",
    "ocsp_server_uris": []
}]}"#;

const WRITABLE_WS1: &str = r#"{
    "id": 42,
    "dst_path": "/ifs/ws1",
    "src_id": 12,
    "src_path": "/ifs/data",
    "src_snap": "daily",
    "state": "active"
}"#;

async fn cluster(release: &str) -> ServerGuard {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/platform/1/cluster/config")
        .with_body(format!(
            r#"{{"name":"c1","onefs_version":{{"release":"{}"}}}}"#,
            release
        ))
        .create_async()
        .await;
    server
}

fn provider_data(server: &ServerGuard) -> Arc<PowerscaleProviderData> {
    let client = Client::new(ClientConfig::new(server.url(), "admin", "secret")).unwrap();
    Arc::new(PowerscaleProviderData::new(client))
}

async fn configured<R: ResourceWithConfigure>(mut resource: R, server: &ServerGuard) -> R {
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(provider_data(server)),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    resource
}

async fn configured_data_source<D: DataSourceWithConfigure>(
    mut data_source: D,
    server: &ServerGuard,
) -> D {
    let response = data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(provider_data(server)),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    data_source
}

fn value(json: &str) -> DynamicValue {
    DynamicValue::decode_json(json.as_bytes()).unwrap()
}

fn create_request(type_name: &str, plan: &str) -> CreateResourceRequest {
    CreateResourceRequest {
        type_name: type_name.to_string(),
        planned_state: value(plan),
        config: value(plan),
        planned_private: vec![],
        provider_meta: None,
    }
}

fn read_request(type_name: &str, state: DynamicValue) -> ReadResourceRequest {
    ReadResourceRequest {
        type_name: type_name.to_string(),
        current_state: state,
        private: vec![],
        provider_meta: None,
        client_capabilities: ClientCapabilities::default(),
        current_identity: None,
    }
}

fn delete_request(type_name: &str, state: &str) -> DeleteResourceRequest {
    DeleteResourceRequest {
        type_name: type_name.to_string(),
        prior_state: value(state),
        planned_private: vec![],
        provider_meta: None,
    }
}

fn update_request(type_name: &str, prior: &str, plan: &str) -> UpdateResourceRequest {
    UpdateResourceRequest {
        type_name: type_name.to_string(),
        prior_state: value(prior),
        planned_state: value(plan),
        config: value(plan),
        planned_private: vec![],
        provider_meta: None,
        planned_identity: None,
    }
}

fn data_source_request(type_name: &str) -> ReadDataSourceRequest {
    ReadDataSourceRequest {
        type_name: type_name.to_string(),
        config: DynamicValue::object(),
        provider_meta: None,
        client_capabilities: ClientCapabilities::default(),
    }
}

const LDAP_PLAN: &str = r#"{
    "name": "corp",
    "base_dn": "dc=corp,dc=example,dc=com",
    "server_uris": ["ldap://10.0.0.1"]
}"#;

#[tokio::test]
async fn ldap_create_deletes_provider_when_read_back_fails() {
    let mut server = cluster("9.5.0.0").await;
    server
        .mock("POST", "/platform/16/auth/providers/ldap")
        .with_status(201)
        .with_body(r#"{"id":"corp"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/platform/16/auth/providers/ldap/corp")
        .with_status(500)
        .with_body(r#"{"errors":[{"code":"AEC_EXCEPTION","message":"lookup failed"}]}"#)
        .create_async()
        .await;
    let cleanup = server
        .mock("DELETE", "/platform/16/auth/providers/ldap/corp")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let resource = configured(LdapProviderResource::new(), &server).await;
    let response = resource
        .create(Context::new(), create_request("powerscale_ldap_provider", LDAP_PLAN))
        .await;

    cleanup.assert_async().await;
    assert!(response.new_state.is_null());
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(
        response.diagnostics[0].summary,
        "Error getting ldap provider after creation"
    );
    assert!(response.diagnostics[0].detail.contains("lookup failed"));
}

#[tokio::test]
async fn ldap_create_reports_failed_cleanup_too() {
    let mut server = cluster("9.5.0.0").await;
    server
        .mock("POST", "/platform/16/auth/providers/ldap")
        .with_status(201)
        .with_body(r#"{"id":"corp"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/platform/16/auth/providers/ldap/corp")
        .with_status(500)
        .with_body(r#"{"errors":[{"message":"lookup failed"}]}"#)
        .create_async()
        .await;
    server
        .mock("DELETE", "/platform/16/auth/providers/ldap/corp")
        .with_status(500)
        .with_body(r#"{"errors":[{"message":"provider busy"}]}"#)
        .create_async()
        .await;

    let resource = configured(LdapProviderResource::new(), &server).await;
    let response = resource
        .create(Context::new(), create_request("powerscale_ldap_provider", LDAP_PLAN))
        .await;

    let summaries: Vec<&str> = response
        .diagnostics
        .iter()
        .map(|d| d.summary.as_str())
        .collect();
    assert_eq!(
        summaries,
        vec![
            "Error getting ldap provider after creation",
            "Error deleting the LdapProvider - corp",
        ]
    );
    assert!(response.diagnostics[1].detail.contains("provider busy"));
}

#[tokio::test]
async fn ldap_read_after_create_matches_create_result() {
    let mut server = Server::new_async().await;
    let version = server
        .mock("GET", "/platform/1/cluster/config")
        .with_body(r#"{"onefs_version":{"release":"9.5.0.0"}}"#)
        .expect(1)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/platform/16/auth/providers/ldap")
        .match_body(Matcher::PartialJsonString(
            r#"{"name":"corp","server_uris":["ldap://10.0.0.1"]}"#.to_string(),
        ))
        .with_status(201)
        .with_body(r#"{"id":"corp"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/platform/16/auth/providers/ldap/corp")
        .with_body(LDAP_CORP)
        .expect(2)
        .create_async()
        .await;

    let resource = configured(LdapProviderResource::new(), &server).await;
    let created = resource
        .create(Context::new(), create_request("powerscale_ldap_provider", LDAP_PLAN))
        .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);
    assert_eq!(
        created.new_state.get_string(&AttributePath::new("status")).unwrap(),
        "online"
    );

    let read = resource
        .read(
            Context::new(),
            read_request("powerscale_ldap_provider", created.new_state.clone()),
        )
        .await;
    assert!(read.diagnostics.is_empty());
    assert_eq!(read.new_state, Some(created.new_state));

    create.assert_async().await;
    version.assert_async().await;
}

#[tokio::test]
async fn ldap_create_ignores_unparsable_response_body() {
    let mut server = cluster("9.5.0.0").await;
    server
        .mock("POST", "/platform/16/auth/providers/ldap")
        .with_status(201)
        .with_body("created")
        .create_async()
        .await;
    let read_back = server
        .mock("GET", "/platform/16/auth/providers/ldap/corp")
        .with_body(LDAP_CORP)
        .expect(1)
        .create_async()
        .await;
    let cleanup = server
        .mock("DELETE", "/platform/16/auth/providers/ldap/corp")
        .expect(0)
        .create_async()
        .await;

    let resource = configured(LdapProviderResource::new(), &server).await;
    let response = resource
        .create(Context::new(), create_request("powerscale_ldap_provider", LDAP_PLAN))
        .await;

    read_back.assert_async().await;
    cleanup.assert_async().await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response.new_state.get_string(&AttributePath::new("id")).unwrap(),
        "corp"
    );
}

#[tokio::test]
async fn ldap_rename_sends_only_new_name() {
    let mut server = cluster("9.5.0.0").await;
    let update = server
        .mock("PUT", "/platform/16/auth/providers/ldap/corp")
        .match_body(Matcher::Json(serde_json::json!({"name": "corp2"})))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let read_back = server
        .mock("GET", "/platform/16/auth/providers/ldap/corp2")
        .with_body(LDAP_CORP.replace("\"corp\"", "\"corp2\""))
        .expect(1)
        .create_async()
        .await;

    let resource = configured(LdapProviderResource::new(), &server).await;
    let response = resource
        .update(
            Context::new(),
            update_request(
                "powerscale_ldap_provider",
                LDAP_PLAN,
                &LDAP_PLAN.replace("\"corp\"", "\"corp2\""),
            ),
        )
        .await;

    update.assert_async().await;
    read_back.assert_async().await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response.new_state.get_string(&AttributePath::new("name")).unwrap(),
        "corp2"
    );
}

#[tokio::test]
async fn ldap_update_without_changes_skips_put() {
    let mut server = cluster("9.5.0.0").await;
    let update = server
        .mock("PUT", "/platform/16/auth/providers/ldap/corp")
        .expect(0)
        .create_async()
        .await;
    let read_back = server
        .mock("GET", "/platform/16/auth/providers/ldap/corp")
        .with_body(LDAP_CORP)
        .expect(1)
        .create_async()
        .await;

    let resource = configured(LdapProviderResource::new(), &server).await;
    let response = resource
        .update(
            Context::new(),
            update_request("powerscale_ldap_provider", LDAP_PLAN, LDAP_PLAN),
        )
        .await;

    update.assert_async().await;
    read_back.assert_async().await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response.new_state.get_string(&AttributePath::new("status")).unwrap(),
        "online"
    );
}

#[tokio::test]
async fn ldap_revocation_settings_need_newer_cluster() {
    let mut server = cluster("9.4.0.0").await;
    let create = server
        .mock("POST", "/platform/11/auth/providers/ldap")
        .expect(0)
        .create_async()
        .await;

    let resource = configured(LdapProviderResource::new(), &server).await;
    let response = resource
        .create(
            Context::new(),
            create_request(
                "powerscale_ldap_provider",
                r#"{"name": "corp", "base_dn": "dc=corp", "server_uris": ["ldap://10.0.0.1"],
                    "tls_revocation_check_level": "strict"}"#,
            ),
        )
        .await;

    create.assert_async().await;
    assert!(has_errors(&response.diagnostics));
    assert!(response.diagnostics[0].detail.contains("requires OneFS 9.5.0"));
}

#[tokio::test]
async fn ldap_delete_of_absent_provider_succeeds() {
    let mut server = cluster("9.4.0.0").await;
    let delete = server
        .mock("DELETE", "/platform/11/auth/providers/ldap/corp")
        .with_status(404)
        .with_body(r#"{"errors":[{"code":"AEC_NOT_FOUND","message":"Provider not found"}]}"#)
        .create_async()
        .await;

    let resource = configured(LdapProviderResource::new(), &server).await;
    let response = resource
        .delete(
            Context::new(),
            delete_request("powerscale_ldap_provider", r#"{"id": "corp", "name": "corp"}"#),
        )
        .await;

    delete.assert_async().await;
    assert!(response.diagnostics.is_empty());
}

#[tokio::test]
async fn ldap_read_of_absent_provider_clears_state() {
    let mut server = cluster("9.5.0.0").await;
    server
        .mock("GET", "/platform/16/auth/providers/ldap/corp")
        .with_status(404)
        .with_body(r#"{"errors":[{"message":"Provider not found"}]}"#)
        .create_async()
        .await;

    let resource = configured(LdapProviderResource::new(), &server).await;
    let response = resource
        .read(
            Context::new(),
            read_request("powerscale_ldap_provider", value(r#"{"name": "corp"}"#)),
        )
        .await;
    assert!(response.diagnostics.is_empty());
    assert!(response.new_state.is_none());
}

#[tokio::test]
async fn ldap_import_uses_provider_name() {
    let mut server = cluster("9.5.0.0").await;
    server
        .mock("GET", "/platform/16/auth/providers/ldap/corp")
        .with_body(LDAP_CORP)
        .create_async()
        .await;

    let resource = configured(LdapProviderResource::new(), &server).await;
    let response = resource
        .as_import_state()
        .unwrap()
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "powerscale_ldap_provider".to_string(),
                id: "corp".to_string(),
                client_capabilities: ClientCapabilities::default(),
                identity: None,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty());
    let state = &response.imported_resources[0].state;
    assert_eq!(state.get_string(&AttributePath::new("groupnet")).unwrap(), "groupnet0");
    assert_eq!(
        state.get(&AttributePath::new("ignore_unresolvable_server_urls")),
        Some(&Dynamic::Null)
    );
}

#[tokio::test]
async fn s3_read_keeps_false_heuristic() {
    let mut server = cluster("9.5.0.0").await;
    server
        .mock("GET", "/platform/10/protocols/s3/settings/global")
        .with_body(
            r#"{"settings":{"bucket_size_readdir_heuristic":false,"http_port":9020,"https_only":false,"https_port":9021,"service":true}}"#,
        )
        .create_async()
        .await;

    let resource = configured(S3GlobalSettingResource::new(), &server).await;
    let response = resource
        .read(
            Context::new(),
            read_request("powerscale_s3_global_setting", value(r#"{"id": "s3_global_setting"}"#)),
        )
        .await;

    assert!(response.diagnostics.is_empty());
    let state = response.new_state.unwrap();
    assert!(!assert_ok!(
        state.get_bool(&AttributePath::new("bucket_size_readdir_heuristic"))
    ));
    assert_eq!(state.get_number(&AttributePath::new("http_port")).unwrap(), 9020.0);
}

#[tokio::test]
async fn s3_create_submits_plan_and_reads_back() {
    let mut server = cluster("9.5.0.0").await;
    let update = server
        .mock("PUT", "/platform/10/protocols/s3/settings/global")
        .match_body(Matcher::Json(serde_json::json!({"service": true, "https_only": true})))
        .with_status(204)
        .create_async()
        .await;
    server
        .mock("GET", "/platform/10/protocols/s3/settings/global")
        .with_body(
            r#"{"settings":{"bucket_size_readdir_heuristic":false,"http_port":9020,"https_only":true,"https_port":9021,"service":true}}"#,
        )
        .create_async()
        .await;

    let resource = configured(S3GlobalSettingResource::new(), &server).await;
    let response = resource
        .create(
            Context::new(),
            create_request(
                "powerscale_s3_global_setting",
                r#"{"service": true, "https_only": true, "http_port": "__unknown__"}"#,
            ),
        )
        .await;

    update.assert_async().await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response.new_state.get_string(&AttributePath::new("id")).unwrap(),
        "s3_global_setting"
    );
}

#[tokio::test]
async fn writable_snapshot_create_maps_source_id() {
    let mut server = cluster("9.5.0.0").await;
    let create = server
        .mock("POST", "/platform/14/snapshot/writable")
        .match_body(Matcher::Json(serde_json::json!({"src_snap": "12", "dst_path": "/ifs/ws1"})))
        .with_status(201)
        .with_body(WRITABLE_WS1)
        .create_async()
        .await;
    server
        .mock("GET", "/platform/14/snapshot/writable/ifs/ws1")
        .with_body(format!(r#"{{"writable":[{}]}}"#, WRITABLE_WS1))
        .create_async()
        .await;

    let resource = configured(WritableSnapshotResource::new(), &server).await;
    let response = resource
        .create(
            Context::new(),
            create_request(
                "powerscale_writable_snapshot",
                r#"{"dst_path": "/ifs/ws1", "snap_id": "12", "id": "__unknown__", "state": "__unknown__"}"#,
            ),
        )
        .await;

    create.assert_async().await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.new_state;
    assert_eq!(state.get_string(&AttributePath::new("src_snap")).unwrap(), "12");
    assert_eq!(state.get_string(&AttributePath::new("snap_name")).unwrap(), "daily");
    assert_eq!(state.get_string(&AttributePath::new("state")).unwrap(), "active");
    assert_eq!(state.get_number(&AttributePath::new("id")).unwrap(), 42.0);
    assert_eq!(state.get_string(&AttributePath::new("snap_id")).unwrap(), "12");
}

#[tokio::test]
async fn writable_snapshot_create_reads_back_after_terse_response() {
    let mut server = cluster("9.5.0.0").await;
    server
        .mock("POST", "/platform/14/snapshot/writable")
        .with_status(201)
        .with_body(r#"{"id": 42}"#)
        .create_async()
        .await;
    let read_back = server
        .mock("GET", "/platform/14/snapshot/writable/ifs/ws1")
        .with_body(format!(r#"{{"writable":[{}]}}"#, WRITABLE_WS1))
        .expect(1)
        .create_async()
        .await;
    let cleanup = server
        .mock("DELETE", "/platform/14/snapshot/writable/ifs/ws1")
        .expect(0)
        .create_async()
        .await;

    let resource = configured(WritableSnapshotResource::new(), &server).await;
    let response = resource
        .create(
            Context::new(),
            create_request(
                "powerscale_writable_snapshot",
                r#"{"dst_path": "/ifs/ws1", "snap_id": "12"}"#,
            ),
        )
        .await;

    read_back.assert_async().await;
    cleanup.assert_async().await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response.new_state.get_number(&AttributePath::new("id")).unwrap(),
        42.0
    );
}

#[tokio::test]
async fn writable_snapshot_needs_onefs_9_3() {
    let server = cluster("9.2.1.0").await;

    let resource = configured(WritableSnapshotResource::new(), &server).await;
    let response = resource
        .create(
            Context::new(),
            create_request(
                "powerscale_writable_snapshot",
                r#"{"dst_path": "/ifs/ws1", "snap_id": "12"}"#,
            ),
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.diagnostics[0]
        .detail
        .contains("Writable snapshots requires OneFS 9.3.0"));
}

#[tokio::test]
async fn writable_snapshot_delete_of_absent_snapshot_succeeds() {
    let mut server = cluster("9.5.0.0").await;
    let delete = server
        .mock("DELETE", "/platform/14/snapshot/writable/ifs/ws1")
        .with_status(404)
        .with_body(r#"{"errors":[{"message":"not found"}]}"#)
        .create_async()
        .await;

    let resource = configured(WritableSnapshotResource::new(), &server).await;
    let response = resource
        .delete(
            Context::new(),
            delete_request(
                "powerscale_writable_snapshot",
                r#"{"id": 42, "dst_path": "/ifs/ws1", "snap_id": "12"}"#,
            ),
        )
        .await;

    delete.assert_async().await;
    assert!(response.diagnostics.is_empty());
}

#[tokio::test]
async fn smartpool_settings_on_older_cluster_use_v5() {
    let mut server = cluster("9.4.0.0").await;
    let update = server
        .mock("PUT", "/platform/5/storagepool/settings")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "automatically_manage_protection": "files_at_default",
            "virtual_hot_spare_limit_percent": 10
        })))
        .with_status(204)
        .create_async()
        .await;
    server
        .mock("GET", "/platform/5/storagepool/settings")
        .with_body(
            r#"{"settings":{
                "automatically_manage_io_optimization": "all",
                "automatically_manage_protection": "files_at_default",
                "global_namespace_acceleration_enabled": false,
                "global_namespace_acceleration_state": "inactive",
                "protect_directories_one_level_higher": true,
                "spillover_enabled": true,
                "spillover_target": {"id": 0, "name": "", "type": "anywhere"},
                "ssd_l3_cache_default_enabled": true,
                "ssd_qab_mirrors": "one",
                "ssd_system_btree_mirrors": "one",
                "ssd_system_delta_mirrors": "one",
                "virtual_hot_spare_deny_writes": true,
                "virtual_hot_spare_hide_spare": true,
                "virtual_hot_spare_limit_drives": 2,
                "virtual_hot_spare_limit_percent": 10
            }}"#,
        )
        .create_async()
        .await;

    let resource = configured(SmartpoolSettingsResource::new(), &server).await;
    let response = resource
        .create(
            Context::new(),
            create_request(
                "powerscale_smartpool_settings",
                r#"{"manage_protection": true, "manage_protection_apply_to_files": false,
                    "virtual_hot_spare_limit_percent": 10}"#,
            ),
        )
        .await;

    update.assert_async().await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let state = response.new_state;
    assert!(state.get_bool(&AttributePath::new("manage_io_optimization_apply_to_files")).unwrap());
    assert!(!state.get_bool(&AttributePath::new("manage_protection_apply_to_files")).unwrap());
    assert_eq!(
        state.get(&AttributePath::new("default_transfer_limit_pct")),
        Some(&Dynamic::Null)
    );
    assert_eq!(
        state
            .get_string(&AttributePath::new("spillover_target").attribute("type"))
            .unwrap(),
        "anywhere"
    );
}

#[tokio::test]
async fn smartpool_update_on_9_5_sends_transfer_limit() {
    let mut server = cluster("9.5.0.0").await;
    let update = server
        .mock("PUT", "/platform/16/storagepool/settings")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "default_transfer_limit_pct": 80.0,
            "spillover_enabled": false
        })))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/platform/16/storagepool/settings")
        .with_body(
            r#"{"settings":{
                "automatically_manage_io_optimization": "all",
                "automatically_manage_protection": "all",
                "default_transfer_limit_pct": 80,
                "default_transfer_limit_state": "set",
                "spillover_enabled": false
            }}"#,
        )
        .create_async()
        .await;

    let resource = configured(SmartpoolSettingsResource::new(), &server).await;
    let response = resource
        .update(
            Context::new(),
            update_request(
                "powerscale_smartpool_settings",
                r#"{"default_transfer_limit_pct": 90, "spillover_enabled": true}"#,
                r#"{"default_transfer_limit_pct": 80, "spillover_enabled": false}"#,
            ),
        )
        .await;

    update.assert_async().await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response
            .new_state
            .get_number(&AttributePath::new("default_transfer_limit_pct"))
            .unwrap(),
        80.0
    );
    assert_eq!(
        response
            .new_state
            .get_string(&AttributePath::new("default_transfer_limit_state"))
            .unwrap(),
        "set"
    );
}

#[tokio::test]
async fn smartpool_transfer_limit_on_9_0_is_unsupported() {
    let mut server = cluster("9.0.0.0").await;
    let update = server
        .mock("PUT", "/platform/5/storagepool/settings")
        .expect(0)
        .create_async()
        .await;

    let resource = configured(SmartpoolSettingsResource::new(), &server).await;
    let prior = r#"{"spillover_enabled": true}"#;
    let response = resource
        .update(
            Context::new(),
            update_request(
                "powerscale_smartpool_settings",
                prior,
                r#"{"spillover_enabled": true, "default_transfer_limit_pct": 80}"#,
            ),
        )
        .await;

    update.assert_async().await;
    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Error updating SmartPool settings");
    assert!(response.diagnostics[0]
        .detail
        .contains("default_transfer_limit_pct requires OneFS 9.5.0"));
    assert_eq!(response.new_state, value(prior));
}

#[tokio::test]
async fn smartpool_data_source_nests_settings() {
    let mut server = cluster("9.5.0.0").await;
    server
        .mock("GET", "/platform/16/storagepool/settings")
        .with_body(
            r#"{"settings":{
                "automatically_manage_io_optimization": "none",
                "automatically_manage_protection": "all",
                "default_transfer_limit_pct": 90,
                "default_transfer_limit_state": "default",
                "spillover_enabled": false
            }}"#,
        )
        .create_async()
        .await;

    let data_source = configured_data_source(SmartpoolSettingsDataSource::new(), &server).await;
    let response = data_source
        .read(Context::new(), data_source_request("powerscale_smartpool_settings"))
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    let settings = AttributePath::new("settings");
    assert_eq!(
        response
            .state
            .get_number(&settings.clone().attribute("default_transfer_limit_pct"))
            .unwrap(),
        90.0
    );
    assert!(response
        .state
        .get_bool(&settings.clone().attribute("manage_protection_apply_to_files"))
        .unwrap());
    assert!(!response
        .state
        .get_bool(&settings.attribute("manage_io_optimization"))
        .unwrap());
}

#[tokio::test]
async fn smartpool_data_source_rejects_unknown_management_value() {
    let mut server = cluster("9.5.0.0").await;
    server
        .mock("GET", "/platform/16/storagepool/settings")
        .with_body(r#"{"settings":{"automatically_manage_protection": "sometimes"}}"#)
        .create_async()
        .await;

    let data_source = configured_data_source(SmartpoolSettingsDataSource::new(), &server).await;
    let response = data_source
        .read(Context::new(), data_source_request("powerscale_smartpool_settings"))
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(response.diagnostics[0].summary, "Failed to parse StoragePool Settings");
    assert!(response.state.is_null());
}

#[tokio::test]
async fn network_settings_data_source_reads_external_settings() {
    let mut server = cluster("9.5.0.0").await;
    server
        .mock("GET", "/platform/12/network/external")
        .with_body(
            r#"{"settings":{"default_groupnet":"groupnet0","sbr":false,"sc_rebalance_delay":0,"tcp_ports":[2049,5667,80,445]}}"#,
        )
        .create_async()
        .await;

    let data_source = configured_data_source(NetworkSettingsDataSource::new(), &server).await;
    let response = data_source
        .read(Context::new(), data_source_request("powerscale_network_settings"))
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response.state.get_string(&AttributePath::new("id")).unwrap(),
        "network_settings"
    );
    assert!(!response
        .state
        .get_bool(&AttributePath::new("source_based_routing_enabled"))
        .unwrap());
    assert_eq!(
        response.state.get_list(&AttributePath::new("tcp_ports")).unwrap().len(),
        4
    );
}
