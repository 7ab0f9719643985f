//! Writable snapshot API

use super::common::encode_path;
use super::{ApiError, Client};
use serde::{Deserialize, Serialize};

/// Request body for POST /platform/{v}/snapshot/writable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateWritableSnapshotRequest {
    /// Source snapshot id or name
    pub src_snap: String,
    pub dst_path: String,
}

/// A writable snapshot as reported by the appliance
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WritableSnapshot {
    pub id: i64,
    pub dst_path: String,
    pub src_id: i64,
    pub src_path: String,
    /// Name of the source snapshot
    pub src_snap: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
struct WritableSnapshotList {
    #[serde(default)]
    writable: Vec<WritableSnapshot>,
}

pub struct SnapshotApi<'a> {
    client: &'a Client,
}

impl<'a> SnapshotApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Writable snapshots are addressed by destination path without the
    /// leading slash
    fn writable_path(api_version: u32, dst_path: &str) -> String {
        format!(
            "/platform/{}/snapshot/writable/{}",
            api_version,
            encode_path(dst_path.trim_start_matches('/'))
        )
    }

    /// POST /platform/{v}/snapshot/writable; the new snapshot is read back
    /// by `dst_path`
    pub async fn create_writable(
        &self,
        api_version: u32,
        request: &CreateWritableSnapshotRequest,
    ) -> Result<(), ApiError> {
        self.client
            .post(&format!("/platform/{}/snapshot/writable", api_version), request)
            .await
    }

    /// GET /platform/{v}/snapshot/writable/{dst_path}; `None` when the
    /// appliance returns an empty list
    pub async fn get_writable(
        &self,
        api_version: u32,
        dst_path: &str,
    ) -> Result<Option<WritableSnapshot>, ApiError> {
        let response: WritableSnapshotList = self
            .client
            .get(&Self::writable_path(api_version, dst_path))
            .await?;
        Ok(response.writable.into_iter().next())
    }

    /// DELETE /platform/{v}/snapshot/writable/{dst_path}
    pub async fn delete_writable(&self, api_version: u32, dst_path: &str) -> Result<(), ApiError> {
        self.client
            .delete(&Self::writable_path(api_version, dst_path))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_drops_leading_slash() {
        assert_eq!(
            SnapshotApi::writable_path(14, "/ifs/data/ws1"),
            "/platform/14/snapshot/writable/ifs/data/ws1"
        );
    }

    #[test]
    fn item_ignores_size_fields() {
        let item: WritableSnapshot = serde_json::from_str(
            r#"{"id":7,"dst_path":"/ifs/ws","src_id":12,"src_path":"/ifs/data","src_snap":"daily","state":"active","log_size":0,"phys_size":2048}"#,
        )
        .unwrap();
        assert_eq!(item.src_id, 12);
        assert_eq!(item.state, "active");
    }
}
