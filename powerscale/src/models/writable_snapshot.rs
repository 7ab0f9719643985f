use crate::api::snapshot::{CreateWritableSnapshotRequest, WritableSnapshot};
use crate::mapper::{id_to_string, read_field, required, write_field, Field, MappingError};
use tfplug::types::DynamicValue;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WritableSnapshotModel {
    pub id: Field<i64>,
    pub dst_path: Field<String>,
    /// Source snapshot id or name, as given by the practitioner
    pub snap_id: Field<String>,
    pub src_path: Field<String>,
    /// Numeric id of the source snapshot, rendered as a string
    pub src_snap: Field<String>,
    pub snap_name: Field<String>,
    pub state: Field<String>,
}

impl WritableSnapshotModel {
    pub fn from_state(value: &DynamicValue) -> Result<Self, MappingError> {
        Ok(Self {
            id: read_field(value, "id")?,
            dst_path: read_field(value, "dst_path")?,
            snap_id: read_field(value, "snap_id")?,
            src_path: read_field(value, "src_path")?,
            src_snap: read_field(value, "src_snap")?,
            snap_name: read_field(value, "snap_name")?,
            state: read_field(value, "state")?,
        })
    }

    pub fn to_state(&self) -> Result<DynamicValue, MappingError> {
        let mut state = DynamicValue::object();
        write_field(&mut state, "id", &self.id)?;
        write_field(&mut state, "dst_path", &self.dst_path)?;
        write_field(&mut state, "snap_id", &self.snap_id)?;
        write_field(&mut state, "src_path", &self.src_path)?;
        write_field(&mut state, "src_snap", &self.src_snap)?;
        write_field(&mut state, "snap_name", &self.snap_name)?;
        write_field(&mut state, "state", &self.state)?;
        Ok(state)
    }

    /// Everything but `snap_id` comes from the appliance. `snap_id` is an
    /// input the appliance does not echo; without one (import) it falls
    /// back to the source snapshot id.
    pub fn from_api(item: &WritableSnapshot, snap_id: &Field<String>) -> Self {
        let src_snap = id_to_string(item.src_id);
        Self {
            id: Field::Set(item.id),
            dst_path: Field::Set(item.dst_path.clone()),
            snap_id: match snap_id {
                Field::Set(s) => Field::Set(s.clone()),
                _ => Field::Set(src_snap.clone()),
            },
            src_path: Field::Set(item.src_path.clone()),
            src_snap: Field::Set(src_snap),
            snap_name: Field::Set(item.src_snap.clone()),
            state: Field::Set(item.state.clone()),
        }
    }

    pub fn to_request(&self) -> Result<CreateWritableSnapshotRequest, MappingError> {
        Ok(CreateWritableSnapshotRequest {
            src_snap: required(self.snap_id.cloned_value(), "snap_id")?,
            dst_path: required(self.dst_path.cloned_value(), "dst_path")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> WritableSnapshot {
        serde_json::from_str(
            r#"{"id":42,"dst_path":"/ifs/ws1","src_id":12,"src_path":"/ifs/data","src_snap":"daily_snap","state":"active"}"#,
        )
        .unwrap()
    }

    #[test]
    fn source_id_is_rendered_as_string() {
        let model = WritableSnapshotModel::from_api(&item(), &Field::Set("12".to_string()));
        assert_eq!(model.src_snap, Field::Set("12".to_string()));
        assert_eq!(model.snap_name, Field::Set("daily_snap".to_string()));
        assert_eq!(model.id, Field::Set(42));
        assert_eq!(model.state, Field::Set("active".to_string()));
        assert_eq!(model.src_path, Field::Set("/ifs/data".to_string()));
    }

    #[test]
    fn import_falls_back_to_source_id() {
        let model = WritableSnapshotModel::from_api(&item(), &Field::Unknown);
        assert_eq!(model.snap_id, Field::Set("12".to_string()));

        let by_name = WritableSnapshotModel::from_api(&item(), &Field::Set("daily_snap".into()));
        assert_eq!(by_name.snap_id, Field::Set("daily_snap".to_string()));
    }

    #[test]
    fn request_requires_inputs() {
        let plan = DynamicValue::decode_json(
            br#"{"dst_path": "/ifs/ws1", "snap_id": "12", "id": "__unknown__"}"#,
        )
        .unwrap();
        let request = WritableSnapshotModel::from_state(&plan)
            .unwrap()
            .to_request()
            .unwrap();
        assert_eq!(request.src_snap, "12");
        assert_eq!(request.dst_path, "/ifs/ws1");

        let missing = WritableSnapshotModel::default().to_request().unwrap_err();
        assert_eq!(missing, MappingError::MissingField("snap_id".to_string()));
    }

    #[test]
    fn state_round_trip() {
        let model = WritableSnapshotModel::from_api(&item(), &Field::Set("12".to_string()));
        let state = model.to_state().unwrap();
        assert_eq!(WritableSnapshotModel::from_state(&state).unwrap(), model);
    }
}
