use crate::api::protocols::S3GlobalSettings;
use crate::mapper::{read_field, write_field, Field, MappingError};
use tfplug::types::DynamicValue;

/// Fixed identifier of the singleton settings object
pub const S3_GLOBAL_SETTING_ID: &str = "s3_global_setting";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct S3GlobalSettingModel {
    pub id: Field<String>,
    pub bucket_size_readdir_heuristic: Field<bool>,
    pub http_port: Field<i64>,
    pub https_only: Field<bool>,
    pub https_port: Field<i64>,
    pub service: Field<bool>,
}

impl S3GlobalSettingModel {
    pub fn from_state(value: &DynamicValue) -> Result<Self, MappingError> {
        Ok(Self {
            id: read_field(value, "id")?,
            bucket_size_readdir_heuristic: read_field(value, "bucket_size_readdir_heuristic")?,
            http_port: read_field(value, "http_port")?,
            https_only: read_field(value, "https_only")?,
            https_port: read_field(value, "https_port")?,
            service: read_field(value, "service")?,
        })
    }

    pub fn to_state(&self) -> Result<DynamicValue, MappingError> {
        let mut state = DynamicValue::object();
        write_field(&mut state, "id", &self.id)?;
        write_field(
            &mut state,
            "bucket_size_readdir_heuristic",
            &self.bucket_size_readdir_heuristic,
        )?;
        write_field(&mut state, "http_port", &self.http_port)?;
        write_field(&mut state, "https_only", &self.https_only)?;
        write_field(&mut state, "https_port", &self.https_port)?;
        write_field(&mut state, "service", &self.service)?;
        Ok(state)
    }

    pub fn from_api(settings: &S3GlobalSettings) -> Self {
        Self {
            id: Field::Set(S3_GLOBAL_SETTING_ID.to_string()),
            bucket_size_readdir_heuristic: Field::from_option(
                settings.bucket_size_readdir_heuristic,
            ),
            http_port: Field::from_option(settings.http_port),
            https_only: Field::from_option(settings.https_only),
            https_port: Field::from_option(settings.https_port),
            service: Field::from_option(settings.service),
        }
    }

    /// Every known settable value; the endpoint accepts resubmission
    pub fn to_request(&self) -> S3GlobalSettings {
        S3GlobalSettings {
            bucket_size_readdir_heuristic: self.bucket_size_readdir_heuristic.cloned_value(),
            http_port: self.http_port.cloned_value(),
            https_only: self.https_only.cloned_value(),
            https_port: self.https_port.cloned_value(),
            service: self.service.cloned_value(),
        }
    }

    /// HTTP and HTTPS must listen on different ports
    pub fn port_conflict(&self) -> Option<i64> {
        match (self.http_port.value(), self.https_port.value()) {
            (Some(http), Some(https)) if http == https => Some(*http),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn false_heuristic_maps_to_false() {
        let settings: S3GlobalSettings =
            serde_json::from_str(r#"{"bucket_size_readdir_heuristic": false}"#).unwrap();
        let model = S3GlobalSettingModel::from_api(&settings);
        assert_eq!(model.bucket_size_readdir_heuristic, Field::Set(false));
        assert_eq!(model.service, Field::Null);
    }

    #[test]
    fn request_reproduces_settable_fields() {
        let settings = S3GlobalSettings {
            bucket_size_readdir_heuristic: Some(true),
            http_port: Some(9020),
            https_only: Some(false),
            https_port: Some(9021),
            service: Some(true),
        };
        let model = S3GlobalSettingModel::from_api(&settings);
        assert_eq!(model.to_request(), settings);

        let state = model.to_state().unwrap();
        assert_eq!(S3GlobalSettingModel::from_state(&state).unwrap(), model);
    }

    #[test]
    fn unknown_values_are_not_submitted() {
        let plan = DynamicValue::decode_json(
            br#"{"id": "__unknown__", "service": true, "http_port": "__unknown__"}"#,
        )
        .unwrap();
        let request = S3GlobalSettingModel::from_state(&plan).unwrap().to_request();
        assert_eq!(
            request,
            S3GlobalSettings {
                service: Some(true),
                ..Default::default()
            }
        );
    }

    #[test]
    fn detects_port_conflict() {
        let model = S3GlobalSettingModel {
            http_port: Field::Set(9020),
            https_port: Field::Set(9020),
            ..Default::default()
        };
        assert_eq!(model.port_conflict(), Some(9020));
        let model = S3GlobalSettingModel {
            http_port: Field::Set(9020),
            https_port: Field::Unknown,
            ..Default::default()
        };
        assert_eq!(model.port_conflict(), None);
    }
}
