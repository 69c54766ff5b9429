use serde::Serialize;

use crate::models::factor::DataQuality;

/// The uniform response envelope every read-side analytics endpoint returns
/// (§6): `available` reports whether a calculation exists for the requested
/// date, `data` carries the payload when it does, and `data_quality` is
/// populated on both success and documented-skip paths.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsResponse<T: Serialize> {
    pub available: bool,
    pub data: Option<T>,
    pub metadata: Option<serde_json::Value>,
    pub data_quality: Option<DataQuality>,
}

impl<T: Serialize> AnalyticsResponse<T> {
    pub fn found(data: T, data_quality: Option<DataQuality>) -> Self {
        Self {
            available: true,
            data: Some(data),
            metadata: None,
            data_quality,
        }
    }

    pub fn skipped(data_quality: DataQuality) -> Self {
        Self {
            available: false,
            data: None,
            metadata: None,
            data_quality: Some(data_quality),
        }
    }

    pub fn not_run() -> Self {
        Self {
            available: false,
            data: None,
            metadata: None,
            data_quality: None,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
