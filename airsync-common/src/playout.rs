//! Remote scheduler playout records
//!
//! Opaque payload from the remote broadcast scheduler. The sync core stores
//! and returns these untouched; no field is validated or normalized.

use serde::{Deserialize, Serialize};

/// One scheduled broadcast of a media file on the remote scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayoutRecord {
    /// Remote playout identifier
    pub playout_id: String,
    /// Remote show instance identifier
    pub instance_id: String,
    /// Remote media file identifier
    pub file_id: String,
    /// Scheduled start, ISO-8601 UTC
    pub starts_at: String,
    /// Scheduled end, ISO-8601 UTC
    pub ends_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_camel_case_payload() {
        let json = r#"{
            "playoutId": "p-1",
            "instanceId": "i-9",
            "fileId": "f-3",
            "startsAt": "2025-01-01T10:00:00Z",
            "endsAt": "2025-01-01T11:00:00Z"
        }"#;
        let record: PlayoutRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.playout_id, "p-1");
        assert_eq!(record.instance_id, "i-9");
        assert_eq!(record.file_id, "f-3");
        assert_eq!(record.starts_at, "2025-01-01T10:00:00Z");
    }

    #[test]
    fn test_values_pass_through_unvalidated() {
        let json = r#"{"playoutId":"","instanceId":"x","fileId":"y","startsAt":"not a date","endsAt":""}"#;
        let record: PlayoutRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.starts_at, "not a date");
        assert_eq!(serde_json::to_string(&record).unwrap(), json);
    }
}
