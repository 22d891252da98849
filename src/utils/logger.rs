use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug)]
pub struct StructuredLogger;

impl StructuredLogger {
    pub fn log_business_event(
        &self,
        event_name: &str,
        user_id: Option<&str>,
        metadata: HashMap<String, serde_json::Value>,
    ) {
        let mut log_entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event_type": "business_event",
            "event_name": event_name,
            "user_id": user_id,
            "service": "student-records-backend"
        });

        for (key, value) in metadata {
            log_entry[key] = value;
        }

        info!("{}", log_entry);
    }

    pub fn log_auth_denied(&self, action: &str, reason: &str, user_id: Option<&str>) {
        let log_entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event_type": "auth_denied",
            "action": action,
            "reason": reason,
            "user_id": user_id,
            "service": "student-records-backend"
        });

        warn!("{}", log_entry);
    }
}

pub static LOGGER: StructuredLogger = StructuredLogger;
