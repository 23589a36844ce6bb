use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "api": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "base_url": { "type": "string", "pattern": "^https?://" },
                    "user_agent": { "type": "string", "minLength": 1 }
                }
            },
            "dashboard": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "recent_scans": { "type": "integer", "minimum": 1 }
                }
            },
            "web_applications": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "scan_on_create": { "type": "boolean" }
                }
            },
            "display": {
                "type": "object",
                "additionalProperties": false,
                "properties": {
                    "color": { "type": "boolean" },
                    "date_format": { "type": "string", "minLength": 1 }
                }
            }
        }
    })
});
