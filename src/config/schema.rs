use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "service": {
                "type": "object",
                "properties": {
                    "base_url": { "type": "string", "format": "uri" },
                    "username": { "type": "string" },
                    "password": { "type": "string" },
                    "timeout_secs": { "type": "integer", "minimum": 1 }
                }
            },
            "behavior": {
                "type": "object",
                "properties": {
                    "verbose": { "type": "boolean" },
                    "stage_remote_workspace": { "type": "boolean" },
                    "fail_build": { "type": "boolean" },
                    "module_selection": { "type": "string", "enum": ["legacy", "strict"] },
                    "freshness": { "type": "string", "enum": ["marker", "remote"] },
                    "marker_file": { "type": "string" },
                    "staging_dir": { "type": "string" }
                }
            },
            "defaults": {
                "type": "object",
                "properties": {
                    "scan_frequency_days": { "type": "integer", "minimum": 0 },
                    "prescan_timeout_minutes": { "type": "integer", "minimum": 0 }
                }
            },
            "scan": {
                "type": "object",
                "properties": {
                    "includes": { "type": "string" },
                    "application_name": { "type": "string" },
                    "platform_name": { "type": "string" },
                    "scan_name": { "type": "string" },
                    "scan_frequency_days": { "type": "integer", "minimum": 0 },
                    "prescan_timeout_minutes": { "type": "integer", "minimum": 0 },
                    "triggers": { "$ref": "#/$defs/triggers" }
                }
            }
        },
        "$defs": {
            "triggers": {
                "type": "object",
                "properties": {
                    "manual": { "type": "boolean" },
                    "scm": { "type": "boolean" },
                    "timer": { "type": "boolean" }
                }
            }
        }
    })
});
