//! Shared fixtures for integration tests.
#![allow(dead_code)]

use treemap_rust::models::{ConfigSchema, Record};

/// A building-monitoring style schema exercising all four color modes.
pub fn sample_config_json() -> &'static str {
    r##"{
        "id": {"label": "Building ID", "type": "identifier", "visible": true, "searchable": true},
        "name": {"label": "Name", "type": "text", "visible": true, "searchable": true},
        "squareMeters": {"label": "Area", "type": "numeric", "unit": "m2", "visible": true},
        "client": {
            "label": "Client", "type": "categorical", "visible": true,
            "colorMode": "categorical",
            "colors": {
                "Acme": {"bg": "#3B82F6", "border": "#2563EB"},
                "Globex": {"bg": "#F59E0B", "border": "#D97706"},
                "default": {"bg": "#6B7280", "border": "#4B5563"}
            }
        },
        "temperature": {
            "label": "Temperature", "type": "numeric", "unit": "°C", "decimals": 1, "visible": true,
            "colorMode": "bins",
            "bins": [
                {"min": -50, "max": 18, "label": "Cold", "color": "#3B82F6", "borderColor": "#2563EB"},
                {"min": 18, "max": 26, "label": "Comfort", "color": "#10B981", "borderColor": "#059669"},
                {"min": 26, "max": 100, "label": "Hot", "color": "#EF4444", "borderColor": "#DC2626"}
            ]
        },
        "online": {
            "label": "Online", "type": "boolean", "visible": true,
            "colorMode": "boolean",
            "colors": {
                "true": {"bg": "#0f0", "border": "#0a0", "label": "Online"},
                "false": {"bg": "#f00", "border": "#a00", "label": "Offline"}
            }
        },
        "efficiency": {
            "label": "Efficiency", "type": "percentage", "decimals": 1, "visible": true,
            "colorMode": "gradient",
            "colors": {
                "min": {"r": 0, "g": 0, "b": 0},
                "max": {"r": 255, "g": 255, "b": 255}
            }
        }
    }"##
}

pub fn sample_schema() -> ConfigSchema {
    serde_json::from_str(sample_config_json()).expect("fixture schema parses")
}

pub fn sample_records_json() -> &'static str {
    r#"[
        {"id": "B-1", "name": "North Plant", "squareMeters": 400.0, "client": "Acme",
         "temperature": 21.5, "online": true, "efficiency": 0.9},
        {"id": "B-2", "name": "South Plant", "squareMeters": 250.0, "client": "Globex",
         "temperature": 30.0, "online": false, "efficiency": 0.4},
        {"id": "B-3", "name": "Depot", "squareMeters": 150.0, "client": "Acme",
         "temperature": 12.0, "online": true, "efficiency": 0.65},
        {"id": "B-4", "name": "Annex", "squareMeters": 100.0, "client": "Initech",
         "temperature": 26.0, "online": false, "efficiency": 0.2}
    ]"#
}

pub fn sample_records() -> Vec<Record> {
    serde_json::from_str(sample_records_json()).expect("fixture records parse")
}
