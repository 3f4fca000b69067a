//! Grafana dashboard provisioning.
//!
//! Static: one file provider pointing at the dashboard definitions mounted
//! into the Grafana container.

pub const DASHBOARD_DEFINITIONS_PATH: &str = "/grafana-dashboard-definitions/tidb";

pub const DASHBOARD_PROVISIONING: &str = r#"{
    "apiVersion": 1,
    "providers": [
        {
            "folder": "",
            "name": "0",
            "options": {
                "path": "/grafana-dashboard-definitions/tidb"
            },
            "orgId": 1,
            "type": "file"
        }
    ]
}"#;
