//! Canned control-plane responses

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde_json::json;

/// `incus list` table with two instances
pub const INSTANCE_TABLE: &str = "\
+------+---------+------+------+-----------------+-----------+
| NAME |  STATE  | IPV4 | IPV6 |      TYPE       | SNAPSHOTS |
+------+---------+------+------+-----------------+-----------+
| db1  | RUNNING |      |      | CONTAINER       | 1         |
+------+---------+------+------+-----------------+-----------+
| web1 | RUNNING |      |      | VIRTUAL-MACHINE | 2         |
+------+---------+------+------+-----------------+-----------+
";

/// Fixed clock for end-to-end scenarios
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
}

/// `created_at` as Incus renders it, with nanosecond digits
pub fn incus_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn days_before(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

pub fn instances_json(names: &[&str]) -> String {
    let records: Vec<_> = names
        .iter()
        .map(|name| json!({"name": name, "status": "Running", "type": "virtual-machine"}))
        .collect();
    serde_json::Value::Array(records).to_string()
}

pub fn snapshots_json(snapshots: &[(&str, &str)]) -> String {
    let records: Vec<_> = snapshots
        .iter()
        .map(|(name, created_at)| json!({"name": name, "created_at": created_at, "stateful": false}))
        .collect();
    serde_json::Value::Array(records).to_string()
}

/// `(name, project, content_type, used_by)` tuples as custom volumes
pub fn volumes_json(volumes: &[(&str, &str, &str, &[&str])]) -> String {
    let records: Vec<_> = volumes
        .iter()
        .map(|(name, project, content_type, used_by)| {
            json!({
                "name": name,
                "project": project,
                "type": "custom",
                "content_type": content_type,
                "used_by": used_by,
                "config": {}
            })
        })
        .collect();
    serde_json::Value::Array(records).to_string()
}
