//! UptimeRobot API model types.

use serde::{Deserialize, Deserializer};

/// A monitor as returned by `getMonitors`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Monitor {
    pub id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "friendly_name", default)]
    pub name: String,
    #[serde(rename = "type")]
    pub monitor_type: i64,
    /// 0 = paused, 1 = not checked, 2 = up, 8 = seems down, 9 = down
    #[serde(default)]
    pub status: Option<i64>,
    /// The API sends this as a decimal string ("236.000").
    #[serde(default, deserialize_with = "deserialize_opt_number")]
    pub average_response_time: Option<f64>,
    /// Most recent first.
    #[serde(default)]
    pub response_times: Vec<ResponseTime>,
    /// Most recent first.
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

/// A single response time sample.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseTime {
    /// Milliseconds
    pub value: f64,
}

/// A monitor log entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogEntry {
    /// 1 = down, 2 = up, 98 = started, 99 = paused
    #[serde(rename = "type")]
    pub log_type: i64,
    /// Unix timestamp
    pub datetime: i64,
}

/// Pagination block of a `getMonitors` page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
}

/// One decoded `getMonitors` page.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub monitors: Vec<Monitor>,
    pub pagination: Option<Pagination>,
}

impl Monitor {
    /// Label values shared by every per-monitor gauge: id, url, name, type.
    pub fn labels(&self) -> [String; 4] {
        [
            self.id.to_string(),
            self.url.clone(),
            self.name.clone(),
            self.monitor_type.to_string(),
        ]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn deserialize_opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::String(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_monitor_full_record() {
        let monitor: Monitor = serde_json::from_value(json!({
            "id": 777749809,
            "friendly_name": "Google",
            "url": "http://www.google.com",
            "type": 1,
            "status": 2,
            "average_response_time": "236.000",
            "response_times": [{"datetime": 1465440328, "value": 240}],
            "logs": [{"type": 2, "datetime": 1465440328, "duration": 42}]
        }))
        .unwrap();

        assert_eq!(monitor.name, "Google");
        assert_eq!(monitor.status, Some(2));
        assert_eq!(monitor.average_response_time, Some(236.0));
        assert_eq!(monitor.response_times[0].value, 240.0);
        assert_eq!(monitor.logs[0].log_type, 2);
        assert_eq!(
            monitor.labels(),
            ["777749809", "http://www.google.com", "Google", "1"].map(String::from)
        );
    }

    #[test]
    fn test_monitor_optional_fields_absent() {
        let monitor: Monitor = serde_json::from_value(json!({
            "id": 1,
            "friendly_name": "Bare",
            "url": "example.com",
            "type": 3
        }))
        .unwrap();

        assert_eq!(monitor.status, None);
        assert_eq!(monitor.average_response_time, None);
        assert!(monitor.response_times.is_empty());
        assert!(monitor.logs.is_empty());
    }

    #[test]
    fn test_average_response_time_accepts_number_and_garbage() {
        let numeric: Monitor = serde_json::from_value(json!({
            "id": 1, "type": 1, "average_response_time": 12.5
        }))
        .unwrap();
        assert_eq!(numeric.average_response_time, Some(12.5));

        let garbage: Monitor = serde_json::from_value(json!({
            "id": 1, "type": 1, "average_response_time": ""
        }))
        .unwrap();
        assert_eq!(garbage.average_response_time, None);
    }

    #[test]
    fn test_page_without_pagination() {
        let page: Page = serde_json::from_value(json!({"stat": "ok", "monitors": []})).unwrap();
        assert!(page.pagination.is_none());
    }
}
