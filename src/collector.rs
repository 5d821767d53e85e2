//! Collection cycle: fetch every monitor and export it as gauges.

use crate::api::{Monitor, Params, ReadApi};
use crate::metrics::{with_extra, Metrics};

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;

/// Runs collection cycles against the API and updates the shared metrics.
pub struct Collector {
    api: ReadApi,
    metrics: Arc<Metrics>,
}

impl Collector {
    pub fn new(api: ReadApi, metrics: Arc<Metrics>) -> Self {
        Self { api, metrics }
    }

    /// Run one collection cycle.
    ///
    /// Never fails: API and transport errors only flip `uptimerobot_up` to 0
    /// and leave previously exported monitor series in place.
    pub async fn collect(&self) {
        let start = Instant::now();
        tracing::info!("Starting scraping at {}", Utc::now().to_rfc3339());

        match self.api.get_all(&api_params()).await {
            Ok((true, monitors)) => {
                tracing::debug!("Got {} monitors from the UptimeRobot API", monitors.len());
                for monitor in &monitors {
                    self.export_monitor(monitor);
                }
                self.metrics.up.set(1.0);
            }
            Ok((false, partial)) => {
                tracing::error!(
                    "Unable to get monitors from the API ({} fetched before the failure)",
                    partial.len()
                );
                self.metrics.up.set(0.0);
            }
            Err(e) => {
                tracing::error!("Unable to get monitors from the API: {}", e);
                self.metrics.up.set(0.0);
            }
        }

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.metrics.scrape_duration_milliseconds.set(duration_ms);
        tracing::info!("Scrape complete in {:.3} milliseconds", duration_ms);
    }

    /// Export a single monitor. Gauges whose source field is missing are
    /// left alone rather than set to a placeholder.
    pub fn export_monitor(&self, monitor: &Monitor) {
        tracing::debug!("Exporting {} metrics", monitor.name);

        let [id, url, name, monitor_type] = monitor.labels();
        let labels = [id.as_str(), url.as_str(), name.as_str(), monitor_type.as_str()];

        if let Some(status) = monitor.status {
            self.metrics
                .monitor_status
                .with_label_values(&labels)
                .set(status as f64);

            // The series is keyed by status, so it needs one to exist.
            if let Some(sample) = monitor.response_times.first() {
                let status = status.to_string();
                self.metrics
                    .monitor_response_time
                    .with_label_values(&with_extra(labels, &status))
                    .set(sample.value);
            }
        }

        if let Some(average) = monitor.average_response_time {
            self.metrics
                .monitor_response_time_average
                .with_label_values(&labels)
                .set(average);
        }

        if let Some(log) = monitor.logs.first() {
            self.metrics
                .monitor_log_type
                .with_label_values(&labels)
                .set(log.log_type as f64);

            let log_type = log.log_type.to_string();
            self.metrics
                .monitor_log_datetime
                .with_label_values(&with_extra(labels, &log_type))
                .set(log.datetime as f64);
        }
    }
}

/// Ask for the latest response time and log entry of each monitor.
fn api_params() -> Params {
    [
        ("response_times", "1"),
        ("response_times_limit", "1"),
        ("logs", "1"),
        ("logs_limit", "1"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GOOGLE: [&str; 4] = ["777749809", "http://www.google.com", "Google", "1"];

    fn google(status: i64) -> Value {
        json!({
            "id": 777749809,
            "friendly_name": "Google",
            "url": "http://www.google.com",
            "type": 1,
            "status": status,
            "average_response_time": "236.000",
            "response_times": [{"datetime": 1465440328, "value": 240}],
            "logs": [{"type": 2, "datetime": 1465440300, "duration": 28}]
        })
    }

    fn single_page(monitors: Vec<Value>) -> Value {
        json!({
            "stat": "ok",
            "pagination": {"offset": 0, "limit": 50, "total": monitors.len()},
            "monitors": monitors
        })
    }

    async fn respond_with(server: &MockServer, body: Value) {
        server.reset().await;
        Mock::given(method("POST"))
            .and(path("/getMonitors"))
            .and(body_string_contains("response_times_limit=1"))
            .and(body_string_contains("logs_limit=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn setup() -> (MockServer, Arc<Metrics>, Collector) {
        let server = MockServer::start().await;
        let metrics = Arc::new(Metrics::new().unwrap());
        let collector = Collector::new(
            ReadApi::with_base_url("test-key", server.uri()),
            metrics.clone(),
        );
        (server, metrics, collector)
    }

    #[tokio::test]
    async fn test_collect_exports_every_gauge() {
        let (server, metrics, collector) = setup().await;
        respond_with(&server, single_page(vec![google(2)])).await;

        collector.collect().await;

        assert_eq!(metrics.up.get(), 1.0);
        assert!(metrics.scrape_duration_milliseconds.get() > 0.0);
        assert_eq!(metrics.monitor_status.with_label_values(&GOOGLE).get(), 2.0);
        assert_eq!(
            metrics
                .monitor_response_time
                .with_label_values(&with_extra(GOOGLE, "2"))
                .get(),
            240.0
        );
        assert_eq!(
            metrics
                .monitor_response_time_average
                .with_label_values(&GOOGLE)
                .get(),
            236.0
        );
        assert_eq!(metrics.monitor_log_type.with_label_values(&GOOGLE).get(), 2.0);
        assert_eq!(
            metrics
                .monitor_log_datetime
                .with_label_values(&with_extra(GOOGLE, "2"))
                .get(),
            1465440300.0
        );
    }

    #[tokio::test]
    async fn test_missing_fields_are_skipped_not_defaulted() {
        let (server, metrics, collector) = setup().await;
        respond_with(
            &server,
            single_page(vec![json!({
                "id": 42,
                "friendly_name": "Bare",
                "url": "bare.example.com",
                "type": 3,
                "status": 9,
                "response_times": [],
                "logs": []
            })]),
        )
        .await;

        collector.collect().await;

        let text = metrics.render().unwrap();
        assert_eq!(metrics.up.get(), 1.0);
        assert!(text.contains("uptimerobot_monitor_status{"));
        assert!(!text.contains("uptimerobot_monitor_response_time_millisecond{"));
        assert!(!text.contains("uptimerobot_monitor_response_time_average_milliseconds{"));
        assert!(!text.contains("uptimerobot_monitor_log_type{"));
        assert!(!text.contains("uptimerobot_monitor_log_datetime{"));
    }

    #[tokio::test]
    async fn test_missing_status_skips_status_series() {
        let (server, metrics, collector) = setup().await;
        let mut monitor = google(2);
        monitor.as_object_mut().unwrap().remove("status");
        respond_with(&server, single_page(vec![monitor])).await;

        collector.collect().await;

        let text = metrics.render().unwrap();
        assert!(!text.contains("uptimerobot_monitor_status{"));
        assert!(!text.contains("uptimerobot_monitor_response_time_millisecond{"));
        assert!(text.contains("uptimerobot_monitor_log_type{"));
    }

    #[tokio::test]
    async fn test_status_last_write_wins() {
        let (server, metrics, collector) = setup().await;

        respond_with(&server, single_page(vec![google(2)])).await;
        collector.collect().await;
        assert_eq!(metrics.monitor_status.with_label_values(&GOOGLE).get(), 2.0);

        respond_with(&server, single_page(vec![google(9)])).await;
        collector.collect().await;
        assert_eq!(metrics.monitor_status.with_label_values(&GOOGLE).get(), 9.0);
    }

    #[tokio::test]
    async fn test_api_failure_sets_down_and_skips_export() {
        let (server, metrics, collector) = setup().await;
        respond_with(
            &server,
            json!({"stat": "fail", "error": {"type": "invalid_parameter", "message": "api_key is invalid."}}),
        )
        .await;

        collector.collect().await;

        assert_eq!(metrics.up.get(), 0.0);
        assert!(metrics.scrape_duration_milliseconds.get() > 0.0);
        assert!(!metrics.render().unwrap().contains("uptimerobot_monitor_status{"));
    }

    #[tokio::test]
    async fn test_transport_error_keeps_previous_series() {
        let (server, metrics, collector) = setup().await;
        respond_with(&server, single_page(vec![google(2)])).await;
        collector.collect().await;
        assert_eq!(metrics.up.get(), 1.0);

        let unreachable = Collector::new(
            ReadApi::with_base_url("test-key", "http://127.0.0.1:1"),
            metrics.clone(),
        );
        metrics.scrape_duration_milliseconds.set(0.0);
        unreachable.collect().await;

        assert_eq!(metrics.up.get(), 0.0);
        assert!(metrics.scrape_duration_milliseconds.get() > 0.0);
        assert_eq!(metrics.monitor_status.with_label_values(&GOOGLE).get(), 2.0);
        assert_eq!(metrics.monitor_log_type.with_label_values(&GOOGLE).get(), 2.0);
    }

    #[tokio::test]
    async fn test_partial_pagination_failure_exports_nothing() {
        let (server, metrics, collector) = setup().await;
        Mock::given(method("POST"))
            .and(body_string_contains("offset=0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "stat": "ok",
                "pagination": {"offset": 0, "limit": 1, "total": 2},
                "monitors": [google(2)]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("offset=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"stat": "fail"})))
            .mount(&server)
            .await;

        collector.collect().await;

        assert_eq!(metrics.up.get(), 0.0);
        assert!(!metrics.render().unwrap().contains("uptimerobot_monitor_status{"));
    }

    #[tokio::test]
    async fn test_overflowing_pagination_marks_down() {
        let (server, metrics, collector) = setup().await;
        respond_with(
            &server,
            json!({
                "stat": "ok",
                "pagination": {"offset": 1, "limit": u64::MAX, "total": 5},
                "monitors": [google(2)]
            }),
        )
        .await;

        collector.collect().await;

        assert_eq!(metrics.up.get(), 0.0);
        assert!(metrics.scrape_duration_milliseconds.get() > 0.0);
        assert!(!metrics.render().unwrap().contains("uptimerobot_monitor_status{"));
    }
}
