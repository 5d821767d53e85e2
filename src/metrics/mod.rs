//! Prometheus registry holding every exported gauge.

use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};

/// Labels shared by every per-monitor gauge.
pub const MONITOR_LABELS: [&str; 4] = ["id", "url", "name", "type"];

/// Exporter metrics. Construct once and share through an `Arc`.
pub struct Metrics {
    registry: Registry,
    pub up: Gauge,
    pub scrape_duration_milliseconds: Gauge,
    pub monitor_status: GaugeVec,
    pub monitor_response_time: GaugeVec,
    pub monitor_response_time_average: GaugeVec,
    pub monitor_log_type: GaugeVec,
    pub monitor_log_datetime: GaugeVec,
}

impl Metrics {
    /// Build a fresh registry with all gauges registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let up = Gauge::new("uptimerobot_up", "The last scrape was successful")?;
        let scrape_duration_milliseconds = Gauge::new(
            "uptimerobot_scrape_duration_milliseconds",
            "The duration of the last scrape in milliseconds",
        )?;

        let monitor_status = GaugeVec::new(
            Opts::new(
                "uptimerobot_monitor_status",
                "Status of the monitor: 0 = paused, 1 = not checked, 2 = up, 8 = seems down, 9 = down",
            ),
            &MONITOR_LABELS,
        )?;
        let monitor_response_time = GaugeVec::new(
            Opts::new(
                "uptimerobot_monitor_response_time_millisecond",
                "Last response time of the monitor in milliseconds",
            ),
            &with_extra(MONITOR_LABELS, "status"),
        )?;
        let monitor_response_time_average = GaugeVec::new(
            Opts::new(
                "uptimerobot_monitor_response_time_average_milliseconds",
                "Average response time of the monitor in milliseconds",
            ),
            &MONITOR_LABELS,
        )?;
        let monitor_log_type = GaugeVec::new(
            Opts::new(
                "uptimerobot_monitor_log_type",
                "Last log type of the monitor: 1 = down, 2 = up, 98 = started, 99 = paused",
            ),
            &MONITOR_LABELS,
        )?;
        let monitor_log_datetime = GaugeVec::new(
            Opts::new(
                "uptimerobot_monitor_log_datetime",
                "Last log of the monitor datetime",
            ),
            &with_extra(MONITOR_LABELS, "logtype"),
        )?;

        registry.register(Box::new(up.clone()))?;
        registry.register(Box::new(scrape_duration_milliseconds.clone()))?;
        registry.register(Box::new(monitor_status.clone()))?;
        registry.register(Box::new(monitor_response_time.clone()))?;
        registry.register(Box::new(monitor_response_time_average.clone()))?;
        registry.register(Box::new(monitor_log_type.clone()))?;
        registry.register(Box::new(monitor_log_datetime.clone()))?;

        Ok(Self {
            registry,
            up,
            scrape_duration_milliseconds,
            monitor_status,
            monitor_response_time,
            monitor_response_time_average,
            monitor_log_type,
            monitor_log_datetime,
        })
    }

    /// Encode every registered metric in the text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Append one label to the shared monitor labels.
pub fn with_extra<'a>(labels: [&'a str; 4], extra: &'a str) -> [&'a str; 5] {
    [labels[0], labels[1], labels[2], labels[3], extra]
}
