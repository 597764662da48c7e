// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

pub const LINKS_CLASSIFIED: &str = "scholarrs_links_classified_total";
pub const SCHOLARSHIPS_SAVED: &str = "scholarrs_scholarships_saved_total";
pub const TASKS_COMPLETED: &str = "scholarrs_tasks_completed_total";
pub const TASKS_FAILED: &str = "scholarrs_tasks_failed_total";
pub const TASK_DURATION: &str = "scholarrs_task_duration_seconds";

pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        info!("Metrics exporter disabled");
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(
                "Invalid metrics address {}: {}. Metrics exporter not started",
                settings.listen_addr, e
            );
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    describe_counter!(
        LINKS_CLASSIFIED,
        "Total number of seed page links classified, by classification"
    );
    describe_counter!(
        SCHOLARSHIPS_SAVED,
        "Total number of scholarships persisted"
    );
    describe_counter!(TASKS_COMPLETED, "Total number of task runs completed");
    describe_counter!(TASKS_FAILED, "Total number of task runs failed");
    describe_histogram!(TASK_DURATION, "Duration of task runs in seconds");
}
