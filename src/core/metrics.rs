use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn attempt_started(resumed: bool) {
    let kind = if resumed { "resumed" } else { "new" };
    metrics::counter!("exam_attempts_started_total", "kind" => kind).increment(1);
}

pub(crate) fn attempt_submitted(score: Option<f64>) {
    metrics::counter!("exam_attempts_submitted_total").increment(1);
    if let Some(score) = score {
        metrics::histogram!("exam_attempt_score").record(score);
    }
}
