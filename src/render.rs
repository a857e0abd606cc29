//! Rendering collaborator seams.
//!
//! Chart rendering and report templating are external collaborators: the
//! engine only guarantees the series and data-dictionary contracts, never
//! pixel or markup content. Both traits take an explicit [`RenderContext`]
//! per report run; there is no process-wide mutable rendering state.

use crate::error::Result;
use crate::report::{ReportData, TimerGraphs};
use std::path::PathBuf;
use tracing::{debug, info};

/// Per-report rendering context.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub output_dir: PathBuf,
}

impl RenderContext {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

/// Image filename for one timer's stacked summary/detail/throughput chart.
pub fn chart_filename(timer: &str) -> String {
    format!("{timer}_response_times_intervals.png")
}

/// Renders one image per timer from its graph-ready series.
pub trait ChartRenderer {
    fn render_timer_chart(
        &self,
        ctx: &RenderContext,
        timer: &str,
        graphs: &TimerGraphs,
    ) -> Result<()>;
}

/// Produces the report document from the assembled data dictionary.
pub trait TemplateEngine {
    fn render_report(&self, ctx: &RenderContext, report: &ReportData) -> Result<()>;
}

/// Chart renderer that produces no images, only logs what it would have
/// rendered. Keeps the pipeline runnable without a plotting stack.
pub struct NullChartRenderer;

impl ChartRenderer for NullChartRenderer {
    fn render_timer_chart(
        &self,
        ctx: &RenderContext,
        timer: &str,
        graphs: &TimerGraphs,
    ) -> Result<()> {
        debug!(
            timer,
            samples = graphs.scatter.len(),
            target = %ctx.output_dir.join(chart_filename(timer)).display(),
            "skipping chart render (no chart backend configured)"
        );
        Ok(())
    }
}

/// Template engine that writes the report data dictionary as pretty-printed
/// JSON, suitable for downstream tooling or an external HTML templater.
pub struct JsonTemplateEngine {
    pub file_name: String,
}

impl Default for JsonTemplateEngine {
    fn default() -> Self {
        Self {
            file_name: crate::defaults::REPORT_FILE.to_string(),
        }
    }
}

impl TemplateEngine for JsonTemplateEngine {
    fn render_report(&self, ctx: &RenderContext, report: &ReportData) -> Result<()> {
        let path = ctx.output_dir.join(&self.file_name);
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;
        info!(path = %path.display(), "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn empty_report() -> ReportData {
        ReportData {
            total_transactions: 0,
            total_errors: 0,
            run_time: 60.0,
            rampup: 0.0,
            test_start: "2026-08-23 10:00:00".to_string(),
            test_finish: "2026-08-23 10:01:00".to_string(),
            timeseries_interval: 10.0,
            user_group_configs: vec![],
            timers: BTreeMap::new(),
        }
    }

    #[test]
    fn test_chart_filename_contract() {
        assert_eq!(
            chart_filename("Transactions"),
            "Transactions_response_times_intervals.png"
        );
    }

    #[test]
    fn test_json_template_engine_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RenderContext::new(dir.path());
        let engine = JsonTemplateEngine::default();

        engine.render_report(&ctx, &empty_report()).unwrap();

        let written = std::fs::read_to_string(dir.path().join("results.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["total_transactions"], 0);
        assert_eq!(value["timeseries_interval"], 10.0);
    }
}
