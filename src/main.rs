//! Command-line entry point for the load test report engine.
//!
//! Orchestrates the whole pipeline: parse arguments, load the result log
//! into a dataset, assemble the per-timer report, and hand the assembled
//! structures to the rendering collaborators. Log verbosity is controlled
//! via the `RUST_LOG` environment variable.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use loadtest_report::{
    cli::{Args, ReportConfig},
    render::{ChartRenderer, JsonTemplateEngine, NullChartRenderer, RenderContext, TemplateEngine},
    Dataset, ReportAssembler,
};
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = ReportConfig::from(&args);
    config.validate()?;

    info!(version = loadtest_report::VERSION, "starting report run");
    info!(?config, results_file = %args.results_file.display(), "configuration");

    let dataset = Dataset::from_csv(&args.results_file, config.run_time_limit)
        .with_context(|| format!("failed to load {}", args.results_file.display()))?;

    let report = ReportAssembler::new(&dataset, &config)
        .assemble()
        .context("failed to assemble report")?;

    // Console summary, mirroring the report header.
    println!("{}", format!("transactions: {}", report.data.total_transactions).white());
    let errors_line = format!("errors: {}", report.data.total_errors);
    if report.data.total_errors > 0 {
        println!("{}", errors_line.red());
    } else {
        println!("{}", errors_line.white());
    }
    println!();
    println!("test start:  {}", report.data.test_start);
    println!("test finish: {}", report.data.test_finish);
    println!();

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;
    let ctx = RenderContext::new(&config.output_dir);

    let charts = NullChartRenderer;
    for (timer, graphs) in &report.graphs {
        charts
            .render_timer_chart(&ctx, timer, graphs)
            .with_context(|| format!("failed to render chart for timer '{timer}'"))?;
    }

    JsonTemplateEngine::default()
        .render_report(&ctx, &report.data)
        .context("failed to write report document")?;

    info!(timers = report.data.timers.len(), "report run completed");
    Ok(())
}
