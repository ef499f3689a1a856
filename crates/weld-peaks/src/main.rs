mod bootstrap;

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use weld_core::settings::Settings;
use weld_data::report::BatchReport;
use weld_runtime::orchestrator::BatchOrchestrator;
use weld_ui::chart::SvgChart;
use weld_ui::progress_bar::BatchProgressBar;
use weld_ui::summary::render_summary;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let settings = Settings::load()?;

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("weld-peaks v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Root: {}, mode: {}, jobs: {}",
        settings.root.display(),
        settings.mode,
        settings.jobs
    );

    let orchestrator = BatchOrchestrator::new(
        settings.root.clone(),
        settings.batch_options(),
        usize::from(settings.jobs),
    );
    let (mut rx, handle) = orchestrator.start();

    let quiet = settings.quiet;
    let progress = async move {
        let mut drawn = false;
        while let Some(event) = rx.recv().await {
            if !quiet {
                let line = BatchProgressBar::from_event(&event).to_line();
                eprint!("\r{line}");
                let _ = std::io::stderr().flush();
                drawn = true;
            }
        }
        if drawn {
            eprintln!();
        }
    };

    // The channel closes when the batch task ends, so the progress loop
    // finishes right before the handle resolves.
    tokio::select! {
        _ = progress => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; aborting batch");
            handle.abort();
            eprintln!();
            return Ok(ExitCode::from(130));
        }
    }

    let analysis = match handle.wait().await {
        Ok(analysis) => analysis,
        Err(err) => {
            tracing::error!(kind = err.kind(), "batch failed: {err}");
            eprintln!("error: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let chart_path = settings.chart_path();
    SvgChart::default()
        .write_to(&chart_path, analysis.summary.result(), &settings.chart_options())
        .with_context(|| format!("writing chart to {}", chart_path.display()))?;
    tracing::info!("Chart written to {}", chart_path.display());

    if let Some(report_path) = settings.report.as_ref() {
        BatchReport::new(&analysis)
            .write_to(report_path)
            .with_context(|| format!("writing report to {}", report_path.display()))?;
        tracing::info!("Report written to {}", report_path.display());
    }

    if !settings.quiet {
        eprintln!("{}", render_summary(&analysis));
        eprintln!("Chart: {}", chart_path.display());
    }

    Ok(ExitCode::SUCCESS)
}
