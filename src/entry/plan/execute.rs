use std::future::Future;

use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult, SessionError};
use crate::peer::run_peer;
use crate::report::{build_report, report_lines, write_histogram_dump};
use crate::session::{RunOutcome, accept_peers, bind_listener, run_session};
use crate::system::SystemTcpStats;

use super::types::{RunPlan, ServePlan};

pub(crate) async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    match plan {
        RunPlan::Serve(plan) => run_serve(plan).await,
        RunPlan::Peer(options) => run_peer(&options).await,
    }
}

async fn run_serve(plan: ServePlan) -> AppResult<()> {
    let listener = bind_listener(plan.listen).await?;
    let tuning = plan.settings.tuning();
    match plan.settings.client_limit {
        Some(limit) => info!(
            "Waiting for {} peer(s); press Enter to start with fewer.",
            limit
        ),
        None => info!("Waiting for peers; press Enter to start the test."),
    }

    let begin = begin_on_enter()?;
    let peers = match accept_peers(&listener, plan.settings.client_limit, &tuning, begin).await {
        Ok(peers) => peers,
        Err(AppError::Session(SessionError::NoPeers)) => {
            warn!("No peers connected; nothing to run.");
            return Ok(());
        }
        Err(err) => return Err(err),
    };
    drop(listener);

    let settings = plan.settings.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        run_session(peers, &settings, &SystemTcpStats::new())
    })
    .await??;

    // Measurements are valid at this point; a reporting failure must not fail the run.
    if let Err(err) = report_run(&plan, &outcome).await {
        error!("Failed to report results: {}", err);
    }
    Ok(())
}

async fn report_run(plan: &ServePlan, outcome: &RunOutcome) -> AppResult<()> {
    let report = build_report(outcome)?;
    for line in report_lines(&outcome.parameters, &report, outcome.ticks_per_second)? {
        println!("{}", line);
    }

    if let Some(path) = plan.histogram_file.as_deref() {
        write_histogram_dump(
            path,
            &report.latency,
            outcome.ticks_per_second,
            plan.histogram_bins.get(),
        )
        .await?;
        info!("Histograms written to {}.", path.display());
    }
    Ok(())
}

/// Resolves when the operator presses Enter. A closed stdin never resolves,
/// leaving the peer limit as the only way to start.
fn begin_on_enter() -> AppResult<impl Future<Output = ()>> {
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    // Plain thread: a blocked stdin read must not hold up runtime shutdown.
    std::thread::Builder::new()
        .name("incast-begin".to_owned())
        .spawn(move || {
            let mut line = String::new();
            match std::io::stdin().read_line(&mut line) {
                Ok(read) if read > 0 => {
                    if tx.send(()).is_err() {
                        debug!("Begin signal arrived after the accept phase closed.");
                    }
                }
                Ok(_) => debug!("Stdin closed; waiting for the peer limit."),
                Err(err) => debug!("Failed to read stdin: {}", err),
            }
        })?;
    Ok(async move {
        if rx.await.is_err() {
            std::future::pending::<()>().await;
        }
    })
}
