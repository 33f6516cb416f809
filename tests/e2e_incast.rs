mod support;

use std::fs;

use incast::protocol::DelayMode;
use incast::report::{build_report, report_lines};
use incast::session::{RunOutcome, RunSettings};
use tempfile::tempdir;

use support::{finish, free_port, run_loopback, spawn_incast};

const TICKS_PER_MILLI: u64 = 1_000_000;

fn round_spans(outcome: &RunOutcome, round: usize) -> Result<(u64, u64), String> {
    let mut first_start = u64::MAX;
    let mut last_stop = 0;
    let mut last_exclusive_stop = 0;
    for peer in &outcome.peers {
        let measurement = peer
            .measurements
            .get(round)
            .ok_or_else(|| format!("peer {} missing round {}", peer.identity, round))?;
        first_start = first_start.min(measurement.start);
        last_stop = last_stop.max(measurement.stop);
        last_exclusive_stop = last_exclusive_stop.max(measurement.exclusive_stop());
    }
    Ok((
        last_stop.saturating_sub(first_start),
        last_exclusive_stop.saturating_sub(first_start),
    ))
}

#[test]
fn e2e_three_peers_single_round() -> Result<(), String> {
    let settings = RunSettings {
        iterations: 1,
        fan_out_size: 64,
        fan_in_size: 64,
        ..RunSettings::default()
    };
    let outcome = run_loopback(settings, 3)?;

    if outcome.peers.len() != 3 {
        return Err(format!("expected 3 peers, got {}", outcome.peers.len()));
    }
    let mut starts = Vec::new();
    for peer in &outcome.peers {
        let [measurement] = peer.measurements.as_slice() else {
            return Err(format!(
                "peer {} recorded {} rounds",
                peer.identity,
                peer.measurements.len()
            ));
        };
        if measurement.stop <= measurement.start {
            return Err(format!("peer {} stop not after start", peer.identity));
        }
        starts.push(measurement.start);
    }
    let earliest = starts.iter().min().copied().unwrap_or_default();
    let latest = starts.iter().max().copied().unwrap_or_default();
    if latest.saturating_sub(earliest) > 500 * TICKS_PER_MILLI {
        return Err(format!(
            "peers started {} ticks apart",
            latest.saturating_sub(earliest)
        ));
    }

    let report = build_report(&outcome).map_err(|err| format!("report failed: {}", err))?;
    if report.latency.inclusive.sample_count() != 1 {
        return Err(format!(
            "expected 1 latency sample, got {}",
            report.latency.inclusive.sample_count()
        ));
    }
    if report.latency.exclusive.is_some() {
        return Err("exclusive latency without delay injection".to_owned());
    }
    Ok(())
}

#[test]
fn e2e_uniform_schedule_spreads_peers() -> Result<(), String> {
    let settings = RunSettings {
        iterations: 5,
        fan_out_size: 64,
        fan_in_size: 256,
        delay_us: 4_000,
        delay_mode: DelayMode::UniformScheduled,
        report_delay: true,
        ..RunSettings::default()
    };
    let outcome = run_loopback(settings, 4)?;

    for peer in &outcome.peers {
        let requested = u64::try_from(peer.identity)
            .map_err(|err| format!("identity overflow: {}", err))?
            .saturating_mul(TICKS_PER_MILLI);
        for measurement in &peer.measurements {
            if measurement.applied_delay < requested {
                return Err(format!(
                    "peer {} slept {} ticks, requested {}",
                    peer.identity, measurement.applied_delay, requested
                ));
            }
        }
    }

    for round in 0..5 {
        let (inclusive, exclusive) = round_spans(&outcome, round)?;
        if exclusive > inclusive {
            return Err(format!(
                "round {}: exclusive {} above inclusive {}",
                round, exclusive, inclusive
            ));
        }
    }

    let report = build_report(&outcome).map_err(|err| format!("report failed: {}", err))?;
    let exclusive = report
        .latency
        .exclusive
        .as_ref()
        .ok_or_else(|| "missing exclusive latency".to_owned())?;
    let delay = report
        .latency
        .delay
        .as_ref()
        .ok_or_else(|| "missing delay histogram".to_owned())?;
    if delay.sample_count() != 20 {
        return Err(format!("expected 20 delay samples, got {}", delay.sample_count()));
    }
    let exclusive_max = exclusive.max().map_err(|err| err.to_string())?;
    let inclusive_max = report.latency.inclusive.max().map_err(|err| err.to_string())?;
    if exclusive_max > inclusive_max {
        return Err(format!(
            "exclusive max {} above inclusive max {}",
            exclusive_max, inclusive_max
        ));
    }
    Ok(())
}

#[test]
fn e2e_rate_limited_run_tracks_target() -> Result<(), String> {
    let rate = 100;
    let settings = RunSettings {
        iterations: 5 * rate,
        rate_limit: Some(rate),
        fan_out_size: 64,
        fan_in_size: 64,
        ..RunSettings::default()
    };
    let outcome = run_loopback(settings, 2)?;
    let report = build_report(&outcome).map_err(|err| format!("report failed: {}", err))?;
    let throughput = report.throughput;

    if throughput.iterations_per_sec > f64::from(rate) * 1.05 {
        return Err(format!(
            "ran at {:.3} iter/sec, above target {}",
            throughput.iterations_per_sec, rate
        ));
    }
    if throughput.iterations_per_sec < f64::from(rate) * 0.9 {
        return Err(format!(
            "ran at {:.3} iter/sec, well below target {}",
            throughput.iterations_per_sec, rate
        ));
    }

    let lines = report_lines(&outcome.parameters, &report, outcome.ticks_per_second)
        .map_err(|err| format!("report lines failed: {}", err))?;
    let warned = lines.iter().any(|line| line.starts_with("Warning: missed target"));
    if warned != throughput.missed_target() {
        return Err(format!(
            "warning {} but missed_target {} at {:.3} iter/sec",
            warned,
            throughput.missed_target(),
            throughput.iterations_per_sec
        ));
    }
    Ok(())
}

#[test]
fn e2e_cli_serve_and_peers() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let histogram_path = dir.path().join("latency.csv");
    let port = free_port()?;
    let listen = format!("127.0.0.1:{}", port);
    let histogram_arg = histogram_path.to_string_lossy().into_owned();

    let serve = spawn_incast([
        "serve",
        "--listen",
        listen.as_str(),
        "-c",
        "2",
        "-n",
        "20",
        "-o",
        "128",
        "-i",
        "512",
        "-f",
        histogram_arg.as_str(),
        "--histogram-bins",
        "4",
    ])?;
    let peer_a = spawn_incast(["peer", listen.as_str(), "--once", "--reconnect-ms", "20"])?;
    let peer_b = spawn_incast(["peer", listen.as_str(), "--once", "--reconnect-ms", "20"])?;

    let output = finish(serve)?;
    finish(peer_a)?;
    finish(peer_b)?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    for expected in ["Test parameters:", "Latency:", "Throughput:", "Retransmits"] {
        if !stdout.contains(expected) {
            return Err(format!("missing '{}' in report:\n{}", expected, stdout));
        }
    }

    let dump = fs::read_to_string(&histogram_path)
        .map_err(|err| format!("read histogram file failed: {}", err))?;
    if !dump.starts_with("1000000000\n\n") || dump.contains("Inclusive") {
        return Err(format!("unexpected histogram file:\n{}", dump));
    }
    if dump.lines().count() != 6 {
        return Err(format!("expected 4 bins in histogram file:\n{}", dump));
    }
    Ok(())
}
