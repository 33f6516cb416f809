use std::ffi::OsStr;
use std::net::{SocketAddr, TcpListener};
use std::process::{Child, Command, Output, Stdio};
use std::time::Duration;

use incast::peer::{PeerOptions, run_peer};
use incast::session::{RunOutcome, RunSettings, accept_peers, bind_listener, run_session};
use incast::system::RetransmitCounter;

/// Counter for hosts without `/proc/net/snmp`-style statistics.
pub struct Unavailable;

impl RetransmitCounter for Unavailable {
    fn snapshot(&self) -> Option<u64> {
        None
    }
}

/// Runs one coordinator and `peer_count` peer clients in-process over
/// loopback and returns the coordinator's outcome.
///
/// # Errors
///
/// Returns an error when any side of the run fails.
pub fn run_loopback(settings: RunSettings, peer_count: u32) -> Result<RunOutcome, String> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("runtime build failed: {}", err))?;

    runtime.block_on(async move {
        let listen: SocketAddr = "127.0.0.1:0"
            .parse()
            .map_err(|err| format!("listen addr failed: {}", err))?;
        let listener = bind_listener(listen)
            .await
            .map_err(|err| format!("bind failed: {}", err))?;
        let server = listener
            .local_addr()
            .map_err(|err| format!("local addr failed: {}", err))?
            .to_string();

        let mut peers = Vec::new();
        for _ in 0..peer_count {
            let options = PeerOptions {
                server: server.clone(),
                once: true,
                reconnect: Duration::from_millis(10),
            };
            peers.push(tokio::spawn(async move { run_peer(&options).await }));
        }

        let accepted = accept_peers(
            &listener,
            Some(peer_count),
            &settings.tuning(),
            std::future::pending::<()>(),
        )
        .await
        .map_err(|err| format!("accept failed: {}", err))?;

        let outcome = tokio::task::spawn_blocking(move || {
            run_session(accepted, &settings, &Unavailable)
        })
        .await
        .map_err(|err| format!("session task failed: {}", err))?
        .map_err(|err| format!("session failed: {}", err))?;

        for peer in peers {
            peer.await
                .map_err(|err| format!("peer task failed: {}", err))?
                .map_err(|err| format!("peer failed: {}", err))?;
        }
        Ok(outcome)
    })
}

/// Reserves a loopback port by binding and releasing it.
///
/// # Errors
///
/// Returns an error if no port can be bound.
pub fn free_port() -> Result<u16, String> {
    let listener =
        TcpListener::bind("127.0.0.1:0").map_err(|err| format!("bind scratch listener failed: {}", err))?;
    listener
        .local_addr()
        .map(|addr| addr.port())
        .map_err(|err| format!("scratch addr failed: {}", err))
}

/// Starts the `incast` binary with stdin closed.
///
/// # Errors
///
/// Returns an error if the binary cannot be started.
pub fn spawn_incast<I, S>(args: I) -> Result<Child, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(incast_bin()?)
        .args(args)
        .env("INCAST_LOG", "error")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| format!("spawn incast failed: {}", err))
}

/// Waits for a spawned `incast` process and fails on a non-zero exit.
///
/// # Errors
///
/// Returns an error with the captured output when the process failed.
pub fn finish(child: Child) -> Result<Output, String> {
    let output = child
        .wait_with_output()
        .map_err(|err| format!("wait failed: {}", err))?;
    if !output.status.success() {
        return Err(format!(
            "stdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(output)
}

fn incast_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_incast").map_or_else(
        || Err("CARGO_BIN_EXE_incast missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
