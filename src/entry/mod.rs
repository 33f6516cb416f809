mod plan;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::IncastArgs;
use crate::error::{AppError, AppResult, ValidationError};
use plan::{build_plan, execute_plan};

/// Parses the command line and runs the selected role to completion.
///
/// # Errors
///
/// Returns an error when arguments, config, or the run itself fail.
pub fn run() -> AppResult<()> {
    let (args, matches) = parse_args()?;

    crate::system::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|source| AppError::validation(ValidationError::RuntimeBuildFailed { source }))?;

    let result = runtime.block_on(run_async(args, &matches));
    if let Err(err) = &result {
        match err.peer() {
            Some(peer) => tracing::error!("Run failed at peer {}: {}", peer, err),
            None => tracing::error!("Run failed: {}", err),
        }
    }
    result
}

fn parse_args() -> AppResult<(IncastArgs, ArgMatches)> {
    let matches = IncastArgs::command().get_matches_from(std::env::args_os());
    let args = IncastArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

async fn run_async(args: IncastArgs, matches: &ArgMatches) -> AppResult<()> {
    let plan = build_plan(args, matches)?;
    execute_plan(plan).await
}
