use clap::ArgMatches;

use crate::args::{Command, IncastArgs};
use crate::config::{apply_config, load_config};
use crate::error::AppResult;

use super::types::{RunPlan, ServePlan};

pub(crate) fn build_plan(args: IncastArgs, matches: &ArgMatches) -> AppResult<RunPlan> {
    match args.command {
        Command::Serve(mut serve) => {
            if let Some(config) = load_config(serve.config.as_deref())? {
                let fallback = ArgMatches::default();
                let serve_matches = matches.subcommand_matches("serve").unwrap_or(&fallback);
                apply_config(&mut serve, serve_matches, &config)?;
            }
            let settings = serve.run_settings()?;
            Ok(RunPlan::Serve(ServePlan {
                listen: serve.listen,
                settings,
                histogram_file: serve.histogram_file,
                histogram_bins: serve.histogram_bins,
            }))
        }
        Command::Peer(peer) => Ok(RunPlan::Peer(peer.options())),
    }
}
