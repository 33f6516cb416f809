use std::net::SocketAddr;
use std::path::PathBuf;

use crate::args::PositiveUsize;
use crate::peer::PeerOptions;
use crate::session::RunSettings;

pub(in crate::entry) struct ServePlan {
    pub(super) listen: SocketAddr,
    pub(super) settings: RunSettings,
    pub(super) histogram_file: Option<PathBuf>,
    pub(super) histogram_bins: PositiveUsize,
}

pub(in crate::entry) enum RunPlan {
    Serve(ServePlan),
    Peer(PeerOptions),
}
