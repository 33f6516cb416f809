pub mod logger;
pub mod tcpstats;

pub use logger::init_logging;
pub use tcpstats::{RetransmitCounter, SystemTcpStats, retransmit_delta};
