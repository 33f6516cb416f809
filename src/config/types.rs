use std::path::PathBuf;

use serde::Deserialize;

/// Optional values for every `serve` option. Keys mirror the long flag names.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ConfigFile {
    pub listen: Option<String>,
    pub iterations: Option<u32>,
    pub rate: Option<u32>,
    pub clients: Option<u32>,
    pub no_nagle: Option<bool>,
    pub send_buffer: Option<u32>,
    pub recv_buffer: Option<u32>,
    pub fan_out: Option<u32>,
    pub fan_in: Option<u32>,
    pub histogram_file: Option<PathBuf>,
    pub jitter: Option<u32>,
    pub schedule: Option<u32>,
    pub report_delay: Option<bool>,
    pub histogram_bins: Option<usize>,
}
