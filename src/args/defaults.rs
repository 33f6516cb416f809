/// Config files checked in the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["incast.toml", "incast.json"];

pub(crate) const DEFAULT_LISTEN: &str = "0.0.0.0:27779";
