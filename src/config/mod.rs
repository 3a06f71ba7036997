//! Layered configuration: built-in defaults, optional TOML file,
//! `HEIMDALL_<SECTION>__<KEY>` environment variables and finally the plain
//! `HOST` / `PORT` variables for the service being launched.

mod loader;
mod types;

pub use loader::{apply_host_port, ConfigLoader, Service};
pub use types::*;

impl HeimdallConfig {
    /// Render an annotated sample configuration file
    pub fn sample_toml() -> crate::Result<String> {
        let body = toml::to_string_pretty(&HeimdallConfig::default())
            .map_err(|e| crate::Error::Config(e.to_string()))?;

        Ok(format!(
            r#"# heimdall configuration
#
# Save as heimdall.toml. Every key can be overridden from the environment,
# e.g. HEIMDALL_PREDICTION__MODEL_PATH=/srv/model.json. HOST and PORT apply
# to whichever service is being started.
#
# [simulator] fault_mode:
#   "toggle" - each inject_fault call flips the fault on or off
#   "latch"  - the first call sets the fault, later calls are refused
# [simulator] fault_marker: file created while a fault is active; creating it
#   externally also activates the fault.

{}"#,
            body
        ))
    }
}
