use super::types::HeimdallConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

/// Service whose bind address the plain `HOST` / `PORT` variables target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Prediction,
    Simulator,
}

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    config_file: Option<PathBuf>,
    load_env: bool,
    service: Option<Service>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            config_file: None,
            load_env: false,
            service: None,
        }
    }

    /// Load configuration from file
    pub fn load_from_file(mut self, path: Option<&Path>) -> Self {
        self.config_file = path.map(Path::to_path_buf);
        self
    }

    /// Load configuration from `HEIMDALL_*` environment variables
    pub fn load_from_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Apply `HOST` / `PORT` to the given service
    pub fn for_service(mut self, service: Service) -> Self {
        self.service = Some(service);
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<HeimdallConfig> {
        let mut builder = Config::builder().add_source(
            Config::try_from(&HeimdallConfig::default())
                .context("Failed to serialize default configuration")?,
        );

        if let Some(config_path) = &self.config_file {
            // An explicitly named file must exist.
            builder = builder.add_source(File::from(config_path.as_path()).required(true));
        } else {
            builder = builder
                .add_source(File::with_name("heimdall").required(false))
                .add_source(File::with_name("config/heimdall").required(false));
        }

        if self.load_env {
            builder = builder.add_source(
                Environment::with_prefix("HEIMDALL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let mut config: HeimdallConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if let Some(service) = self.service {
            apply_host_port(
                &mut config,
                service,
                std::env::var("HOST").ok(),
                std::env::var("PORT").ok(),
            )?;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Override the bind address of `service` with `HOST` / `PORT` values
pub fn apply_host_port(
    config: &mut HeimdallConfig,
    service: Service,
    host: Option<String>,
    port: Option<String>,
) -> Result<()> {
    let port = port
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            p.trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {:?}", p))
        })
        .transpose()?;
    let host = host.filter(|h| !h.trim().is_empty());

    let (current_host, current_port) = match service {
        Service::Prediction => (&mut config.prediction.host, &mut config.prediction.port),
        Service::Simulator => (&mut config.simulator.host, &mut config.simulator.port),
    };

    if let Some(host) = host {
        *current_host = host.trim().to_string();
    }
    if let Some(port) = port {
        *current_port = port;
    }

    Ok(())
}
