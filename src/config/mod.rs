//! Site configuration management for `blogd.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[build]`   | Content paths, pagination, markdown, reload key  |
//! | `[serve]`   | HTTP server (interface, port, workers)           |
//!
//! # Example
//!
//! ```toml
//! [build]
//! content = "content"
//! per_page = 5
//!
//! [serve]
//! port = 8080
//! ```

mod build;
pub mod defaults;
mod error;
mod serve;

pub use build::BuildConfig;
pub use error::ConfigError;
pub use serve::ServeConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::IpAddr,
    path::{Path, PathBuf},
};

/// Root configuration structure representing blogd.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Project root (set after loading)
    #[serde(skip)]
    pub root: PathBuf,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// HTTP server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Resolve, override and validate the configuration for a CLI invocation.
    ///
    /// A missing config file is not an error; defaults apply.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;

        Ok(config)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("./"));

        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.public, cli.public.as_ref());

        let args = cli.build_args();
        Self::update_option(&mut self.build.per_page, args.per_page.as_ref());
        Self::update_option(&mut self.build.markdown, args.markdown.as_ref());

        if let Commands::Serve {
            interface,
            port,
            workers,
            ..
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.workers, workers.as_ref());
        }

        self.update_path_with_root(&root, &cli.config);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve every path against the root and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path, config: &Path) {
        let root = Self::normalize_path(root);

        self.config_path = Self::normalize_path(&root.join(config));
        self.build.content = Self::normalize_path(&root.join(&self.build.content));
        self.build.public = Self::normalize_path(&root.join(&self.build.public));
        self.root = root;
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.build.per_page == 0 {
            bail!(ConfigError::Validation(
                "[build.per_page] must be at least 1".into()
            ));
        }

        if self.build.reload_query.is_empty() {
            bail!(ConfigError::Validation(
                "[build.reload_query] must not be empty".into()
            ));
        }

        if self.serve.workers == 0 {
            bail!(ConfigError::Validation(
                "[serve.workers] must be at least 1".into()
            ));
        }

        if self.serve.interface.parse::<IpAddr>().is_err() {
            bail!(ConfigError::Validation(format!(
                "[serve.interface] `{}` is not an IP address",
                self.serve.interface
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn parse_cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("blogd").chain(args.iter().copied()))
    }

    #[test]
    fn test_from_str() {
        let config = SiteConfig::from_str(
            r#"
            [build]
            per_page = 4
            [serve]
            workers = 2
        "#,
        )
        .unwrap();

        assert_eq!(config.build.per_page, 4);
        assert_eq!(config.serve.workers, 2);
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = SiteConfig::from_str("[build\nper_page = 4");
        let err = result.unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = SiteConfig::from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Io(..))
        ));
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let config = r#"
            [deploy]
            provider = "github"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_defaults() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_per_page() {
        let mut config = SiteConfig::default();
        config.build.per_page = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("[build.per_page]"));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = SiteConfig::default();
        config.serve.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_reload_query() {
        let mut config = SiteConfig::default();
        config.build.reload_query = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_interface() {
        let mut config = SiteConfig::default();
        config.serve.interface = "localhost:80".into();
        assert!(config.validate().is_err());

        config.serve.interface = "::1".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_without_config_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = parse_cli(&["--root", root, "build"]);

        let config = SiteConfig::load(&cli).unwrap();
        let root = dir.path().canonicalize().unwrap();

        assert_eq!(config.root, root);
        assert_eq!(config.build.content, root.join("content"));
        assert_eq!(config.build.public, root.join("public"));
        assert_eq!(config.config_path, root.join("blogd.toml"));
        assert_eq!(config.build.per_page, 10);
    }

    #[test]
    fn test_load_cli_overrides_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("blogd.toml"),
            "[build]\nper_page = 4\nmarkdown = true\n[serve]\nport = 9000\n",
        )
        .unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = parse_cli(&[
            "--root", root, "-c", "site", "serve", "--per-page", "2", "--markdown", "false", "-P",
            "8081",
        ]);

        let config = SiteConfig::load(&cli).unwrap();

        assert_eq!(config.build.per_page, 2);
        assert!(!config.build.markdown);
        assert_eq!(config.serve.port, 8081);
        assert_eq!(config.serve.workers, 4);
        assert!(config.build.content.ends_with("site"));
    }

    #[test]
    fn test_load_keeps_file_values_without_flags() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blogd.toml"), "[serve]\nport = 9000\n").unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = parse_cli(&["--root", root, "serve"]);

        let config = SiteConfig::load(&cli).unwrap();
        assert_eq!(config.serve.port, 9000);
    }

    #[test]
    fn test_load_rejects_invalid_cli_value() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = parse_cli(&["--root", root, "serve", "-w", "0"]);

        assert!(SiteConfig::load(&cli).is_err());
    }
}
