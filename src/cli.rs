//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// blogd: a blog engine that compiles templates into an in-memory cache and serves it
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root; relative paths below resolve against it
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: blogd.toml)
    #[arg(short = 'C', long, default_value = "blogd.toml")]
    pub config: PathBuf,

    /// Content directory path (relative to project root)
    #[arg(short, long)]
    pub content: Option<PathBuf>,

    /// Static file directory path (relative to project root)
    #[arg(short, long)]
    pub public: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared build arguments for Build and Serve commands
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Posts per index page
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Render the content section as markdown
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub markdown: Option<bool>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile every page once and report what was produced
    Build {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Also write every compiled page as an html file under this directory
        #[arg(long)]
        preview: Option<PathBuf>,
    },

    /// Compile every page, then serve the cache over HTTP
    Serve {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short = 'P', long)]
        port: Option<u16>,

        /// Number of request worker threads
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

impl Cli {
    pub fn build_args(&self) -> &BuildArgs {
        match &self.command {
            Commands::Build { build_args, .. } | Commands::Serve { build_args, .. } => build_args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::parse_from(["blogd", "-c", "site", "build", "--per-page", "3", "--preview", "out"]);

        assert_eq!(cli.content, Some(PathBuf::from("site")));
        assert_eq!(cli.config, PathBuf::from("blogd.toml"));
        assert_eq!(cli.build_args().per_page, Some(3));
        assert!(matches!(
            cli.command,
            Commands::Build { preview: Some(ref dir), .. } if dir == &PathBuf::from("out")
        ));
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["blogd", "serve", "-i", "0.0.0.0", "-P", "8080", "-w", "2", "--markdown", "false"]);

        assert_eq!(cli.build_args().markdown, Some(false));
        match cli.command {
            Commands::Serve { interface, port, workers, .. } => {
                assert_eq!(interface.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
                assert_eq!(workers, Some(2));
            }
            Commands::Build { .. } => panic!("expected serve"),
        }
    }

    #[test]
    fn test_markdown_flag_without_value() {
        let cli = Cli::parse_from(["blogd", "build", "--markdown"]);
        assert_eq!(cli.build_args().markdown, Some(true));
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["blogd", "-c", "site"]).is_err());
    }
}
