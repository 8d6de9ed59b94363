//! Launch configuration
//!
//! Resolves where the native runtime installation lives and which arguments
//! to forward to it.
//!
//! # Configuration sources (in priority order)
//!
//! 1. Command line: `-d <dir>`
//! 2. Environment variable: `VRLINK_DIR`
//!
//! Absence of both is fatal — the driver cannot guess an installation root.
//! The remaining flags (`-c <configName>`, `-f <configFile>`,
//! `-s <key=value>`) are not interpreted here; they are forwarded verbatim
//! to native init, which owns config parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming the runtime installation root
pub const ROOT_ENV_VAR: &str = "VRLINK_DIR";

/// Errors resolving the launch configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LaunchError {
    /// No installation root on the command line or in the environment
    #[error("no runtime directory given; pass -d <dir> or set VRLINK_DIR")]
    MissingRoot,

    /// A flag that expects a value was the last argument
    #[error("flag '{0}' expects a value")]
    MissingValue(String),
}

/// Resolved launch configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Native runtime installation root
    pub root: PathBuf,
    /// Arguments forwarded verbatim to native init
    pub passthrough: Vec<String>,
}

impl LaunchConfig {
    /// Resolve from the process arguments and environment
    pub fn from_env() -> Result<Self, LaunchError> {
        Self::parse(
            std::env::args().skip(1).collect(),
            std::env::var(ROOT_ENV_VAR).ok(),
        )
    }

    /// Resolve from an explicit argument vector and environment value
    ///
    /// The `-d` flag wins over the environment variable.
    pub fn parse(args: Vec<String>, env_root: Option<String>) -> Result<Self, LaunchError> {
        let mut root: Option<PathBuf> = None;
        let mut passthrough = Vec::new();

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-d" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| LaunchError::MissingValue("-d".into()))?;
                    root = Some(PathBuf::from(value));
                }
                "-c" | "-f" | "-s" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| LaunchError::MissingValue(arg.clone()))?;
                    passthrough.push(arg);
                    passthrough.push(value);
                }
                _ => passthrough.push(arg),
            }
        }

        let root = root
            .or_else(|| env_root.map(PathBuf::from))
            .ok_or(LaunchError::MissingRoot)?;

        Ok(Self { root, passthrough })
    }
}
