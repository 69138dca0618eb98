//! Command-line configuration.

use std::time::Duration;

use thiserror::Error;

/// Text shown for empty input.
pub const USAGE: &str = "\
Usage: calc [options] <expression>

Evaluates a calculator script, e.g. `calc 'x = 2; x ** 10'`.
Reads the script from stdin when no expression is given.

Options:
  --exact            Decimal arithmetic for numeric literals
  --timeout=SECS     Wall-clock limit for one evaluation (default: 5)
  --memory=MIB       Address-space ceiling for the worker, 0 for none (default: 256)
  --in-process       Evaluate without a worker process";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_MEMORY_LIMIT: u64 = 256 * 1024 * 1024;

/// Settings for one evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalcConfig {
    pub exact_mode: bool,
    pub timeout: Duration,
    /// Ceiling in bytes; `None` leaves the worker unlimited.
    pub memory_limit: Option<u64>,
    /// Run in a worker process rather than in the caller.
    pub isolated: bool,
}

impl Default for CalcConfig {
    fn default() -> Self {
        CalcConfig {
            exact_mode: false,
            timeout: DEFAULT_TIMEOUT,
            memory_limit: Some(DEFAULT_MEMORY_LIMIT),
            isolated: true,
        }
    }
}

/// A parsed command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub config: CalcConfig,
    /// Remaining words, joined with spaces to form the script.
    pub words: Vec<String>,
}

impl Invocation {
    pub fn script(&self) -> String {
        self.words.join(" ")
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
    #[error("invalid memory limit '{0}': expected a whole number of MiB")]
    InvalidMemory(String),
    #[error("unknown option '{0}'")]
    UnknownOption(String),
}

/// Parse flags up to the first word that is not one.
///
/// `--` ends the flags. Words with a single leading dash are part of the
/// script, so `calc -3 + 4` works.
pub fn parse_args(args: &[String]) -> Result<Invocation, ConfigError> {
    let mut config = CalcConfig::default();
    let mut rest = args;
    while let Some((arg, tail)) = rest.split_first() {
        if !arg.starts_with("--") {
            break;
        }
        rest = tail;
        if arg == "--" {
            break;
        }
        if arg == "--exact" {
            config.exact_mode = true;
        } else if arg == "--in-process" {
            config.isolated = false;
        } else if let Some(value) = arg.strip_prefix("--timeout=") {
            config.timeout = parse_timeout(value)?;
        } else if let Some(value) = arg.strip_prefix("--memory=") {
            let mib: u64 = value
                .parse()
                .map_err(|_| ConfigError::InvalidMemory(value.to_string()))?;
            config.memory_limit = match mib {
                0 => None,
                n => Some(
                    n.checked_mul(1024 * 1024)
                        .ok_or_else(|| ConfigError::InvalidMemory(value.to_string()))?,
                ),
            };
        } else {
            return Err(ConfigError::UnknownOption(arg.clone()));
        }
    }
    Ok(Invocation {
        config,
        words: rest.to_vec(),
    })
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidTimeout(value.to_string());
    let secs: f64 = value.parse().map_err(|_| invalid())?;
    if !(secs.is_finite() && secs > 0.0) {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(secs).map_err(|_| invalid())
}
