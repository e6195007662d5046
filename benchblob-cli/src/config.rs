//! Configuration for the benchblob CLI.
//!
//! Configuration can be loaded from multiple sources with the following
//! precedence (highest to lowest):
//!
//! 1. Environment variables (prefixed with `BB__`)
//! 2. YAML configuration file (specified via `-c` or `--config` flag)
//! 3. Defaults
//!
//! Environment variables use `BB__` as a prefix and double underscores (`__`)
//! to denote nested configuration structures. For example:
//!
//! - `BB__OUTPUT_DIR=/srv/www/files` sets the output directory
//! - `BB__STRATEGY=rng` forces the in-process RNG strategy
//! - `BB__LOGGING__LEVEL=DEBUG` raises the log level
//!
//! The same configuration in YAML:
//!
//! ```yaml
//! output_dir: /srv/www/files
//! strategy: rng
//!
//! logging:
//!   level: DEBUG
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use bytesize::ByteSize;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use benchblob_service::capabilities::Capabilities;
use benchblob_service::generate::Strategy;
use benchblob_service::sizes;
use benchblob_service::GeneratorError;

/// Environment variable prefix for all configuration options.
const ENV_PREFIX: &str = "BB__";

/// Which generation strategy to use.
///
/// # Default
///
/// `auto`
///
/// # Environment Variable
///
/// `BB__STRATEGY`
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyChoice {
    /// Use openssl when the host supports it, otherwise the in-process RNG.
    Auto,
    /// Force the openssl strategy; an error if the host cannot run it.
    OpenSsl,
    /// Force the in-process RNG strategy.
    Rng,
}

impl StrategyChoice {
    /// Resolves the choice against the detected host capabilities.
    pub fn resolve(self, caps: &Capabilities) -> Result<Strategy, GeneratorError> {
        match self {
            Self::Auto if caps.supports_openssl() => Ok(Strategy::OpenSsl),
            Self::Auto => Ok(Strategy::Rng),
            Self::OpenSsl if caps.supports_openssl() => Ok(Strategy::OpenSsl),
            Self::OpenSsl => Err(GeneratorError::OpenSslUnavailable),
            Self::Rng => Ok(Strategy::Rng),
        }
    }
}

/// Log output format.
///
/// The format can be explicitly specified or auto-detected based on whether
/// output is to a TTY.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Auto detect the best format.
    ///
    /// This chooses [`LogFormat::Pretty`] for TTY, otherwise
    /// [`LogFormat::Simplified`].
    Auto,

    /// Pretty printing with colors.
    Pretty,

    /// Simplified plain text output.
    Simplified,

    /// Dump out JSON lines.
    Json,
}

/// The logging format parse error.
#[derive(Clone, Debug)]
pub struct FormatParseError(String);

impl fmt::Display for FormatParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"error parsing "{}" as format: expected one of "auto", "pretty", "simplified", "json""#,
            self.0
        )
    }
}

impl std::str::FromStr for LogFormat {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let result = match s {
            "" => LogFormat::Auto,
            s if s.eq_ignore_ascii_case("auto") => LogFormat::Auto,
            s if s.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            s if s.eq_ignore_ascii_case("simplified") => LogFormat::Simplified,
            s if s.eq_ignore_ascii_case("json") => LogFormat::Json,
            s => return Err(FormatParseError(s.into())),
        };

        Ok(result)
    }
}

impl std::error::Error for FormatParseError {}

mod display_fromstr {
    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
        T: std::fmt::Display,
    {
        serializer.collect_str(&value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: std::str::FromStr,
        <T as std::str::FromStr>::Err: std::fmt::Display,
    {
        use serde::Deserialize;
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Logging configuration.
///
/// Controls the verbosity and format of log output. Logs are always written
/// to stderr.
#[derive(Debug, Deserialize, Serialize)]
pub struct Logging {
    /// Minimum log level to output.
    ///
    /// The `RUST_LOG` environment variable provides more granular control per
    /// module if needed.
    ///
    /// # Default
    ///
    /// `INFO`
    ///
    /// # Environment Variable
    ///
    /// `BB__LOGGING__LEVEL`
    #[serde(with = "display_fromstr")]
    pub level: LevelFilter,

    /// Log output format. See [`LogFormat`] for available options.
    ///
    /// # Default
    ///
    /// `Auto` (pretty for TTY, simplified otherwise)
    ///
    /// # Environment Variable
    ///
    /// `BB__LOGGING__FORMAT`
    pub format: LogFormat,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::Auto,
        }
    }
}

/// Configuration for the index artifacts.
#[derive(Debug, Deserialize, Serialize)]
pub struct Index {
    /// Page title of the generated `index.html`.
    ///
    /// # Default
    ///
    /// `"benchblob files"`
    ///
    /// # Environment Variable
    ///
    /// `BB__INDEX__TITLE`
    pub title: String,
}

impl Default for Index {
    fn default() -> Self {
        Self {
            title: "benchblob files".into(),
        }
    }
}

/// Main configuration struct for the benchblob CLI.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Directory the files, the index, and the resume marker are written to.
    ///
    /// The directory is created if it does not exist.
    ///
    /// # Default
    ///
    /// `"data"` (relative to the working directory)
    ///
    /// # Environment Variable
    ///
    /// `BB__OUTPUT_DIR`
    pub output_dir: PathBuf,

    /// The target file sizes.
    ///
    /// Accepts `bytesize` syntax (`"100 MiB"`, `"1 GiB"`). Sizes are sorted
    /// ascending; duplicates are rejected.
    ///
    /// # Default
    ///
    /// 1 MiB, 10 MiB, 100 MiB, 1 GiB, 10 GiB
    ///
    /// # Environment Variable
    ///
    /// `BB__SIZES` (e.g. `BB__SIZES=["1 MiB", "1 GiB"]`)
    pub sizes: Vec<ByteSize>,

    /// Which generation strategy to use. See [`StrategyChoice`].
    pub strategy: StrategyChoice,

    /// Buffer size for chunked writes.
    ///
    /// # Default
    ///
    /// 4 MiB
    ///
    /// # Environment Variable
    ///
    /// `BB__CHUNK_SIZE`
    pub chunk_size: ByteSize,

    /// Free-space headroom kept on the output disk.
    ///
    /// Before each file is written, the output filesystem must have room for
    /// the file plus this reserve, otherwise the run aborts.
    ///
    /// # Default
    ///
    /// 1 GiB
    ///
    /// # Environment Variable
    ///
    /// `BB__RESERVE`
    pub reserve: ByteSize,

    /// How often progress on a single large file is logged.
    ///
    /// # Default
    ///
    /// 5 seconds
    ///
    /// # Environment Variable
    ///
    /// `BB__PROGRESS_INTERVAL` (humantime syntax, e.g. `10s`)
    #[serde(with = "humantime_serde")]
    pub progress_interval: Duration,

    /// Configuration for the index artifacts. See [`Index`].
    pub index: Index,

    /// Logging configuration. See [`Logging`].
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            sizes: sizes::default_ladder(),
            strategy: StrategyChoice::Auto,
            chunk_size: ByteSize::mib(4),
            reserve: ByteSize::gib(1),
            progress_interval: Duration::from_secs(5),
            index: Index::default(),
            logging: Logging::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the provided arguments.
    ///
    /// Configuration is merged in the following order (later sources override
    /// earlier ones):
    /// 1. Default values
    /// 2. YAML configuration file (if provided)
    /// 3. Environment variables (prefixed with `BB__`)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = figment::Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }
}
