//! Cursor and connection configuration
//!
//! Settings can be built with setters or parsed from an option string of
//! `key=value` pairs separated by `;`:
//!
//! ```rust
//! use hana_rs::Config;
//!
//! let config: Config = "auto_commit=true; arraysize=50".parse().unwrap();
//! assert!(config.auto_commit);
//! assert_eq!(config.arraysize, 50);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::constants::{FETCHALL_BLOCK_SIZE, MAX_PART_PAYLOAD, WRITE_LOB_CHUNK_HEADER_SIZE};
use crate::error::{Error, Result};

/// Default number of rows returned by `fetchmany` without an explicit size
pub const DEFAULT_ARRAYSIZE: usize = 1;

/// Smallest payload budget accepted by [`Config::validate`]
pub const MIN_PAYLOAD_SIZE: usize = 2 * WRITE_LOB_CHUNK_HEADER_SIZE + 1;

/// Configuration shared by a connection and its cursors.
///
/// # Examples
///
/// ```rust
/// use hana_rs::Config;
///
/// let config = Config::new()
///     .auto_commit(true)
///     .arraysize(100)
///     .max_payload_size(64 * 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Whether the server commits after every request
    pub auto_commit: bool,
    /// Default row count for `fetchmany`
    pub arraysize: usize,
    /// Block size used by `fetchall`
    pub fetchall_block_size: usize,
    /// Payload budget of one request, used to pack parameter rows and LOB chunks
    pub max_payload_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_commit: false,
            arraysize: DEFAULT_ARRAYSIZE,
            fetchall_block_size: FETCHALL_BLOCK_SIZE,
            max_payload_size: MAX_PART_PAYLOAD,
        }
    }
}

impl Config {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set auto-commit
    pub fn auto_commit(mut self, auto_commit: bool) -> Self {
        self.auto_commit = auto_commit;
        self
    }

    /// Set the default `fetchmany` size
    pub fn arraysize(mut self, arraysize: usize) -> Self {
        self.arraysize = arraysize;
        self
    }

    /// Set the `fetchall` block size
    pub fn fetchall_block_size(mut self, size: usize) -> Self {
        self.fetchall_block_size = size;
        self
    }

    /// Set the request payload budget
    pub fn max_payload_size(mut self, size: usize) -> Self {
        self.max_payload_size = size;
        self
    }

    /// Check that all sizes are usable
    pub fn validate(&self) -> Result<()> {
        if self.arraysize == 0 {
            return Err(Error::InvalidConfig("arraysize must be positive".into()));
        }
        if self.fetchall_block_size == 0 {
            return Err(Error::InvalidConfig(
                "fetchall_block_size must be positive".into(),
            ));
        }
        if self.max_payload_size < MIN_PAYLOAD_SIZE {
            return Err(Error::InvalidConfig(format!(
                "max_payload_size must be at least {} bytes",
                MIN_PAYLOAD_SIZE
            )));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidConfig(format!(
            "invalid boolean for {}: {}",
            key, value
        ))),
    }
}

fn parse_size(key: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("invalid size for {}: {}", key, value)))
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut config = Config::default();

        for option in s.split(';').map(str::trim).filter(|o| !o.is_empty()) {
            let (key, value) = option
                .split_once('=')
                .ok_or_else(|| Error::InvalidConfig(format!("expected key=value, got: {}", option)))?;
            let key = key.trim();
            let value = value.trim();

            match key.to_ascii_lowercase().as_str() {
                "auto_commit" | "autocommit" => config.auto_commit = parse_bool(key, value)?,
                "arraysize" => config.arraysize = parse_size(key, value)?,
                "fetchall_block_size" => config.fetchall_block_size = parse_size(key, value)?,
                "max_payload_size" => config.max_payload_size = parse_size(key, value)?,
                _ => {
                    return Err(Error::InvalidConfig(format!("unknown option: {}", key)));
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "auto_commit={};arraysize={};fetchall_block_size={};max_payload_size={}",
            self.auto_commit, self.arraysize, self.fetchall_block_size, self.max_payload_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.auto_commit);
        assert_eq!(config.arraysize, 1);
        assert_eq!(config.fetchall_block_size, 1024);
        assert_eq!(config.max_payload_size, MAX_PART_PAYLOAD);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_options() {
        let config: Config = "auto_commit=on; arraysize=25;max_payload_size=4096"
            .parse()
            .unwrap();
        assert!(config.auto_commit);
        assert_eq!(config.arraysize, 25);
        assert_eq!(config.max_payload_size, 4096);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("arraysize".parse::<Config>().is_err());
        assert!("arraysize=abc".parse::<Config>().is_err());
        assert!("colour=blue".parse::<Config>().is_err());
        assert!("auto_commit=maybe".parse::<Config>().is_err());
        assert!("arraysize=0".parse::<Config>().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        assert!(Config::new().arraysize(0).validate().is_err());
        assert!(Config::new().fetchall_block_size(0).validate().is_err());
        let err = Config::new().max_payload_size(10).validate().unwrap_err();
        assert!(err.is_usage_error());
    }

    #[test]
    fn test_display_round_trip() {
        let config = Config::new().auto_commit(true).arraysize(7);
        let parsed: Config = config.to_string().parse().unwrap();
        assert_eq!(parsed, config);
    }
}
