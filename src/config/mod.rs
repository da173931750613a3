/*!
 * Buffer Configuration
 * Default size and allocation mode, with KB/MB suffix parsing
 */

use crate::core::errors::BufferError;
use crate::core::types::{AllocationKind, BufferResult, Size, MAX_CAPACITY};
use serde::{Deserialize, Serialize};

/// Configuration key for the default buffer size
pub const KEY_DEFAULT_SIZE: &str = "buffer.default-size";

/// Configuration key for the default allocation mode
pub const KEY_ALLOCATION_MODE: &str = "buffer.default-allocation-mode";

/// Default buffer size in bytes when no configuration is supplied
pub const DEFAULT_BUFFER_SIZE: Size = 1024;

/// Buffer subsystem configuration
///
/// Parsed once at startup; hot reloads go through an explicit
/// [`BufferConfig::apply`] / `AllocationPolicy::update` call. Already
/// allocated handles are unaffected by a reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    pub default_size: Size,
    pub default_kind: AllocationKind,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_BUFFER_SIZE,
            default_kind: AllocationKind::Unmanaged,
        }
    }
}

impl BufferConfig {
    /// Build a configuration from string key/value entries
    ///
    /// Unrecognized keys are ignored; malformed values for the two
    /// recognized keys fail the whole parse.
    pub fn from_entries<'a, I>(entries: I) -> BufferResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (key, value) in entries {
            config.apply(key, value)?;
        }
        Ok(config)
    }

    /// Apply a single key/value pair, returning whether the key was recognized
    pub fn apply(&mut self, key: &str, value: &str) -> BufferResult<bool> {
        match key {
            KEY_DEFAULT_SIZE => {
                self.default_size = parse_size(value)?;
                Ok(true)
            }
            KEY_ALLOCATION_MODE => {
                self.default_kind = parse_allocation_mode(value)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Parse a buffer size string: a plain integer, or a number with a
/// case-insensitive `KB` / `MB` suffix (multipliers 1024 / 1048576).
///
/// Fractional values with a suffix are accepted (`"1.5KB"` is 1536 bytes);
/// the result must be a positive byte count.
pub fn parse_size(value: &str) -> BufferResult<Size> {
    let raw = value.trim();
    if let Ok(size) = raw.parse::<Size>() {
        return check_positive(value, size);
    }
    if raw.len() > 2 {
        let (number, unit) = raw.split_at(raw.len() - 2);
        let multiplier: Size = if unit.eq_ignore_ascii_case("kb") {
            1024
        } else if unit.eq_ignore_ascii_case("mb") {
            1024 * 1024
        } else {
            return Err(malformed_size(value, "unrecognized unit suffix"));
        };
        let number: f64 = number
            .trim()
            .parse()
            .map_err(|_| malformed_size(value, "not a number"))?;
        if !number.is_finite() || number < 0.0 {
            return Err(malformed_size(value, "not a positive number"));
        }
        let bytes = number * multiplier as f64;
        if !bytes.is_finite() || bytes > MAX_CAPACITY as f64 {
            return Err(malformed_size(value, "size exceeds addressable capacity"));
        }
        return check_positive(value, bytes as Size);
    }
    Err(malformed_size(value, "not an integer"))
}

/// Parse an allocation mode string: `"managed"` or `"unmanaged"`,
/// case-insensitive.
pub fn parse_allocation_mode(value: &str) -> BufferResult<AllocationKind> {
    let raw = value.trim();
    if raw.eq_ignore_ascii_case("managed") {
        Ok(AllocationKind::Managed)
    } else if raw.eq_ignore_ascii_case("unmanaged") {
        Ok(AllocationKind::Unmanaged)
    } else {
        Err(BufferError::Configuration {
            key: KEY_ALLOCATION_MODE.into(),
            value: value.into(),
            reason: "expected \"managed\" or \"unmanaged\"".into(),
        })
    }
}

fn check_positive(value: &str, size: Size) -> BufferResult<Size> {
    if size == 0 {
        return Err(malformed_size(value, "size must be positive"));
    }
    Ok(size)
}

fn malformed_size(value: &str, reason: &str) -> BufferError {
    BufferError::Configuration {
        key: KEY_DEFAULT_SIZE.into(),
        value: value.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_integers() {
        assert_eq!(parse_size("512").unwrap(), 512);
        assert_eq!(parse_size(" 1024 ").unwrap(), 1024);
    }

    #[test]
    fn parses_unit_suffixes() {
        assert_eq!(parse_size("2KB").unwrap(), 2048);
        assert_eq!(parse_size("2kb").unwrap(), 2048);
        assert_eq!(parse_size("1MB").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("1.5KB").unwrap(), 1536);
    }

    #[test]
    fn rejects_malformed_sizes() {
        assert!(parse_size("abcKB").is_err());
        assert!(parse_size("KB").is_err());
        assert!(parse_size("").is_err());
        assert!(parse_size("0").is_err());
        assert!(parse_size("-1KB").is_err());
    }

    #[test]
    fn rejects_sizes_past_addressable_capacity() {
        assert!(parse_size("1e309KB").is_err());
        assert!(parse_size("99999999999999999999MB").is_err());
    }

    #[test]
    fn parses_allocation_modes() {
        assert_eq!(
            parse_allocation_mode("managed").unwrap(),
            AllocationKind::Managed
        );
        assert_eq!(
            parse_allocation_mode("UNMANAGED").unwrap(),
            AllocationKind::Unmanaged
        );
        assert!(parse_allocation_mode("direct").is_err());
    }

    #[test]
    fn builds_from_entries() {
        let config = BufferConfig::from_entries([
            (KEY_DEFAULT_SIZE, "4KB"),
            (KEY_ALLOCATION_MODE, "managed"),
            ("unrelated.key", "whatever"),
        ])
        .unwrap();
        assert_eq!(config.default_size, 4096);
        assert_eq!(config.default_kind, AllocationKind::Managed);
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = BufferConfig::default();
        assert_eq!(config.default_size, 1024);
        assert_eq!(config.default_kind, AllocationKind::Unmanaged);
    }
}
