//! Gateway configuration.
//!
//! Configuration is plain TOML deserialized with serde. Only one knob
//! matters to the capture pipeline today: whether cross-site scripting
//! filtering runs globally at capture time. That knob fails closed; see
//! [`XssToggle`].

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;

/// Tri-state for the global filtering switch.
///
/// Only an explicit boolean `false` in the configuration disables global
/// filtering. A missing key, the string `"false"`, the integer `0` or any
/// other shape leaves filtering on. Disabling protection takes a value
/// that cannot be produced by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XssToggle {
    /// No value present; filtering stays enabled.
    #[default]
    Unset,
    /// Explicit boolean `true`.
    Enabled,
    /// Explicit boolean `false`; the only state that disables filtering.
    Disabled,
}

impl XssToggle {
    /// True unless the configuration held a literal `false`.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, XssToggle::Disabled)
    }

    /// True when the configuration carried no usable boolean.
    pub fn is_unset(&self) -> bool {
        matches!(self, XssToggle::Unset)
    }
}

impl<'de> Deserialize<'de> for XssToggle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ToggleVisitor;

        impl<'de> Visitor<'de> for ToggleVisitor {
            type Value = XssToggle;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("any value; only a boolean is honored")
            }

            fn visit_bool<E: de::Error>(self, flag: bool) -> Result<Self::Value, E> {
                Ok(if flag { XssToggle::Enabled } else { XssToggle::Disabled })
            }

            fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
                Ok(XssToggle::Unset)
            }

            fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
                Ok(XssToggle::Unset)
            }

            fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
                Ok(XssToggle::Unset)
            }

            fn visit_str<E: de::Error>(self, _: &str) -> Result<Self::Value, E> {
                Ok(XssToggle::Unset)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(XssToggle::Unset)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                while seq.next_element::<de::IgnoredAny>()?.is_some() {}
                Ok(XssToggle::Unset)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
                Ok(XssToggle::Unset)
            }
        }

        deserializer.deserialize_any(ToggleVisitor)
    }
}

/// The `[security]` section.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SecurityConfig {
    /// Whether every source is filtered once at capture time.
    #[serde(default)]
    pub global_xss_filtering: XssToggle,
}

/// Top-level gateway configuration.
///
/// # Examples
///
/// ```
/// use input_gateway::GatewayConfig;
///
/// let config = GatewayConfig::from_toml_str(
///     "[security]\nglobal_xss_filtering = false\n",
/// )?;
/// assert!(!config.security.global_xss_filtering.is_enabled());
///
/// let defaults = GatewayConfig::default();
/// assert!(defaults.security.global_xss_filtering.is_enabled());
/// # Ok::<(), input_gateway::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    /// Security switches.
    #[serde(default)]
    pub security: SecurityConfig,
}

impl GatewayConfig {
    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid TOML.
    /// An odd value under `global_xss_filtering` is not an error; it
    /// simply leaves filtering enabled.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents are not valid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Failures while loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The contents were not valid TOML.
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read config: {err}"),
            ConfigError::Parse(err) => write!(f, "failed to parse config: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}
