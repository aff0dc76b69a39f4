//! Provide configuration for the metric container.
//!
//! Configuration can be built in code or parsed from TOML:
//!
//! ```toml
//! trap-id = "httptrap:1234:app"
//! buffer-size = 65536
//! non-print-char-replace = "?"
//!
//! [tags]
//! env = "prod"
//! host = { environment = true, value = "HOSTNAME" }
//! ```
//!
//! Global tags are appended to every metric when it is encoded. A tag given
//! as a table with `environment = true` takes its value from the named
//! environment variable.

use crate::constants;
use crate::error::{Error, Result};
use crate::tags::{Tag, Tags};
use std::env;

/// Container configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Identifier of the trap check metrics are submitted to. Informational
    /// only, the transport does the submitting.
    pub trap_id: String,
    /// Tags added to every metric at encode time
    pub global_tags: Tags,
    /// Initial capacity of the buffer `flush` encodes into
    pub buffer_size: usize,
    /// Substitute for non-printable characters in text values
    pub non_print_char_replace: char,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            trap_id: String::new(),
            global_tags: Tags::new(),
            buffer_size: constants::DEFAULT_BUFFER_SIZE,
            non_print_char_replace: constants::DEFAULT_NON_PRINT_CHAR_REPLACE,
        }
    }
}

fn tag_value(key: &str, v: &toml::Value) -> Result<String> {
    if let Some(s) = v.as_str() {
        return Ok(s.to_string());
    }
    let tbl = v
        .as_table()
        .ok_or_else(|| Error::Config(format!("tag {} must be a string or a table", key)))?;
    if !tbl
        .get("environment")
        .map_or(false, |ev| ev.as_bool().unwrap_or(false))
    {
        return Err(Error::Config(format!(
            "tag {} table must set environment = true",
            key
        )));
    }
    let env_key = tbl
        .get("value")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Config(format!("tag {} must have a string value key", key)))?;
    env::var_os(env_key)
        .ok_or_else(|| {
            Error::Config(format!(
                "tag {} could not be read from the environment ({})",
                key, env_key
            ))
        })?
        .into_string()
        .map_err(|_| Error::Config(format!("tag {} from environment is not valid UTF-8", key)))
}

/// Parse a TOML document into a `Config`. Keys not present keep their
/// defaults.
pub fn parse_config(buffer: &str) -> Result<Config> {
    let mut config = Config::default();
    let value: toml::Value = toml::from_str(buffer)
        .map_err(|e| Error::Config(format!("could not parse config: {}", e)))?;

    if let Some(tid) = value.get("trap-id") {
        config.trap_id = tid
            .as_str()
            .ok_or_else(|| Error::Config("trap-id must be a string".to_string()))?
            .to_string();
    }

    if let Some(bs) = value.get("buffer-size") {
        let bs = bs
            .as_integer()
            .ok_or_else(|| Error::Config("buffer-size must be an integer".to_string()))?;
        if bs < 0 {
            return Err(Error::Config(format!("buffer-size must be positive ({})", bs)));
        }
        config.buffer_size = bs as usize;
    }

    if let Some(npr) = value.get("non-print-char-replace") {
        let s = npr.as_str().ok_or_else(|| {
            Error::Config("non-print-char-replace must be a string".to_string())
        })?;
        let mut chars = s.chars();
        config.non_print_char_replace = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(Error::Config(format!(
                    "non-print-char-replace must be a single character ({:?})",
                    s
                )))
            }
        };
    }

    if let Some(tbl) = value.get("tags") {
        let ttbl = tbl
            .as_table()
            .ok_or_else(|| Error::Config("tags must be a table".to_string()))?;
        let mut tags = Tags::new();
        for (k, v) in ttbl.iter() {
            tags.push(Tag::new(k.as_str(), tag_value(k, v)?));
        }
        config.global_tags = tags;
    }

    Ok(config)
}
