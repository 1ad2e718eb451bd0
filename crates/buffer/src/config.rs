// Chunk: docs/chunks/buffer_config - Tunable limits loaded from config or env

//! Engine limits.
//!
//! The defaults are the classic screen-editor limits: 400-column lines,
//! 64 lines per group and a mark pool refilled 20 at a time. Embedders can
//! deserialize a [`BufferConfig`] from their own settings file or overlay
//! `SCREEN_EDIT_*` environment variables with [`BufferConfig::from_env`].

use std::env;

use serde::Deserialize;

use crate::error::ConfigError;

/// Longest significant line the engine stores.
pub const DEFAULT_MAX_LINE_LEN: usize = 400;
/// Lines per group before the group is split.
pub const DEFAULT_GROUP_CAPACITY: usize = 64;
pub const DEFAULT_MARK_POOL_BATCH: usize = 20;

/// Limits applied by a [`crate::TextBuffer`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Maximum significant length of a line. Mark columns range over
    /// `1..=max_line_len + 1`.
    pub max_line_len: usize,
    /// Maximum number of lines in one group.
    pub group_capacity: usize,
    /// Number of mark slots added whenever the mark pool runs dry.
    pub mark_pool_batch: usize,
    /// Left margin given to newly created frames.
    pub default_margin_left: usize,
    /// Right margin given to newly created frames.
    pub default_margin_right: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            group_capacity: DEFAULT_GROUP_CAPACITY,
            mark_pool_batch: DEFAULT_MARK_POOL_BATCH,
            default_margin_left: 1,
            default_margin_right: 80,
        }
    }
}

impl BufferConfig {
    /// Checks that the limits can be honoured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_min("max_line_len", self.max_line_len, 1)?;
        check_min("group_capacity", self.group_capacity, 2)?;
        check_min("mark_pool_batch", self.mark_pool_batch, 1)?;

        let (left, right) = (self.default_margin_left, self.default_margin_right);
        if left == 0 || left >= right || right > self.max_line_len {
            return Err(ConfigError::Margins { left, right });
        }
        Ok(())
    }

    /// Builds a configuration from the defaults overlaid with environment
    /// variables, then validates it.
    ///
    /// Recognized variables: `SCREEN_EDIT_MAX_LINE_LEN`,
    /// `SCREEN_EDIT_GROUP_CAPACITY`, `SCREEN_EDIT_MARK_POOL_BATCH`,
    /// `SCREEN_EDIT_MARGIN_LEFT`, `SCREEN_EDIT_MARGIN_RIGHT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_prefixed("SCREEN_EDIT_")
    }

    fn from_env_prefixed(prefix: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let fields = [
            ("MAX_LINE_LEN", &mut config.max_line_len),
            ("GROUP_CAPACITY", &mut config.group_capacity),
            ("MARK_POOL_BATCH", &mut config.mark_pool_batch),
            ("MARGIN_LEFT", &mut config.default_margin_left),
            ("MARGIN_RIGHT", &mut config.default_margin_right),
        ];
        for (suffix, slot) in fields {
            overlay(&format!("{prefix}{suffix}"), slot)?;
        }
        config.validate()?;
        Ok(config)
    }
}

fn check_min(field: &'static str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::TooSmall { field, min, value });
    }
    Ok(())
}

/// Replaces `slot` with the parsed value of `name` when it is set and non-empty.
fn overlay(name: &str, slot: &mut usize) -> Result<(), ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(());
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    *slot = parse_count(name, trimmed)?;
    Ok(())
}

fn parse_count(name: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse().map_err(|_| ConfigError::NotANumber {
        name: name.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = BufferConfig::default();
        assert_eq!(config.max_line_len, 400);
        assert_eq!(config.group_capacity, 64);
        assert_eq!(config.mark_pool_batch, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_group_capacity_below_two_rejected() {
        let config = BufferConfig {
            group_capacity: 1,
            ..BufferConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooSmall {
                field: "group_capacity",
                min: 2,
                value: 1
            })
        );
    }

    #[test]
    fn test_margins_out_of_order_rejected() {
        let config = BufferConfig {
            default_margin_left: 20,
            default_margin_right: 10,
            ..BufferConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Margins {
                left: 20,
                right: 10
            })
        );
    }

    #[test]
    fn test_right_margin_beyond_line_rejected() {
        let config = BufferConfig {
            max_line_len: 40,
            ..BufferConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Margins { .. })));
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: BufferConfig =
            serde_json::from_str(r#"{ "group_capacity": 4 }"#).unwrap();
        assert_eq!(config.group_capacity, 4);
        assert_eq!(config.max_line_len, 400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_count_rejects_garbage() {
        assert_eq!(parse_count("X", "12"), Ok(12));
        assert!(matches!(
            parse_count("X", "twelve"),
            Err(ConfigError::NotANumber { .. })
        ));
    }

    #[test]
    fn test_env_overlay_skips_blank_values_and_validates() {
        const PREFIX: &str = "SCREEN_EDIT_OVERLAY_TEST_";
        let var = |suffix: &str| format!("{PREFIX}{suffix}");
        let clear = || {
            for suffix in [
                "MAX_LINE_LEN",
                "GROUP_CAPACITY",
                "MARK_POOL_BATCH",
                "MARGIN_LEFT",
                "MARGIN_RIGHT",
            ] {
                env::remove_var(var(suffix));
            }
        };
        clear();

        env::set_var(var("MAX_LINE_LEN"), " 120 ");
        env::set_var(var("GROUP_CAPACITY"), "");
        env::set_var(var("MARK_POOL_BATCH"), "   ");
        env::set_var(var("MARGIN_RIGHT"), "100");
        let config = BufferConfig::from_env_prefixed(PREFIX);

        env::set_var(var("MARGIN_LEFT"), "abc");
        let garbage = BufferConfig::from_env_prefixed(PREFIX);

        env::set_var(var("MARGIN_LEFT"), "1");
        env::set_var(var("MARGIN_RIGHT"), "200");
        let too_wide = BufferConfig::from_env_prefixed(PREFIX);
        clear();

        let config = config.unwrap();
        assert_eq!(config.max_line_len, 120);
        assert_eq!(config.group_capacity, DEFAULT_GROUP_CAPACITY);
        assert_eq!(config.mark_pool_batch, DEFAULT_MARK_POOL_BATCH);
        assert_eq!(config.default_margin_right, 100);
        assert_eq!(
            garbage,
            Err(ConfigError::NotANumber {
                name: var("MARGIN_LEFT"),
                value: "abc".to_string()
            })
        );
        assert_eq!(too_wide, Err(ConfigError::Margins { left: 1, right: 200 }));
    }

    #[test]
    fn test_env_overlay_with_nothing_set_is_default() {
        let config = BufferConfig::from_env_prefixed("SCREEN_EDIT_UNSET_TEST_").unwrap();
        assert_eq!(config, BufferConfig::default());
    }
}
