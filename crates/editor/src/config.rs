use std::time::Duration;

use formdesk_core::elements::DUPLICATE_OFFSET;
use formdesk_core::history::DEFAULT_HISTORY_LIMIT;
use formdesk_core::settings::{FormSettings, DEFAULT_AUTO_SAVE_INTERVAL_SECS};

/// Upper bound on any autosave delay, whatever the form settings say.
pub const MAX_AUTOSAVE_DELAY_SECS: f64 = 86_400.0;

/// Editor session configuration loaded from environment variables.
///
/// All fields have defaults suitable for interactive editing.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Maximum number of undo snapshots kept (default: `50`).
    pub history_limit: usize,
    /// Debounce used when the form settings carry no usable
    /// `advanced.autoSaveInterval` (default: `30s`).
    pub autosave_fallback: Duration,
    /// Position delta applied to duplicated elements (default: `20`).
    pub duplicate_offset: f64,
}

impl EditorConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `FORM_HISTORY_LIMIT`          | `50`    |
    /// | `FORM_AUTOSAVE_FALLBACK_SECS` | `30`    |
    /// | `FORM_DUPLICATE_OFFSET`       | `20`    |
    ///
    /// Values that fail to parse fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let history_limit: usize = env_parse("FORM_HISTORY_LIMIT").unwrap_or(defaults.history_limit);

        let autosave_fallback = env_parse::<u64>("FORM_AUTOSAVE_FALLBACK_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.autosave_fallback);

        let duplicate_offset: f64 = env_parse::<f64>("FORM_DUPLICATE_OFFSET")
            .filter(|v| v.is_finite())
            .unwrap_or(defaults.duplicate_offset);

        Self {
            history_limit,
            autosave_fallback,
            duplicate_offset,
        }
    }

    /// Debounce delay for the given settings.
    ///
    /// Uses `advanced.autoSaveInterval` (seconds) when it is a positive
    /// number, otherwise the configured fallback.
    pub fn autosave_delay(&self, settings: &FormSettings) -> Duration {
        settings
            .auto_save_interval_secs()
            .map(|secs| Duration::from_secs_f64(secs.min(MAX_AUTOSAVE_DELAY_SECS)))
            .unwrap_or(self.autosave_fallback)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            autosave_fallback: Duration::from_secs(DEFAULT_AUTO_SAVE_INTERVAL_SECS),
            duplicate_offset: DUPLICATE_OFFSET,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
