//! Form settings defaults and the two-level merge rules.
//!
//! Settings are a JSON-shaped bag: a handful of fixed top-level keys plus
//! three nested sections (`submission`, `privacy`, `advanced`). Every partial
//! update is merged key-by-key at the top level and, for the three sections,
//! key-by-key one level further down. Anything deeper is replaced wholesale.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A JSON object, as used for settings sections and partial updates.
pub type SettingsMap = Map<String, Value>;

// ---------------------------------------------------------------------------
// Key constants
// ---------------------------------------------------------------------------

/// Nested section holding submission behaviour (success message, limits).
pub const SUBMISSION: &str = "submission";

/// Nested section holding privacy options (consent, retention).
pub const PRIVACY: &str = "privacy";

/// Nested section holding advanced options (autosave interval, analytics).
pub const ADVANCED: &str = "advanced";

/// Key under `advanced` holding the autosave debounce interval in seconds.
pub const AUTO_SAVE_INTERVAL: &str = "autoSaveInterval";

/// Default autosave interval (seconds) seeded into `advanced`.
pub const DEFAULT_AUTO_SAVE_INTERVAL_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// FormSettings
// ---------------------------------------------------------------------------

/// The nested configuration bag of a form.
///
/// `general` holds the top-level keys (`layout`, `labelPosition`, `width`,
/// `logo`, `status` and any unknown forward-compatible keys). It never
/// contains the three section keys; those live in their own maps.
///
/// Serializes as a single flat JSON object. Deserialization goes through
/// [`FormSettings::with_defaults`], so a malformed or partial payload is
/// defaulted instead of rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Value", from = "Value")]
pub struct FormSettings {
    pub general: SettingsMap,
    pub submission: SettingsMap,
    pub privacy: SettingsMap,
    pub advanced: SettingsMap,
}

impl FormSettings {
    /// Merge a possibly-partial persisted settings object onto the defaults.
    ///
    /// A non-object `partial` (including `null`) yields the plain defaults.
    pub fn with_defaults(partial: &Value) -> Self {
        match partial.as_object() {
            Some(patch) => Self::default().merged(patch),
            None => Self::default(),
        }
    }

    /// Return a copy of these settings with `patch` merged in.
    ///
    /// - Top-level keys overwrite (unknown keys included).
    /// - `submission`, `privacy` and `advanced` merge key-by-key; values
    ///   inside a section are replaced wholesale.
    /// - A section key whose value is not an object is ignored.
    pub fn merged(&self, patch: &SettingsMap) -> Self {
        let mut next = self.clone();
        for (key, value) in patch {
            match next.section_mut(key) {
                Some(section) => {
                    if let Some(entries) = value.as_object() {
                        for (sub_key, sub_value) in entries {
                            section.insert(sub_key.clone(), sub_value.clone());
                        }
                    }
                }
                None => {
                    next.general.insert(key.clone(), value.clone());
                }
            }
        }
        next
    }

    /// The autosave interval in seconds, if `advanced.autoSaveInterval` holds
    /// a positive number.
    pub fn auto_save_interval_secs(&self) -> Option<f64> {
        self.advanced
            .get(AUTO_SAVE_INTERVAL)
            .and_then(Value::as_f64)
            .filter(|secs| secs.is_finite() && *secs > 0.0)
    }

    /// Render the settings as one flat JSON object.
    pub fn to_value(&self) -> Value {
        let mut root = self.general.clone();
        root.insert(SUBMISSION.into(), Value::Object(self.submission.clone()));
        root.insert(PRIVACY.into(), Value::Object(self.privacy.clone()));
        root.insert(ADVANCED.into(), Value::Object(self.advanced.clone()));
        Value::Object(root)
    }

    fn section_mut(&mut self, key: &str) -> Option<&mut SettingsMap> {
        match key {
            SUBMISSION => Some(&mut self.submission),
            PRIVACY => Some(&mut self.privacy),
            ADVANCED => Some(&mut self.advanced),
            _ => None,
        }
    }
}

impl Default for FormSettings {
    /// The hard-coded defaults every loaded form is seeded with.
    fn default() -> Self {
        Self {
            general: object(json!({
                "layout": "single-column",
                "labelPosition": "top",
                "width": "medium",
                "logo": null,
                "status": "active",
            })),
            submission: object(json!({
                "successMessage": "Thank you for your submission!",
                "redirectUrl": null,
                "allowMultiple": true,
                "responseLimit": null,
                "notifyEmails": [],
            })),
            privacy: object(json!({
                "collectIpAddress": false,
                "requireConsent": false,
                "consentText": null,
                "dataRetentionDays": 365,
            })),
            advanced: object(json!({
                "autoSaveInterval": DEFAULT_AUTO_SAVE_INTERVAL_SECS,
                "maxVersions": 50,
                "enableAnalytics": true,
                "customCss": "",
            })),
        }
    }
}

impl From<Value> for FormSettings {
    fn from(value: Value) -> Self {
        Self::with_defaults(&value)
    }
}

impl From<FormSettings> for Value {
    fn from(settings: FormSettings) -> Self {
        settings.to_value()
    }
}

/// Merge a partial update into the current settings.
///
/// Free-function form of [`FormSettings::merged`], used by the editor session.
pub fn update_settings(current: &FormSettings, partial: &SettingsMap) -> FormSettings {
    current.merged(partial)
}

fn object(value: Value) -> SettingsMap {
    match value {
        Value::Object(map) => map,
        _ => SettingsMap::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
