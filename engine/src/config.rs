use crate::error::ConfigError;
use serde::Deserialize;

pub const DEFAULT_MAX_RESULTS: usize = 20;
pub const DEFAULT_DEBOUNCE_MS: u32 = 60;
pub const DEFAULT_OPEN_SHORTCUT: &str = "/";

/// Host page configuration, passed from JavaScript as a JSON string.
/// Every field is optional; the defaults match the `course-search-*`
/// markup emitted by the site templates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    pub open_button_id: String,
    pub modal_id: String,
    pub input_id: String,
    pub results_id: String,
    pub status_id: String,
    /// Attribute marking elements that close the modal (backdrop, close button)
    pub close_attribute: String,
    /// Selector of the dialog panel inside the modal
    pub dialog_selector: String,
    /// Prefix for the BEM classes put on result rows
    pub class_prefix: String,
    /// Overrides the modal's `data-max-results` attribute when set
    pub max_results: Option<i64>,
    pub debounce_ms: u32,
    pub open_shortcut: String,
    /// `tracing` filter directive, e.g. "debug" or "search_modal=debug"
    pub log_level: String,
}

impl Default for ModalConfig {
    fn default() -> Self {
        ModalConfig {
            open_button_id: "course-search-open".to_string(),
            modal_id: "course-search-modal".to_string(),
            input_id: "course-search-input".to_string(),
            results_id: "course-search-results".to_string(),
            status_id: "course-search-status".to_string(),
            close_attribute: "data-course-search-close".to_string(),
            dialog_selector: ".course-search-modal__dialog".to_string(),
            class_prefix: "course-search-modal".to_string(),
            max_results: None,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            open_shortcut: DEFAULT_OPEN_SHORTCUT.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ModalConfig {
    /// Parse a config; an empty string yields the defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(ModalConfig::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Settings for the modal, given the raw `data-max-results` attribute
    pub fn settings(&self, max_results_attr: Option<&str>) -> ModalSettings {
        let result_cap = match self.max_results {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(DEFAULT_MAX_RESULTS),
            _ => parse_max_results(max_results_attr),
        };
        ModalSettings {
            result_cap,
            debounce_ms: self.debounce_ms,
            open_shortcut: self.open_shortcut.clone(),
        }
    }
}

/// The subset of configuration the modal itself needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalSettings {
    pub result_cap: usize,
    pub debounce_ms: u32,
    pub open_shortcut: String,
}

impl Default for ModalSettings {
    fn default() -> Self {
        ModalSettings {
            result_cap: DEFAULT_MAX_RESULTS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            open_shortcut: DEFAULT_OPEN_SHORTCUT.to_string(),
        }
    }
}

/// Parse a `max-results` attribute the way `parseInt` reads it: leading
/// integer, trailing junk ignored. Absent, unparsable or non-positive
/// values give [`DEFAULT_MAX_RESULTS`].
pub fn parse_max_results(raw: Option<&str>) -> usize {
    let Some(raw) = raw.map(str::trim) else {
        return DEFAULT_MAX_RESULTS;
    };

    let sign_len = usize::from(raw.starts_with(['+', '-']));
    let digits = raw[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();

    match raw[..sign_len + digits].parse::<i64>() {
        Ok(n) if n > 0 => usize::try_from(n).unwrap_or(DEFAULT_MAX_RESULTS),
        _ => DEFAULT_MAX_RESULTS,
    }
}
