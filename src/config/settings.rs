use super::DEFAULT_SETTINGS_YAML;
use crate::Result;
use camino::Utf8PathBuf;
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};

/// Characters Excel does not allow in worksheet names.
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];
const MAX_SHEET_NAME_LEN: usize = 31;

/// Retrieval and output settings from `settings.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Root of the data repository; documents live at `{base_url}/{region}/{code}.json`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pause between consecutive requests
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Extra attempts after a transient failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Directory for exports when no explicit output path is given
    #[serde(default = "default_output_dir")]
    pub output_dir: Utf8PathBuf,
}

fn default_base_url() -> String {
    "https://github.com/factbook/factbook.json/raw/master".to_string()
}

fn default_user_agent() -> String {
    concat!("factbook-export/", env!("CARGO_PKG_VERSION")).to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_request_delay_ms() -> u64 {
    1000
}

const fn default_max_retries() -> u32 {
    2
}

fn default_sheet_name() -> String {
    "Countries Data".to_string()
}

fn default_output_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("output")
}

impl Settings {
    pub fn from_yaml(text: &str) -> Result<Self> {
        // an empty document means "all defaults"
        let settings: Self = if text.trim().is_empty() {
            serde_yaml::from_str("{}")
        } else {
            serde_yaml::from_str(text)
        }
        .into_app_err("parsing settings")?;

        settings.validate()?;
        Ok(settings)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Validate setting values
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an HTTP URL, the timeout is zero, or the sheet name
    /// would be rejected by Excel
    fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url).into_app_err_with(|| format!("base_url '{}' is not a valid URL", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(app_err!("base_url must use http or https, got '{}'", url.scheme()));
        }

        if self.request_timeout_secs == 0 {
            return Err(app_err!("request_timeout_secs must be greater than zero"));
        }

        if self.sheet_name.trim().is_empty() {
            return Err(app_err!("sheet_name must not be empty"));
        }

        if self.sheet_name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(app_err!(
                "sheet_name '{}' is longer than {MAX_SHEET_NAME_LEN} characters",
                self.sheet_name
            ));
        }

        if self.sheet_name.contains(FORBIDDEN_SHEET_CHARS) {
            return Err(app_err!("sheet_name '{}' contains a character Excel does not allow", self.sheet_name));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        serde_yaml::from_str(DEFAULT_SETTINGS_YAML).expect("settings.yaml should be valid YAML that deserializes to Settings")
    }
}
