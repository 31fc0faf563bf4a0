use crate::Result;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Profile entry that expands to every universal field of the catalog.
pub const ALL_UNIVERSAL: &str = "all_universal";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileMetadata {
    #[serde(default = "default_profile_name")]
    pub default_profile: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for ProfileMetadata {
    fn default() -> Self {
        Self {
            default_profile: default_profile_name(),
            description: None,
        }
    }
}

fn default_profile_name() -> String {
    "standard".to_string()
}

/// A named selection of field paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    pub description: String,
    pub fields: Vec<String>,
}

impl Profile {
    /// Whether this profile selects the catalog's universal fields.
    #[must_use]
    pub fn is_all_universal(&self) -> bool {
        self.fields.iter().any(|f| f == ALL_UNIVERSAL)
    }
}

/// Contents of `field_profiles.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSet {
    #[serde(default)]
    pub metadata: ProfileMetadata,
    pub profiles: BTreeMap<String, Profile>,
}

impl ProfileSet {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let set: Self = serde_yaml::from_str(text).into_app_err("parsing field profiles configuration")?;
        set.validate()?;
        Ok(set)
    }

    fn validate(&self) -> Result<()> {
        if self.profiles.is_empty() {
            return Err(app_err!("field profiles configuration defines no profiles"));
        }

        if !self.profiles.contains_key(&self.metadata.default_profile) {
            return Err(app_err!(
                "default profile '{}' is not defined; available profiles: {}",
                self.metadata.default_profile,
                self.names().join(", ")
            ));
        }

        Ok(())
    }

    /// Look up a profile by name.
    ///
    /// # Errors
    ///
    /// Fails with the list of available profiles when `name` is unknown.
    pub fn get(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| app_err!("profile '{name}' not found; available profiles: {}", self.names().join(", ")))
    }

    #[must_use]
    pub fn default_profile(&self) -> &str {
        &self.metadata.default_profile
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    /// Profile names with their descriptions, sorted by name.
    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.profiles.iter().map(|(name, profile)| (name.as_str(), profile.description.as_str()))
    }
}
