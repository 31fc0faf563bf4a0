//! YAML configuration: countries, field mappings, profiles, the field catalog and settings.
//!
//! Configuration lives in a directory (`config/` by default). When that directory does not
//! exist and none was requested explicitly, the defaults embedded in the binary are used.

mod catalog;
mod countries;
mod profiles;
mod settings;

pub use catalog::{CatalogEntry, FieldCatalog};
pub use countries::{Country, CountryTable, parse_country_codes, region_title};
pub use profiles::{ALL_UNIVERSAL, Profile, ProfileMetadata, ProfileSet};
pub use settings::Settings;

use crate::Result;
use crate::record::{FieldMapping, FieldPath, name_for};
use camino::{Utf8Path, Utf8PathBuf};
use ohno::{IntoAppError, app_err};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;

pub const DEFAULT_CONFIG_DIR: &str = "config";

pub const COUNTRIES_FILE: &str = "countries.yaml";
pub const FIELDS_FILE: &str = "fields.yaml";
pub const PROFILES_FILE: &str = "field_profiles.yaml";
pub const CATALOG_FILE: &str = "fields_complete.yaml";
pub const SETTINGS_FILE: &str = "settings.yaml";

pub const DEFAULT_COUNTRIES_YAML: &str = include_str!("../../config/countries.yaml");
pub const DEFAULT_FIELDS_YAML: &str = include_str!("../../config/fields.yaml");
pub const DEFAULT_PROFILES_YAML: &str = include_str!("../../config/field_profiles.yaml");
pub const DEFAULT_SETTINGS_YAML: &str = include_str!("../../config/settings.yaml");

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    Embedded,
    Directory(Utf8PathBuf),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldsFile {
    #[serde(default)]
    fields: Vec<FieldMapping>,
}

/// Raw text of every configuration file, before parsing.
struct Sources {
    countries: String,
    fields: Option<String>,
    profiles: String,
    catalog: Option<String>,
    settings: Option<String>,
}

impl Sources {
    fn embedded() -> Self {
        Self {
            countries: DEFAULT_COUNTRIES_YAML.to_string(),
            fields: Some(DEFAULT_FIELDS_YAML.to_string()),
            profiles: DEFAULT_PROFILES_YAML.to_string(),
            catalog: None,
            settings: Some(DEFAULT_SETTINGS_YAML.to_string()),
        }
    }

    /// Read the files of `dir`.
    ///
    /// With `fallback`, missing required files are replaced by the embedded defaults; otherwise
    /// they are an error.
    fn read_dir(dir: &Utf8Path, fallback: bool) -> Result<Self> {
        let required = |name: &str, default: &str| -> Result<String> {
            let path = dir.join(name);
            match read_if_exists(&path)? {
                Some(text) => Ok(text),
                None if fallback => Ok(default.to_string()),
                None => Err(app_err!("required configuration file {path} does not exist")),
            }
        };

        Ok(Self {
            countries: required(COUNTRIES_FILE, DEFAULT_COUNTRIES_YAML)?,
            fields: read_if_exists(&dir.join(FIELDS_FILE))?,
            profiles: required(PROFILES_FILE, DEFAULT_PROFILES_YAML)?,
            catalog: read_if_exists(&dir.join(CATALOG_FILE))?,
            settings: read_if_exists(&dir.join(SETTINGS_FILE))?,
        })
    }
}

fn read_if_exists(path: &Utf8Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).into_app_err_with(|| format!("reading configuration from {path}")),
    }
}

/// The loaded configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub origin: ConfigOrigin,
    pub countries: CountryTable,
    pub fields: Vec<FieldMapping>,
    pub profiles: ProfileSet,
    pub catalog: Option<FieldCatalog>,
    pub settings: Settings,
}

impl Config {
    /// Load configuration from `config_dir`, or from the default directory when `None`.
    ///
    /// Returns the configuration together with non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly requested directory is missing a required file, or if
    /// any file cannot be read or parsed
    pub fn load(config_dir: Option<&Utf8Path>) -> Result<(Self, Vec<String>)> {
        let (origin, sources) = match config_dir {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(app_err!("configuration directory {dir} does not exist"));
                }
                (ConfigOrigin::Directory(dir.to_path_buf()), Sources::read_dir(dir, false)?)
            }
            None => {
                let dir = Utf8Path::new(DEFAULT_CONFIG_DIR);
                if dir.is_dir() {
                    (ConfigOrigin::Directory(dir.to_path_buf()), Sources::read_dir(dir, true)?)
                } else {
                    (ConfigOrigin::Embedded, Sources::embedded())
                }
            }
        };

        Self::from_sources(origin, &sources)
    }

    /// Configuration built only from the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded files fail to parse
    pub fn embedded() -> Result<(Self, Vec<String>)> {
        Self::from_sources(ConfigOrigin::Embedded, &Sources::embedded())
    }

    fn from_sources(origin: ConfigOrigin, sources: &Sources) -> Result<(Self, Vec<String>)> {
        let (countries, mut warnings) = CountryTable::from_yaml(&sources.countries)?;

        let fields = match &sources.fields {
            Some(text) => {
                let file: FieldsFile = serde_yaml::from_str(text).into_app_err("parsing field mappings")?;
                file.fields
            }
            None => Vec::new(),
        };

        let profiles = ProfileSet::from_yaml(&sources.profiles)?;

        let catalog = sources.catalog.as_deref().map(FieldCatalog::from_yaml).transpose()?;

        let settings = match &sources.settings {
            Some(text) => Settings::from_yaml(text)?,
            None => Settings::default(),
        };

        let mut config = Self {
            origin,
            countries,
            fields,
            profiles,
            catalog,
            settings,
        };

        config.validate(&mut warnings);
        Ok((config, warnings))
    }

    /// Drop malformed field mappings and report questionable profile entries.
    fn validate(&mut self, warnings: &mut Vec<String>) {
        let mut seen = HashSet::new();
        self.fields.retain(|mapping| {
            if let Err(e) = FieldPath::parse(&mapping.json_path) {
                warnings.push(format!("field mapping '{}' was ignored: {e}", mapping.json_path));
                return false;
            }

            if !seen.insert(mapping.json_path.clone()) {
                warnings.push(format!("field mapping '{}' is listed more than once; keeping the first entry", mapping.json_path));
                return false;
            }

            true
        });

        for (name, profile) in &self.profiles.profiles {
            for field in &profile.fields {
                if field == ALL_UNIVERSAL {
                    if self.catalog.is_none() {
                        warnings.push(format!(
                            "profile '{name}' uses '{ALL_UNIVERSAL}' but no field catalog ({CATALOG_FILE}) is available"
                        ));
                    }
                    continue;
                }

                if let Err(e) = FieldPath::parse(field) {
                    warnings.push(format!("profile '{name}' has a malformed field '{field}': {e}"));
                    continue;
                }

                if let Some(catalog) = &self.catalog
                    && !catalog.contains(field)
                {
                    warnings.push(format!("profile '{name}' field '{field}' is not in the field catalog"));
                }
            }
        }
    }

    /// Profile fields that are absent from the field catalog.
    ///
    /// Returns `None` when no catalog is loaded.
    #[must_use]
    pub fn fields_missing_from_catalog(&self) -> Option<Vec<(&str, &str)>> {
        let catalog = self.catalog.as_ref()?;
        Some(
            self.profiles
                .profiles
                .iter()
                .flat_map(|(name, profile)| profile.fields.iter().map(move |field| (name.as_str(), field.as_str())))
                .filter(|(_, field)| *field != ALL_UNIVERSAL && !catalog.contains(field))
                .collect(),
        )
    }

    /// Directory the configuration was read from, or the default directory for embedded configuration.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        match &self.origin {
            ConfigOrigin::Directory(dir) => dir,
            ConfigOrigin::Embedded => Utf8Path::new(DEFAULT_CONFIG_DIR),
        }
    }

    /// Location of the field catalog belonging to this configuration.
    #[must_use]
    pub fn catalog_path(&self) -> Utf8PathBuf {
        self.dir().join(CATALOG_FILE)
    }

    /// Column label for `json_path`: the curated mapping, then the catalog, then one derived from the path.
    #[must_use]
    pub fn display_name_for(&self, json_path: &str) -> String {
        if let Some(mapping) = self.fields.iter().find(|m| m.json_path == json_path) {
            return mapping.display_name.clone();
        }

        if let Some(entry) = self.catalog.as_ref().and_then(|c| c.get(json_path)) {
            return entry.display_name.clone();
        }

        name_for(json_path)
    }

    #[must_use]
    pub fn category_for(&self, json_path: &str) -> String {
        if let Some(category) = self.fields.iter().find(|m| m.json_path == json_path).and_then(|m| m.category.clone()) {
            return category;
        }

        if let Some(entry) = self.catalog.as_ref().and_then(|c| c.get(json_path)) {
            return entry.category.clone();
        }

        json_path.split(FieldPath::SEPARATOR).next().unwrap_or_default().to_string()
    }

    /// Field paths selected by a profile, with `all_universal` expanded and duplicates removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile does not exist
    pub fn profile_fields(&self, name: &str) -> Result<Vec<String>> {
        let profile = self.profiles.get(name)?;

        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for field in &profile.fields {
            if field == ALL_UNIVERSAL {
                let universal = self.catalog.as_ref().map(FieldCatalog::universal_paths).unwrap_or_default();
                for path in universal {
                    if seen.insert(path.to_string()) {
                        fields.push(path.to_string());
                    }
                }
            } else if seen.insert(field.clone()) {
                fields.push(field.clone());
            }
        }

        Ok(fields)
    }

    /// Column mappings for every field of a profile, in profile order.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile does not exist
    pub fn mappings_for_profile(&self, name: &str) -> Result<Vec<FieldMapping>> {
        Ok(self
            .profile_fields(name)?
            .into_iter()
            .map(|path| self.mapping_for(path))
            .collect())
    }

    /// Mappings for every known field: the curated ones first, then the rest of the catalog.
    #[must_use]
    pub fn all_field_mappings(&self) -> Vec<FieldMapping> {
        let mut mappings: Vec<FieldMapping> = self.fields.iter().map(|m| self.mapping_for(m.json_path.clone())).collect();

        if let Some(catalog) = &self.catalog {
            let known: HashSet<String> = mappings.iter().map(|m| m.json_path.clone()).collect();
            mappings.extend(
                catalog
                    .fields
                    .iter()
                    .filter(|entry| !known.contains(&entry.json_path))
                    .map(|entry| self.mapping_for(entry.json_path.clone())),
            );
        }

        mappings
    }

    fn mapping_for(&self, json_path: String) -> FieldMapping {
        FieldMapping {
            display_name: self.display_name_for(&json_path),
            category: Some(self.category_for(&json_path)),
            json_path,
        }
    }

    #[must_use]
    pub fn default_profile(&self) -> &str {
        self.profiles.default_profile()
    }

    /// Profile names with descriptions, sorted by name.
    pub fn list_profiles(&self) -> impl Iterator<Item = (&str, &str)> {
        self.profiles.list()
    }

    /// All known fields grouped by category, categories sorted alphabetically.
    #[must_use]
    pub fn fields_by_category(&self) -> BTreeMap<String, Vec<FieldMapping>> {
        let mut groups: BTreeMap<String, Vec<FieldMapping>> = BTreeMap::new();
        for mapping in self.all_field_mappings() {
            let category = mapping.category.clone().unwrap_or_default();
            groups.entry(category).or_default().push(mapping);
        }
        groups
    }

    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.fields_by_category().into_keys().collect()
    }
}

/// Write the embedded configuration files into `dir`.
///
/// Returns the paths written. Existing files are left alone unless `force` is set.
///
/// # Errors
///
/// Returns an error if a file already exists and `force` is not set, or if writing fails
pub fn save_defaults(dir: &Utf8Path, force: bool) -> Result<Vec<Utf8PathBuf>> {
    let files = [
        (COUNTRIES_FILE, DEFAULT_COUNTRIES_YAML),
        (FIELDS_FILE, DEFAULT_FIELDS_YAML),
        (PROFILES_FILE, DEFAULT_PROFILES_YAML),
        (SETTINGS_FILE, DEFAULT_SETTINGS_YAML),
    ];

    if !force
        && let Some(existing) = files.iter().map(|(name, _)| dir.join(name)).find(|path| path.exists())
    {
        return Err(app_err!("{existing} already exists; use --force to overwrite"));
    }

    fs::create_dir_all(dir).into_app_err_with(|| format!("creating configuration directory {dir}"))?;

    let mut written = Vec::with_capacity(files.len());
    for (name, text) in files {
        let path = dir.join(name);
        fs::write(&path, text).into_app_err_with(|| format!("writing configuration to {path}"))?;
        written.push(path);
    }

    Ok(written)
}
