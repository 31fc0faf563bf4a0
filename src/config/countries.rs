use crate::Result;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A country that can be exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Country {
    /// GEC code, e.g. `fr`
    pub code: String,
    pub name: String,

    /// Directory of the country's document in the data repository, e.g. `europe`
    pub region: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CountriesFile {
    countries: Vec<Country>,
}

/// Immutable lookup of the configured countries.
///
/// Codes are matched case-insensitively and stored lowercase.
#[derive(Debug, Clone, Default)]
pub struct CountryTable {
    countries: Vec<Country>,
    by_code: HashMap<String, usize>,
}

impl CountryTable {
    /// Build the table, dropping incomplete and duplicate entries.
    ///
    /// Returns the table together with a warning for each dropped entry.
    #[must_use]
    pub fn new(countries: impl IntoIterator<Item = Country>) -> (Self, Vec<String>) {
        let mut table = Self::default();
        let mut warnings = Vec::new();

        for country in countries {
            let code = country.code.trim().to_lowercase();
            if code.is_empty() || country.name.trim().is_empty() || country.region.trim().is_empty() {
                warnings.push(format!("country entry '{}' is missing a code, name or region and was ignored", country.name));
                continue;
            }

            if table.by_code.contains_key(&code) {
                warnings.push(format!("country code '{code}' is listed more than once; keeping the first entry"));
                continue;
            }

            let _ = table.by_code.insert(code.clone(), table.countries.len());
            table.countries.push(Country {
                code,
                name: country.name.trim().to_string(),
                region: country.region.trim().to_string(),
            });
        }

        (table, warnings)
    }

    /// Parse a `countries.yaml` document.
    pub fn from_yaml(text: &str) -> Result<(Self, Vec<String>)> {
        let file: CountriesFile = serde_yaml::from_str(text).into_app_err("parsing countries configuration")?;
        Ok(Self::new(file.countries))
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&Country> {
        self.by_code
            .get(&code.trim().to_lowercase())
            .and_then(|&index| self.countries.get(index))
    }

    #[must_use]
    pub fn name(&self, code: &str) -> Option<&str> {
        self.get(code).map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn region(&self, code: &str) -> Option<&str> {
        self.get(code).map(|c| c.region.as_str())
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Split codes into known (normalized to lowercase) and unknown ones, preserving order.
    #[must_use]
    pub fn validate_codes<'a>(&self, codes: impl IntoIterator<Item = &'a str>) -> (Vec<String>, Vec<String>) {
        let mut valid = Vec::new();
        let mut invalid = Vec::new();

        for code in codes {
            match self.get(code) {
                Some(country) => valid.push(country.code.clone()),
                None => invalid.push(code.trim().to_string()),
            }
        }

        (valid, invalid)
    }

    /// Countries grouped by region; regions and the countries within them sorted by code.
    #[must_use]
    pub fn by_region(&self) -> BTreeMap<&str, Vec<&Country>> {
        let mut groups: BTreeMap<&str, Vec<&Country>> = BTreeMap::new();
        for country in &self.countries {
            groups.entry(country.region.as_str()).or_default().push(country);
        }

        for countries in groups.values_mut() {
            countries.sort_by(|a, b| a.code.cmp(&b.code));
        }

        groups
    }

    #[must_use]
    pub fn regions(&self) -> Vec<&str> {
        self.by_region().into_keys().collect()
    }

    /// Countries in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = &Country> {
        self.countries.iter()
    }

    #[must_use]
    pub fn codes(&self) -> Vec<String> {
        self.countries.iter().map(|c| c.code.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

/// Split a comma-separated list of country codes, dropping blanks and normalizing case.
#[must_use]
pub fn parse_country_codes(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|code| code.trim().to_lowercase())
        .filter(|code| !code.is_empty())
        .collect()
}

/// Title for a region directory name, e.g. `east-n-southeast-asia` becomes `East N Southeast Asia`.
#[must_use]
pub fn region_title(region: &str) -> String {
    region
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect::<String>())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(" ")
}
