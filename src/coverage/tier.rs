use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Coverage bucket of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Present in at least 95% of countries
    Universal,

    /// Present in at least 70% of countries
    Common,

    /// Present in fewer than 70% of countries
    Partial,
}

impl Tier {
    pub const UNIVERSAL_THRESHOLD: f64 = 95.0;
    pub const COMMON_THRESHOLD: f64 = 70.0;

    /// Classify a coverage percentage, as reported (already rounded).
    #[must_use]
    pub fn classify(coverage_pct: f64) -> Self {
        if coverage_pct >= Self::UNIVERSAL_THRESHOLD {
            Self::Universal
        } else if coverage_pct >= Self::COMMON_THRESHOLD {
            Self::Common
        } else {
            Self::Partial
        }
    }

    /// Human description of the range this tier covers.
    #[must_use]
    pub const fn range_label(self) -> &'static str {
        match self {
            Self::Universal => "\u{2265}95%",
            Self::Common => "70-94%",
            Self::Partial => "<70%",
        }
    }
}
