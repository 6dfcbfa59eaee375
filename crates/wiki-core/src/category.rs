//! Fixed set of wiki categories.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, de};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// Category a document is filed under.
///
/// Decoding goes through [`FromStr`], so stored and submitted values are
/// matched the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Jobs,
    Items,
    Monsters,
    Quests,
    Maps,
    Systems,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 6] = [
        Category::Jobs,
        Category::Items,
        Category::Monsters,
        Category::Quests,
        Category::Maps,
        Category::Systems,
    ];

    /// Wire value (`"jobs"`, `"items"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Jobs => "jobs",
            Category::Items => "items",
            Category::Monsters => "monsters",
            Category::Quests => "quests",
            Category::Maps => "maps",
            Category::Systems => "systems",
        }
    }

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Jobs => "Jobs",
            Category::Items => "Items",
            Category::Monsters => "Monsters",
            Category::Quests => "Quests",
            Category::Maps => "Regions",
            Category::Systems => "Systems",
        }
    }

    /// One-line summary for the home page category grid.
    pub fn description(&self) -> &'static str {
        match self {
            Category::Jobs => "Classes, skills and builds",
            Category::Items => "Gear, consumables and upgrades",
            Category::Monsters => "Fields, dungeons and bosses",
            Category::Quests => "Progression, rewards and requirements",
            Category::Maps => "Hunting grounds, dungeons and travel",
            Category::Systems => "Growth, economy and features",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
