use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the fixed image pools. The tag doubles as the folder name under
/// `ri/` and as the key in the emitted runtime configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "h")]
    Horizontal,
    #[serde(rename = "v")]
    Vertical,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Horizontal, Category::Vertical];

    pub fn tag(self) -> &'static str {
        match self {
            Category::Horizontal => "h",
            Category::Vertical => "v",
        }
    }

    /// Parses a marker value such as the `data-random-bg` attribute. Anything
    /// other than an exact tag is not a category.
    pub fn from_tag(tag: &str) -> Option<Category> {
        match tag {
            "h" => Some(Category::Horizontal),
            "v" => Some(Category::Vertical),
            _ => None,
        }
    }

    /// `alt` text that requests an image of this category.
    pub fn alt_sentinel(self) -> &'static str {
        match self {
            Category::Horizontal => "random:h",
            Category::Vertical => "random:v",
        }
    }

    /// Fallback marker looked for inside an image's current `src`.
    pub fn src_marker(self) -> &'static str {
        match self {
            Category::Horizontal => "/random/h",
            Category::Vertical => "/random/v",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Number of assets produced per category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts(BTreeMap<Category, usize>);

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: Category, count: usize) {
        self.0.insert(category, count);
    }

    /// Unknown categories count as empty.
    pub fn get(&self, category: Category) -> usize {
        self.0.get(&category).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.0.iter().map(|(c, n)| (*c, *n))
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

impl FromIterator<(Category, usize)> for Counts {
    fn from_iter<I: IntoIterator<Item = (Category, usize)>>(iter: I) -> Self {
        Counts(iter.into_iter().collect())
    }
}
