use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub price: f64,
    pub currency: String,
    pub duration: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub students: u32,
    pub thumbnail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Development,
    Design,
    Business,
    Marketing,
    #[serde(rename = "Data Science")]
    DataScience,
    Languages,
    /// Any category the catalog API sends that this build does not know about.
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Development,
        Category::Design,
        Category::Business,
        Category::Marketing,
        Category::DataScience,
        Category::Languages,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Development => "Development",
            Category::Design => "Design",
            Category::Business => "Business",
            Category::Marketing => "Marketing",
            Category::DataScience => "Data Science",
            Category::Languages => "Languages",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-sensitive: "design" is not "Design".
impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .chain(std::iter::once(Category::Other))
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}
