use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::models::{Category, Course};

pub const LATEST_COUNT: usize = 5;
pub const WILDCARD: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(selected) => *selected == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == WILDCARD {
            return Ok(CategoryFilter::All);
        }
        s.parse::<Category>().map(CategoryFilter::Only)
    }
}

impl<'de> Deserialize<'de> for CategoryFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseFilter {
    #[serde(default)]
    pub category: CategoryFilter,
    #[serde(default)]
    pub search: String,
}

impl CourseFilter {
    pub fn new(category: CategoryFilter, search: impl Into<String>) -> Self {
        Self {
            category,
            search: search.into(),
        }
    }

    pub fn matches(&self, course: &Course) -> bool {
        self.category.matches(course.category) && matches_search(course, &self.search)
    }
}

fn matches_search(course: &Course, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    course.title.to_lowercase().contains(&needle)
        || course.description.to_lowercase().contains(&needle)
}

/// Recomputed on every call; nothing is cached between filters.
pub fn filter_courses<'a>(courses: &'a [Course], filter: &CourseFilter) -> Vec<&'a Course> {
    courses.iter().filter(|c| filter.matches(c)).collect()
}

/// The first few courses in the order the API returned them. This is a plain
/// slice, the list is not sorted by date.
pub fn latest_courses(courses: &[Course]) -> &[Course] {
    &courses[..courses.len().min(LATEST_COUNT)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str, title: &str, description: &str, category: Category) -> Course {
        Course {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category,
            price: 49.0,
            currency: "USD".to_string(),
            duration: "6 weeks".to_string(),
            rating: 4.5,
            students: 120,
            thumbnail: format!("https://cdn.example.com/{}.png", id),
        }
    }

    fn sample() -> Vec<Course> {
        vec![
            course("1", "Rust for Beginners", "Ownership and borrowing", Category::Development),
            course("2", "Brand Identity", "Logos, color and type", Category::Design),
            course("3", "Growth Marketing", "Funnels and SEO basics", Category::Marketing),
            course("4", "Web APIs", "Build REST services in RUST", Category::Development),
            course("5", "Pandas in Practice", "Dataframes for analysts", Category::DataScience),
            course("6", "Spanish A1", "Everyday conversation", Category::Languages),
        ]
    }

    #[test]
    fn category_only_keeps_that_category() {
        let courses = sample();
        for category in Category::ALL {
            let filter = CourseFilter::new(CategoryFilter::Only(category), "");
            let filtered = filter_courses(&courses, &filter);
            assert!(filtered.iter().all(|c| c.category == category));
        }
    }

    #[test]
    fn wildcard_with_empty_search_is_identity() {
        let courses = sample();
        let filtered = filter_courses(&courses, &CourseFilter::default());
        let ids: Vec<&str> = filtered.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let courses = sample();
        let filter = CourseFilter::new(CategoryFilter::All, "rust");
        let ids: Vec<&str> = filter_courses(&courses, &filter)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[test]
    fn search_and_category_combine() {
        let courses = sample();
        let filter = CourseFilter::new(CategoryFilter::Only(Category::Marketing), "rust");
        assert!(filter_courses(&courses, &filter).is_empty());
    }

    #[test]
    fn category_parsing_is_exact() {
        assert_eq!("all".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!(
            "Data Science".parse::<CategoryFilter>(),
            Ok(CategoryFilter::Only(Category::DataScience))
        );
        assert!("design".parse::<CategoryFilter>().is_err());
        assert!("All".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn latest_is_first_five_in_original_order() {
        let courses = sample();
        let ids: Vec<&str> = latest_courses(&courses).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);

        assert_eq!(latest_courses(&courses[..2]).len(), 2);
        assert!(latest_courses(&[]).is_empty());
    }

    #[test]
    fn unknown_wire_category_becomes_other() {
        let json = r#"{
            "_id": "x", "title": "t", "description": "d", "category": "Robotics",
            "price": 0, "currency": "USD", "duration": "1h", "rating": 0,
            "students": 0, "thumbnail": ""
        }"#;
        let parsed: Course = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.category, Category::Other);
    }
}
