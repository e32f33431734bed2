pub mod client;
pub mod filter;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::Course;

pub use client::{CoursesClient, HttpCoursesClient, NoopCoursesClient};
pub use filter::{CategoryFilter, CourseFilter, LATEST_COUNT, filter_courses, latest_courses};

/// A transient message for the user, shown as a toast and then forgotten.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq)]
pub enum CatalogView<'a> {
    /// Nothing has been published yet. Not an error.
    ComingSoon,
    Courses(Vec<&'a Course>),
}

/// Handed out by [`Catalog::begin_load`]; identifies one load so its result can be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// Client-side copy of the course list.
///
/// `courses` is only ever replaced wholesale by a successful load. A failed
/// load keeps whatever was there before and raises a [`Notice`] instead.
///
/// Loads may overlap. The catalog stays `loading` until every started load
/// has settled, and a result older than the one already applied is dropped.
#[derive(Debug)]
pub struct Catalog {
    courses: Vec<Course>,
    notice: Option<Notice>,
    in_flight: usize,
    issued: u64,
    applied: u64,
    settled_once: bool,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// A fresh catalog is `loading` until its first fetch settles.
    pub fn new() -> Self {
        Self {
            courses: Vec::new(),
            notice: None,
            in_flight: 0,
            issued: 0,
            applied: 0,
            settled_once: false,
        }
    }

    pub async fn load(&mut self, client: &dyn CoursesClient) -> bool {
        let ticket = self.begin_load();
        let result = client.fetch_courses().await;
        self.settle(ticket, result)
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        self.in_flight += 1;
        LoadTicket(self.issued)
    }

    /// Ends a load started with [`Catalog::begin_load`]. Returns whether the
    /// fetch succeeded, even when its result was too old to be applied.
    pub fn settle(&mut self, ticket: LoadTicket, result: Result<Vec<Course>, AppError>) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.settled_once = true;

        let LoadTicket(generation) = ticket;
        if generation <= self.applied {
            debug!(
                "Dropping result of load {} (load {} already applied)",
                generation, self.applied
            );
            return result.is_ok();
        }
        self.applied = generation;

        match result {
            Ok(courses) => {
                info!("Loaded {} courses", courses.len());
                self.apply(courses);
                true
            }
            Err(e) => {
                warn!("Failed to load courses: {}", e);
                self.fail(format!("Failed to load courses: {}", e));
                false
            }
        }
    }

    /// Stores a fetched batch. The list is kept unfiltered.
    fn apply(&mut self, courses: Vec<Course>) {
        self.courses = courses;
        self.notice = None;
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice {
            message: message.into(),
            raised_at: Utc::now(),
        });
    }

    /// True before the first load settles and while any load is still out.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0 || !self.settled_once
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn filtered(&self, filter: &CourseFilter) -> Vec<&Course> {
        filter_courses(&self.courses, filter)
    }

    pub fn latest(&self) -> &[Course] {
        latest_courses(&self.courses)
    }

    pub fn view(&self, filter: &CourseFilter) -> CatalogView<'_> {
        if self.courses.is_empty() {
            CatalogView::ComingSoon
        } else {
            CatalogView::Courses(self.filtered(filter))
        }
    }
}
