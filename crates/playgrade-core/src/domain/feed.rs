//! Post feed filtering, sorting and pagination.

use chrono::{DateTime, TimeDelta, Utc};

use super::post::Category;
use crate::error::DomainError;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Whose posts a feed shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Audience {
    #[default]
    Public,
    /// Only posts by users the caller follows.
    Followed,
}

impl Audience {
    pub fn parse(value: Option<&str>) -> Result<Self, DomainError> {
        match value.map(str::trim).unwrap_or_default() {
            "" | "Public Posts" | "public" => Ok(Audience::Public),
            "Followed Posts" | "followed" => Ok(Audience::Followed),
            other => Err(DomainError::validation(format!(
                "Invalid users filter '{other}'"
            ))),
        }
    }
}

/// Maximum post age.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AgeRange {
    Today,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl AgeRange {
    pub fn parse(value: Option<&str>) -> Result<Self, DomainError> {
        match value.map(str::trim).unwrap_or_default() {
            "" | "All" => Ok(AgeRange::All),
            "Today" => Ok(AgeRange::Today),
            "Week" => Ok(AgeRange::Week),
            "Month" => Ok(AgeRange::Month),
            "Year" => Ok(AgeRange::Year),
            other => Err(DomainError::validation(format!(
                "Invalid age range '{other}'"
            ))),
        }
    }

    fn days(self) -> Option<i64> {
        match self {
            AgeRange::Today => Some(1),
            AgeRange::Week => Some(7),
            AgeRange::Month => Some(30),
            AgeRange::Year => Some(365),
            AgeRange::All => None,
        }
    }

    /// Oldest creation time still inside the window, if the window is bounded.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.days().map(|days| now - TimeDelta::days(days))
    }
}

/// Feed ordering. Ties always fall back to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    MostLiked,
    MostComments,
}

impl SortOrder {
    /// Unknown keys fall back to `Newest`.
    pub fn lookup(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("Most Liked") => SortOrder::MostLiked,
            Some("Most Comments") => SortOrder::MostComments,
            _ => SortOrder::Newest,
        }
    }
}

/// Everything that narrows a post listing.
#[derive(Debug, Clone, Default)]
pub struct FeedFilter {
    /// Empty means every category.
    pub categories: Vec<Category>,
    pub audience: Audience,
    pub age: AgeRange,
    pub search: Option<String>,
    pub poster_id: Option<i32>,
    pub sort: SortOrder,
}

impl FeedFilter {
    /// Parse a comma-separated category list; blanks are ignored.
    pub fn parse_categories(value: Option<&str>) -> Result<Vec<Category>, DomainError> {
        let mut categories = Vec::new();
        for part in value.unwrap_or_default().split(',') {
            if part.trim().is_empty() {
                continue;
            }
            let category: Category = part.parse()?;
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        Ok(categories)
    }

    /// Search text with surrounding whitespace removed; `None` if blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, DomainError> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE as i64);

        if page < 1 {
            return Err(DomainError::validation("page must be at least 1"));
        }
        if limit < 1 || limit > MAX_PAGE_SIZE as i64 {
            return Err(DomainError::validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        // The row offset is bound as a signed 64-bit SQL parameter.
        if (page - 1).checked_mul(limit).is_none() {
            return Err(DomainError::validation("page is out of range"));
        }

        Ok(Self {
            page: page as u64,
            limit: limit as u64,
        })
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone)]
pub struct FeedPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

impl<T> FeedPage<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            total_pages: request.total_pages(total),
        }
    }
}
