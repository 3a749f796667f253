//! Query-string parsers for listing students
//!
//! Each parser takes the raw query map and never fails: missing, malformed
//! or out-of-range values fall back to defaults and unknown keys are
//! ignored.

use std::collections::HashMap;

use crate::types::{Gender, Student};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PaginationParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Number of records before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

/// Fields accepted by `sortBy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Id,
    Name,
    Age,
    Gender,
    AvgMark,
    OnDuty,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Id,
        SortField::Name,
        SortField::Age,
        SortField::Gender,
        SortField::AvgMark,
        SortField::OnDuty,
        SortField::CreatedAt,
        SortField::UpdatedAt,
    ];

    /// Parse a JSON field name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    /// JSON field name
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "_id",
            SortField::Name => "name",
            SortField::Age => "age",
            SortField::Gender => "gender",
            SortField::AvgMark => "avgMark",
            SortField::OnDuty => "onDuty",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }

    /// Database column
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Age => "age",
            SortField::Gender => "gender",
            SortField::AvgMark => "avg_mark",
            SortField::OnDuty => "on_duty",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortParams {
    pub field: SortField,
    pub order: SortOrder,
}

/// Predicates over students, all optional and ANDed together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentFilter {
    pub gender: Option<Gender>,
    pub min_age: Option<u8>,
    pub max_age: Option<u8>,
    pub min_avg_mark: Option<f64>,
    pub max_avg_mark: Option<f64>,
    pub on_duty: Option<bool>,
}

impl StudentFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check if a student matches this filter.
    ///
    /// Range predicates never match a student with the field unset.
    pub fn matches(&self, student: &Student) -> bool {
        if let Some(gender) = self.gender {
            if student.gender != Some(gender) {
                return false;
            }
        }

        if let Some(min_age) = self.min_age {
            if !student.age.is_some_and(|age| age >= min_age) {
                return false;
            }
        }

        if let Some(max_age) = self.max_age {
            if !student.age.is_some_and(|age| age <= max_age) {
                return false;
            }
        }

        if let Some(min) = self.min_avg_mark {
            if !student.avg_mark.is_some_and(|mark| mark >= min) {
                return false;
            }
        }

        if let Some(max) = self.max_avg_mark {
            if !student.avg_mark.is_some_and(|mark| mark <= max) {
                return false;
            }
        }

        if let Some(on_duty) = self.on_duty {
            if student.on_duty != on_duty {
                return false;
            }
        }

        true
    }
}

fn parse_positive(value: Option<&String>) -> Option<u32> {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v >= 1)
}

/// `page` and `perPage`
pub fn parse_pagination_params(query: &HashMap<String, String>) -> PaginationParams {
    let page = parse_positive(query.get("page")).unwrap_or(DEFAULT_PAGE);
    let per_page = parse_positive(query.get("perPage")).unwrap_or(DEFAULT_PER_PAGE);
    PaginationParams::new(page, per_page)
}

/// `sortBy` and `sortOrder`
pub fn parse_sort_params(query: &HashMap<String, String>) -> SortParams {
    SortParams {
        field: query
            .get("sortBy")
            .and_then(|v| SortField::parse(v.trim()))
            .unwrap_or_default(),
        order: query
            .get("sortOrder")
            .and_then(|v| SortOrder::parse(v))
            .unwrap_or_default(),
    }
}

/// `gender`, `minAge`, `maxAge`, `minAvgMark`, `maxAvgMark`, `onDuty`
pub fn parse_filter_params(query: &HashMap<String, String>) -> StudentFilter {
    let number = |key: &str| query.get(key).and_then(|v| v.trim().parse::<f64>().ok());
    let age = |key: &str| query.get(key).and_then(|v| v.trim().parse::<u8>().ok());

    StudentFilter {
        gender: query.get("gender").and_then(|v| Gender::parse(v)),
        min_age: age("minAge"),
        max_age: age("maxAge"),
        min_avg_mark: number("minAvgMark").filter(|v| v.is_finite()),
        max_avg_mark: number("maxAvgMark").filter(|v| v.is_finite()),
        on_duty: query
            .get("onDuty")
            .and_then(|v| match v.trim().to_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewStudent, StudentId};

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_pagination_defaults_on_malformed_input() {
        for bad in ["", "abc", "0", "-3", "1.5", "99999999999"] {
            let params = parse_pagination_params(&query(&[("page", bad), ("perPage", bad)]));
            assert_eq!(params, PaginationParams::default(), "input {:?}", bad);
        }

        let params = parse_pagination_params(&HashMap::new());
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 10);
    }

    #[test]
    fn test_pagination_clamps_per_page() {
        let params = parse_pagination_params(&query(&[("page", "3"), ("perPage", "500")]));
        assert_eq!(params.page, 3);
        assert_eq!(params.per_page, MAX_PER_PAGE);
        assert_eq!(params.offset(), 200);
    }

    #[test]
    fn test_sort_falls_back_to_defaults() {
        let params = parse_sort_params(&query(&[("sortBy", "password"), ("sortOrder", "up")]));
        assert_eq!(params, SortParams::default());
        assert_eq!(params.field, SortField::Id);
        assert_eq!(params.order, SortOrder::Asc);

        let params = parse_sort_params(&query(&[("sortBy", "avgMark"), ("sortOrder", "DESC")]));
        assert_eq!(params.field, SortField::AvgMark);
        assert_eq!(params.order, SortOrder::Desc);
    }

    #[test]
    fn test_sort_field_names_roundtrip() {
        for field in SortField::ALL {
            assert_eq!(SortField::parse(field.as_str()), Some(field));
        }
    }

    #[test]
    fn test_filter_parsing() {
        let filter = parse_filter_params(&query(&[
            ("gender", "female"),
            ("minAge", "8"),
            ("maxAge", "old"),
            ("minAvgMark", "7.5"),
            ("onDuty", "TRUE"),
            ("color", "blue"),
        ]));

        assert_eq!(filter.gender, Some(Gender::Female));
        assert_eq!(filter.min_age, Some(8));
        assert_eq!(filter.max_age, None);
        assert_eq!(filter.min_avg_mark, Some(7.5));
        assert_eq!(filter.on_duty, Some(true));

        assert!(parse_filter_params(&query(&[("gender", "robot")])).is_empty());
    }

    #[test]
    fn test_filter_matches() {
        let student = Student::new(
            StudentId::generate(),
            NewStudent {
                name: "Eve".to_string(),
                age: Some(10),
                gender: Some(Gender::Female),
                avg_mark: Some(9.0),
                on_duty: true,
                photo: None,
            },
        );

        assert!(StudentFilter::default().matches(&student));

        let filter = StudentFilter {
            gender: Some(Gender::Female),
            min_age: Some(10),
            max_age: Some(12),
            on_duty: Some(true),
            ..Default::default()
        };
        assert!(filter.matches(&student));

        let filter = StudentFilter {
            max_avg_mark: Some(8.0),
            ..Default::default()
        };
        assert!(!filter.matches(&student));

        let filter = StudentFilter {
            gender: Some(Gender::Male),
            ..Default::default()
        };
        assert!(!filter.matches(&student));
    }
}
