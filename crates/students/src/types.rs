//! Student domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{StudentsError, StudentsResult};

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 30;
pub const AGE_MIN: i64 = 6;
pub const AGE_MAX: i64 = 16;
pub const AVG_MARK_MIN: f64 = 2.0;
pub const AVG_MARK_MAX: f64 = 12.0;

/// Opaque student identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh store-assigned id (UUID v4, simple form)
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for StudentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for StudentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored student record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: StudentId,
    pub name: String,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub avg_mark: Option<f64>,
    pub on_duty: bool,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn new(id: StudentId, fields: NewStudent) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: fields.name,
            age: fields.age,
            gender: fields.gender,
            avg_mark: fields.avg_mark,
            on_duty: fields.on_duty,
            photo: fields.photo,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge the provided fields and bump `updated_at`
    pub fn apply(&mut self, patch: &StudentPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(age) = patch.age {
            self.age = Some(age);
        }
        if let Some(gender) = patch.gender {
            self.gender = Some(gender);
        }
        if let Some(avg_mark) = patch.avg_mark {
            self.avg_mark = Some(avg_mark);
        }
        if let Some(on_duty) = patch.on_duty {
            self.on_duty = on_duty;
        }
        if let Some(photo) = &patch.photo {
            self.photo = Some(photo.clone());
        }
        self.updated_at = Utc::now();
    }
}

/// Raw request body for create, upsert and patch
///
/// Every field is optional here; [`StudentPayload::into_patch`] checks
/// ranges and [`StudentPatch::into_new_student`] enforces create rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
    pub avg_mark: Option<f64>,
    pub on_duty: Option<bool>,
    pub photo: Option<String>,
}

impl StudentPayload {
    /// Set a field from a multipart text part. Unknown fields are ignored.
    pub fn set_form_field(&mut self, field: &str, value: &str) -> StudentsResult<()> {
        let value = value.trim();
        match field {
            "name" => self.name = Some(value.to_string()),
            "age" => {
                let age = value
                    .parse()
                    .map_err(|_| StudentsError::validation("age must be an integer"))?;
                self.age = Some(age);
            }
            "gender" => {
                let gender = Gender::parse(value).ok_or_else(|| {
                    StudentsError::validation("gender must be one of male, female, other")
                })?;
                self.gender = Some(gender);
            }
            "avgMark" => {
                let avg_mark = value
                    .parse()
                    .map_err(|_| StudentsError::validation("avgMark must be a number"))?;
                self.avg_mark = Some(avg_mark);
            }
            "onDuty" => {
                let on_duty = value
                    .parse()
                    .map_err(|_| StudentsError::validation("onDuty must be true or false"))?;
                self.on_duty = Some(on_duty);
            }
            "photo" => self.photo = Some(value.to_string()),
            _ => {}
        }
        Ok(())
    }

    /// Range-check the provided fields without consuming the payload
    pub fn validate(&self) -> StudentsResult<()> {
        if let Some(name) = &self.name {
            let len = name.trim().chars().count();
            if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&len) {
                return Err(StudentsError::validation(format!(
                    "name must be between {} and {} characters",
                    NAME_MIN_LEN, NAME_MAX_LEN
                )));
            }
        }

        if let Some(age) = self.age {
            if !(AGE_MIN..=AGE_MAX).contains(&age) {
                return Err(StudentsError::validation(format!(
                    "age must be between {} and {}",
                    AGE_MIN, AGE_MAX
                )));
            }
        }

        if let Some(avg_mark) = self.avg_mark {
            if !(AVG_MARK_MIN..=AVG_MARK_MAX).contains(&avg_mark) {
                return Err(StudentsError::validation(format!(
                    "avgMark must be between {} and {}",
                    AVG_MARK_MIN, AVG_MARK_MAX
                )));
            }
        }

        Ok(())
    }

    pub fn into_patch(self) -> StudentsResult<StudentPatch> {
        self.validate()?;

        Ok(StudentPatch {
            name: self.name.map(|name| name.trim().to_string()),
            age: self.age.and_then(|age| u8::try_from(age).ok()),
            gender: self.gender,
            avg_mark: self.avg_mark,
            on_duty: self.on_duty,
            photo: self.photo,
        })
    }
}

/// Validated partial update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub avg_mark: Option<f64>,
    pub on_duty: Option<bool>,
    pub photo: Option<String>,
}

impl StudentPatch {
    /// Fields for a new record. `name` is required.
    pub fn into_new_student(self) -> StudentsResult<NewStudent> {
        let name = self
            .name
            .ok_or_else(|| StudentsError::validation("name is required"))?;

        Ok(NewStudent {
            name,
            age: self.age,
            gender: self.gender,
            avg_mark: self.avg_mark,
            on_duty: self.on_duty.unwrap_or(false),
            photo: self.photo,
        })
    }
}

/// Validated fields for a new record
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub avg_mark: Option<f64>,
    pub on_duty: bool,
    pub photo: Option<String>,
}
