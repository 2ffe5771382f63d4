//! Questionnaire answers and the per-field presentation metadata.
//!
//! Free-text fields accept anything, including the empty string. Select
//! fields only accept their option slugs, which is all a select control can
//! produce anyway.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("'{value}' is not a valid option for {field}")]
    UnknownOption { field: &'static str, value: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Select options
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EducationLevel {
    HighSchool,
    Bachelors,
    Masters,
    Phd,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 4] = [
        EducationLevel::HighSchool,
        EducationLevel::Bachelors,
        EducationLevel::Masters,
        EducationLevel::Phd,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "high-school",
            EducationLevel::Bachelors => "bachelors",
            EducationLevel::Masters => "masters",
            EducationLevel::Phd => "phd",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "High School",
            EducationLevel::Bachelors => "Bachelor's Degree",
            EducationLevel::Masters => "Master's Degree",
            EducationLevel::Phd => "Ph.D.",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.slug() == slug)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkEnvironment {
    #[default]
    Office,
    Remote,
    Hybrid,
}

impl WorkEnvironment {
    pub const ALL: [WorkEnvironment; 3] = [
        WorkEnvironment::Office,
        WorkEnvironment::Remote,
        WorkEnvironment::Hybrid,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            WorkEnvironment::Office => "office",
            WorkEnvironment::Remote => "remote",
            WorkEnvironment::Hybrid => "hybrid",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkEnvironment::Office => "Office",
            WorkEnvironment::Remote => "Remote",
            WorkEnvironment::Hybrid => "Hybrid",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|env| env.slug() == slug)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fields
// ────────────────────────────────────────────────────────────────────────────

/// The six questionnaire fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    EducationLevel,
    FieldOfStudy,
    WorkEnvironment,
    Skills,
    CareerInterests,
    WorkValues,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::EducationLevel,
        Field::FieldOfStudy,
        Field::WorkEnvironment,
        Field::Skills,
        Field::CareerInterests,
        Field::WorkValues,
    ];

    /// The key this field travels under in the results query string.
    pub fn query_key(self) -> &'static str {
        match self {
            Field::EducationLevel => "education",
            Field::FieldOfStudy => "field",
            Field::WorkEnvironment => "environment",
            Field::Skills => "skills",
            Field::CareerInterests => "interests",
            Field::WorkValues => "values",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::EducationLevel => "Highest Level of Education",
            Field::FieldOfStudy => "Field of Study",
            Field::WorkEnvironment => "Preferred Work Environment",
            Field::Skills => "Top Skills",
            Field::CareerInterests => "Career Interests",
            Field::WorkValues => "Work Values",
        }
    }

    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            Field::EducationLevel => Some("Select your education level"),
            Field::FieldOfStudy => Some("e.g., Computer Science, Business, etc."),
            Field::WorkEnvironment => None,
            Field::Skills => Some("e.g., Programming, Communication, Leadership"),
            Field::CareerInterests => Some("e.g., Technology, Healthcare, Finance"),
            Field::WorkValues => Some("e.g., Work-life balance, Innovation, Social impact"),
        }
    }

    /// Options for select-style fields; empty for free text.
    pub fn options(self) -> Vec<FieldOption> {
        match self {
            Field::EducationLevel => EducationLevel::ALL
                .into_iter()
                .map(|l| FieldOption::new(l.slug(), l.label()))
                .collect(),
            Field::WorkEnvironment => WorkEnvironment::ALL
                .into_iter()
                .map(|e| FieldOption::new(e.slug(), e.label()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldOption {
    pub value: &'static str,
    pub label: &'static str,
}

impl FieldOption {
    fn new(value: &'static str, label: &'static str) -> Self {
        Self { value, label }
    }
}

/// A field as presented on a wizard step, together with its current value.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub name: Field,
    pub label: &'static str,
    pub placeholder: Option<&'static str>,
    pub options: Vec<FieldOption>,
    pub value: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Answers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Answers {
    pub education_level: Option<EducationLevel>,
    pub field_of_study: String,
    pub work_environment: WorkEnvironment,
    pub skills: String,
    pub career_interests: String,
    pub work_values: String,
}

impl Answers {
    /// Sets a single field. Free text is stored verbatim.
    pub fn set(&mut self, field: Field, value: &str) -> Result<(), AnswerError> {
        match field {
            Field::EducationLevel if value.is_empty() => self.education_level = None,
            Field::EducationLevel => {
                let level =
                    EducationLevel::from_slug(value).ok_or_else(|| AnswerError::UnknownOption {
                        field: field.query_key(),
                        value: value.to_string(),
                    })?;
                self.education_level = Some(level);
            }
            Field::WorkEnvironment => {
                self.work_environment =
                    WorkEnvironment::from_slug(value).ok_or_else(|| AnswerError::UnknownOption {
                        field: field.query_key(),
                        value: value.to_string(),
                    })?;
            }
            Field::FieldOfStudy => self.field_of_study = value.to_string(),
            Field::Skills => self.skills = value.to_string(),
            Field::CareerInterests => self.career_interests = value.to_string(),
            Field::WorkValues => self.work_values = value.to_string(),
        }
        Ok(())
    }

    /// The string form of a field, as it is written into the query string.
    pub fn value_of(&self, field: Field) -> &str {
        match field {
            Field::EducationLevel => self.education_level.map(|l| l.slug()).unwrap_or(""),
            Field::FieldOfStudy => &self.field_of_study,
            Field::WorkEnvironment => self.work_environment.slug(),
            Field::Skills => &self.skills,
            Field::CareerInterests => &self.career_interests,
            Field::WorkValues => &self.work_values,
        }
    }

    pub fn describe(&self, field: Field) -> FieldDescriptor {
        FieldDescriptor {
            name: field,
            label: field.label(),
            placeholder: field.placeholder(),
            options: field.options(),
            value: self.value_of(field).to_string(),
        }
    }
}
