//! The navigation contract between the wizard and the results viewer.
//!
//! The wizard writes all six keys, always, in form order. The viewer reads
//! them back from whatever query string arrives, so a hand-written URL with
//! keys missing or reordered is still accepted.

use serde::Serialize;
use url::form_urlencoded;

use crate::questionnaire::answers::{Answers, Field};

/// Path of the results route.
pub const RESULTS_PATH: &str = "/recommendations";

/// Where the client should go after submitting the questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub path: &'static str,
    pub query: String,
}

impl Navigation {
    pub fn location(&self) -> String {
        format!("{}?{}", self.path, self.query)
    }
}

/// Serializes answers into the canonical results query string.
/// Empty values are written as empty strings, never omitted.
pub fn encode_answers(answers: &Answers) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for field in Field::ALL {
        serializer.append_pair(field.query_key(), answers.value_of(field));
    }
    serializer.finish()
}

/// The six parameters as read by the results viewer.
///
/// `None` means the key was absent from the query string; `Some("")` means
/// it was present but empty. The two are forwarded differently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RecommendationQuery {
    pub education: Option<String>,
    pub field: Option<String>,
    pub environment: Option<String>,
    pub skills: Option<String>,
    pub interests: Option<String>,
    pub values: Option<String>,
}

impl RecommendationQuery {
    /// Parses a raw query string (without the leading `?`).
    /// The first occurrence of a repeated key wins.
    pub fn parse(raw: &str) -> Self {
        let mut query = RecommendationQuery::default();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            let slot = match &*key {
                "education" => &mut query.education,
                "field" => &mut query.field,
                "environment" => &mut query.environment,
                "skills" => &mut query.skills,
                "interests" => &mut query.interests,
                "values" => &mut query.values,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        query
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        let slot = match field {
            Field::EducationLevel => &self.education,
            Field::FieldOfStudy => &self.field,
            Field::WorkEnvironment => &self.environment,
            Field::Skills => &self.skills,
            Field::CareerInterests => &self.interests,
            Field::WorkValues => &self.values,
        };
        slot.as_deref()
    }

    /// Present keys in form order. An absent key is omitted; an empty one is
    /// written as `key=`, so the two never collapse into the same string.
    pub fn canonical(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for field in Field::ALL {
            if let Some(value) = self.get(field) {
                serializer.append_pair(field.query_key(), value);
            }
        }
        serializer.finish()
    }
}
