//! User persona — consumed by LLM prompts to bias tone, length, and depth.
//! Never mutated by the control plane.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    German,
    English,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerLength {
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageLevel {
    Basic,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertiseLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludePictures {
    None,
    Few,
    Many,
}

/// Presentation preferences; every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_length: Option<AnswerLength>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_level: Option<LanguageLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expertise_level: Option<ExpertiseLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_pictures: Option<IncludePictures>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub language: Language,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub enrolled_courses: Vec<String>,
    pub role: Role,
}

impl Persona {
    /// Compact single-line description used inside LLM prompts.
    pub fn prompt_summary(&self) -> String {
        let mut parts = vec![
            format!("language={:?}", self.language).to_lowercase(),
            format!("role={:?}", self.role).to_lowercase(),
        ];
        if let Some(level) = self.preferences.expertise_level {
            parts.push(format!("expertise={level:?}").to_lowercase());
        }
        if let Some(level) = self.preferences.language_level {
            parts.push(format!("language_level={level:?}").to_lowercase());
        }
        if let Some(len) = self.preferences.answer_length {
            parts.push(format!("answer_length={len:?}").to_lowercase());
        }
        if let Some(pics) = self.preferences.include_pictures {
            parts.push(format!("include_pictures={pics:?}").to_lowercase());
        }
        parts.join(", ")
    }
}
