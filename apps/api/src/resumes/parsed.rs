/// Typed view over the `parsed_data` JSONB column.
///
/// The stored value is whatever the resume parser produced and is returned
/// verbatim to the voice assistant during interviews. This module only
/// interprets it when composing interviewer prompts, and treats anything it
/// cannot read as absent rather than failing.
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct ParsedResume {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
}

#[derive(Debug, Deserialize)]
pub struct EducationEntry {
    pub degree: String,
    pub institution: String,
}

impl ParsedResume {
    /// Reads the stored JSONB, tolerating NULL, non-object values, and shapes
    /// an older parser may have written.
    pub fn from_stored(value: Option<&Value>) -> Option<Self> {
        let value = value?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    pub fn skills_summary(&self) -> Option<String> {
        if self.skills.is_empty() {
            return None;
        }
        Some(self.skills.join(", "))
    }

    pub fn experience_summary(&self) -> Option<String> {
        if self.experience.is_empty() {
            return None;
        }
        Some(
            self.experience
                .iter()
                .map(|e| format!("{} at {}", e.title, e.company))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn education_summary(&self) -> Option<String> {
        if self.education.is_empty() {
            return None;
        }
        Some(
            self.education
                .iter()
                .map(|e| format!("{} from {}", e.degree, e.institution))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
