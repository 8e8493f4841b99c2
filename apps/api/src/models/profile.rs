use serde::{Deserialize, Serialize};

/// A candidate profile as assembled by the caller. Never mutated by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeProfile {
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub location: Option<String>,
    pub years_of_experience: f64,
    pub industry: Option<String>,
    pub current_salary: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub duration: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub degree: String,
    pub field: String,
    pub institution: String,
}

impl ResumeProfile {
    /// Flattened, lowercased text of everything an ATS would scan: skills, then each
    /// experience's title/description/company, then each education's degree/field/institution.
    pub fn resume_text(&self) -> String {
        let mut parts: Vec<&str> = self.skills.iter().map(String::as_str).collect();

        for exp in &self.experience {
            parts.push(&exp.title);
            if let Some(description) = exp.description.as_deref() {
                parts.push(description);
            }
            parts.push(&exp.company);
        }

        for edu in &self.education {
            parts.push(&edu.degree);
            parts.push(&edu.field);
            parts.push(&edu.institution);
        }

        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Location, if set to something other than whitespace.
    pub fn location_str(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }
}
