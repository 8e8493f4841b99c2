use serde::{Deserialize, Serialize};

/// A job listing as supplied by the caller. `id` is the stable identity used to match
/// completion-service output back to the listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: String,
    pub salary_range: Option<String>,
    pub posted_date: String,
    pub source: String,
    pub industry: Option<String>,
    pub experience_level: Option<String>,
}

impl JobListing {
    /// Title, requirements and description joined, in that order.
    pub fn full_text(&self) -> String {
        format!("{} {} {}", self.title, self.requirements, self.description)
    }

    pub fn is_remote(&self) -> bool {
        self.location.to_lowercase().contains("remote")
    }
}
