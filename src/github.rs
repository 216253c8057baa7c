//! The subset of GitHub's push webhook payload the dispatcher looks at.
//!
//! Decoding is permissive: unknown fields are ignored and a missing `ref` or
//! `repository.full_name` becomes an empty string, which never matches a rule.

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref", default)]
    pub reference: String,
    #[serde(default)]
    pub repository: Repository,
}

impl PushEvent {
    pub fn decode(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    pub fn repo(&self) -> &str {
        &self.repository.full_name
    }
}
