use std::{collections::HashSet, path::Path};

use color_eyre::eyre::{self, WrapErr as _};

/// One dispatch policy entry. The whole record, not the triggering event, is
/// what gets forwarded to the pipeline queue.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FilterRule {
    pub repo: String,
    pub branch: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub dir: String,
    #[serde(default)]
    pub commands: Vec<String>,
}

/// Ordered, immutable rule set. Lookups are first-match-wins.
#[derive(Debug, Clone, Default)]
pub struct RuleSet(Vec<FilterRule>);

impl RuleSet {
    pub fn new(rules: Vec<FilterRule>) -> Self {
        Self(rules)
    }

    pub fn load(path: &Path) -> eyre::Result<Self> {
        let data = std::fs::read(path)
            .wrap_err_with(|| format!("Failed to read rule file {:?}", path))?;
        let rules: Vec<FilterRule> = serde_json::from_slice(&data)
            .wrap_err_with(|| format!("Failed to parse rule file {:?}", path))?;

        let set = Self::new(rules);
        for rule in set.shadowed() {
            tracing::warn!(
                repo = rule.repo.as_str(),
                branch = rule.branch.as_str(),
                "Rule for {}#{} is shadowed by an earlier rule and will never match",
                rule.repo,
                rule.branch,
            );
        }
        Ok(set)
    }

    pub fn find_match(&self, repo: &str, reference: &str) -> Option<&FilterRule> {
        self.0
            .iter()
            .find(|rule| rule.repo == repo && rule.branch == reference)
    }

    /// Rules whose `(repo, branch)` pair already appeared earlier in the set.
    pub fn shadowed(&self) -> impl Iterator<Item = &FilterRule> {
        let mut seen = HashSet::new();
        self.0
            .iter()
            .filter(move |rule| !seen.insert((rule.repo.as_str(), rule.branch.as_str())))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterRule> {
        self.0.iter()
    }
}
