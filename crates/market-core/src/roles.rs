//! Canonical role labels derived from free-text job titles.

/// Label given to titles that match no rule.
pub const FALLBACK_ROLE: &str = "Other";

/// One entry of the classification table: a title containing any of
/// `needles` (case-insensitive) is assigned `label`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRule {
    pub needles: &'static [&'static str],
    pub label: &'static str,
}

impl RoleRule {
    pub const fn new(needles: &'static [&'static str], label: &'static str) -> Self {
        Self { needles, label }
    }

    /// `lowered_title` must already be lower-cased.
    pub fn matches(&self, lowered_title: &str) -> bool {
        self.needles.iter().any(|n| lowered_title.contains(n))
    }
}

/// Rules in priority order. Titles often contain several needles
/// ("Senior Data Engineer / DevOps"), so the first match decides.
pub const DEFAULT_ROLE_RULES: &[RoleRule] = &[
    RoleRule::new(&["data scientist"], "Data Scientist"),
    RoleRule::new(&["data engineer"], "Data Engineer"),
    RoleRule::new(&["data analyst"], "Data Analyst"),
    RoleRule::new(&["full stack"], "Full Stack Developer"),
    RoleRule::new(&["frontend", "front end"], "Frontend Developer"),
    RoleRule::new(&["backend", "back end"], "Backend Developer"),
    RoleRule::new(&["devops"], "DevOps Engineer"),
    RoleRule::new(&["machine learning", "ml engineer"], "ML Engineer"),
    RoleRule::new(&["software engineer", "software developer"], "Software Engineer"),
    RoleRule::new(&["qa", "test"], "QA Engineer"),
];

// ── RoleClassifier ────────────────────────────────────────────────────────────

/// Ordered substring classifier with an explicit fallback label.
#[derive(Debug, Clone)]
pub struct RoleClassifier {
    rules: Vec<RoleRule>,
    fallback: &'static str,
}

impl Default for RoleClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE_RULES.to_vec(), FALLBACK_ROLE)
    }
}

impl RoleClassifier {
    pub fn new(rules: Vec<RoleRule>, fallback: &'static str) -> Self {
        Self { rules, fallback }
    }

    pub fn rules(&self) -> &[RoleRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &'static str {
        self.fallback
    }

    /// Label for `title`; the fallback when no rule matches.
    pub fn classify(&self, title: &str) -> &'static str {
        let lowered = title.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map_or(self.fallback, |rule| rule.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_data_scientist() {
        let c = RoleClassifier::default();
        assert_eq!(c.classify("Senior Data Scientist (Python)"), "Data Scientist");
    }

    #[test]
    fn test_classify_unmatched_falls_back() {
        let c = RoleClassifier::default();
        assert_eq!(c.classify("Office Coordinator"), "Other");
        assert_eq!(c.classify(""), "Other");
    }

    #[test]
    fn test_classify_first_rule_wins() {
        let c = RoleClassifier::default();
        assert_eq!(c.classify("Senior Data Engineer / DevOps"), "Data Engineer");
        assert_eq!(c.classify("DevOps / Backend Engineer"), "Backend Developer");
    }

    #[test]
    fn test_classify_is_case_insensitive_and_uses_alternatives() {
        let c = RoleClassifier::default();
        assert_eq!(c.classify("FRONT END Developer"), "Frontend Developer");
        assert_eq!(c.classify("ML Engineer II"), "ML Engineer");
        assert_eq!(c.classify("Software Developer"), "Software Engineer");
        assert_eq!(c.classify("Test Automation Lead"), "QA Engineer");
    }

    #[test]
    fn test_custom_rules_and_fallback() {
        let c = RoleClassifier::new(vec![RoleRule::new(&["chef"], "Cook")], "Unknown");
        assert_eq!(c.classify("Head Chef"), "Cook");
        assert_eq!(c.classify("Data Scientist"), "Unknown");
        assert_eq!(c.fallback(), "Unknown");
        assert_eq!(c.rules().len(), 1);
    }

    #[test]
    fn test_default_table_order() {
        let labels: Vec<&str> = DEFAULT_ROLE_RULES.iter().map(|r| r.label).collect();
        assert_eq!(labels.first(), Some(&"Data Scientist"));
        assert_eq!(labels.last(), Some(&"QA Engineer"));
        assert_eq!(labels.len(), 10);
    }
}
