//! Precise rule confirmation
//!
//! The detector runs a rule's regular expression over a fragment whose
//! prefilter pass already reported the rule's keyword, and turns every
//! match into an `Issue` located by 1-based line number.

use crate::model::{Issue, Location, Rule, RuleError};
use regex::Regex;
use std::collections::HashSet;

/// One file's content held in memory for the duration of its scan
#[derive(Debug, Clone)]
pub struct Fragment {
    pub raw: String,
    pub file_path: String,
    /// Keywords the prefilter found in `raw`, lowercased
    pub keywords: HashSet<String>,
    newline_offsets: Vec<usize>,
}

impl Fragment {
    pub fn new(raw: String, file_path: impl Into<String>, keywords: HashSet<String>) -> Self {
        let newline_offsets = raw
            .bytes()
            .enumerate()
            .filter(|(_, b)| *b == b'\n')
            .map(|(i, _)| i)
            .collect();
        Self {
            raw,
            file_path: file_path.into(),
            keywords,
            newline_offsets,
        }
    }

    /// 1-based line of a byte offset into `raw`
    pub fn line_of(&self, offset: usize) -> u64 {
        (self.newline_offsets.partition_point(|&nl| nl < offset) + 1) as u64
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }
}

/// A rule with its pattern compiled once for the whole scan
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: Rule,
    pub pattern: Regex,
    /// Key into a fragment's keyword set
    pub prefilter_key: String,
}

impl CompiledRule {
    pub fn compile(rule: &Rule) -> Result<Self, RuleError> {
        rule.validate()?;
        let pattern = Regex::new(&rule.keyword).map_err(|e| RuleError::InvalidPattern {
            rule_id: rule.formatted_id(),
            keyword: rule.keyword.clone(),
            message: e.to_string(),
        })?;
        Ok(Self {
            rule: rule.clone(),
            pattern,
            prefilter_key: rule.keyword.to_ascii_lowercase(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Detector;

impl Detector {
    pub fn new() -> Self {
        Self
    }

    /// Every non-overlapping match of `rule` in `fragment`, in content order
    pub fn confirm(&self, fragment: &Fragment, rule: &CompiledRule) -> Vec<Issue> {
        let rule_id = rule.rule.formatted_id();
        let severity = rule.rule.severity.as_str().to_string();

        rule.pattern
            .find_iter(&fragment.raw)
            .map(|m| Issue {
                rule_id: rule_id.clone(),
                location: Location {
                    path: fragment.file_path.clone(),
                    line: fragment.line_of(m.start()),
                },
                description: rule.rule.description.clone(),
                severity: severity.clone(),
                keyword: rule.rule.keyword.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Severity;

    fn fragment(raw: &str, path: &str) -> Fragment {
        Fragment::new(raw.to_string(), path, HashSet::new())
    }

    fn compiled(id: u64, keyword: &str, severity: Severity) -> CompiledRule {
        CompiledRule::compile(&Rule::new(
            id,
            "leak",
            keyword,
            format!("A secret starts with the prefix {}", keyword),
            severity,
        ))
        .unwrap()
    }

    #[test]
    fn test_public_key_scenario() {
        let frag = fragment("xibcuvsdf: public_key=sbodufsdfin", "config/app.env");
        let issues = Detector::new().confirm(&frag, &compiled(1, "public_key", Severity::Low));

        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.rule_id, "G001");
        assert_eq!(issue.keyword, "public_key");
        assert_eq!(issue.severity, "LOW");
        assert_eq!(issue.location.path, "config/app.env");
        assert_eq!(issue.location.line, 1);
        assert_eq!(issue.description, "A secret starts with the prefix public_key");
    }

    #[test]
    fn test_private_key_scenario() {
        let frag = fragment("xibcuvsdf: private_key=sbodufsdfin", "a.txt");
        let issues = Detector::new().confirm(&frag, &compiled(2, "private_key", Severity::High));

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "G002");
        assert_eq!(issues[0].severity, "HIGH");
    }

    #[test]
    fn test_every_occurrence_is_an_issue() {
        let rule = compiled(7, "token", Severity::Medium);
        for n in 1..=5 {
            let raw = (0..n).map(|i| format!("token{}\n", i)).collect::<String>();
            let issues = Detector::new().confirm(&fragment(&raw, "t.txt"), &rule);
            assert_eq!(issues.len(), n);
        }
    }

    #[test]
    fn test_line_numbers_follow_newlines() {
        let raw = "first\nsecret=1\n\n  secret=2 secret=3\nlast\n";
        let issues = Detector::new().confirm(
            &fragment(raw, "s.txt"),
            &compiled(3, "secret", Severity::High),
        );
        let lines: Vec<u64> = issues.iter().map(|i| i.location.line).collect();
        assert_eq!(lines, vec![2, 4, 4]);
    }

    #[test]
    fn test_line_of_boundaries() {
        let frag = fragment("ab\ncd\n", "x");
        assert_eq!(frag.line_of(0), 1);
        assert_eq!(frag.line_of(2), 1); // the newline itself
        assert_eq!(frag.line_of(3), 2);
        assert_eq!(frag.line_of(6), 3);
    }

    #[test]
    fn test_regex_keywords_are_honoured() {
        let frag = fragment("AKIA1234 and AKIA9", "creds");
        let issues = Detector::new().confirm(&frag, &compiled(4, "AKIA[0-9]+", Severity::High));
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].keyword, "AKIA[0-9]+");
    }

    #[test]
    fn test_invalid_pattern_is_rule_error() {
        let rule = Rule::new(5, "bad", "(unclosed", "d", Severity::Low);
        assert!(matches!(
            CompiledRule::compile(&rule),
            Err(RuleError::InvalidPattern { .. })
        ));
    }
}
