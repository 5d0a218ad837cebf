//! The immutable rule set of one scan run

use crate::model::{validate_rules, Rule};
use crate::scanner::detector::{CompiledRule, Fragment};
use crate::scanner::error::ScanResult;
use crate::scanner::prefilter::PrefilterIndex;

/// Rules compiled for a scan, plus the prefilter over their keywords
///
/// Built once per run and shared behind an `Arc` by every file worker.
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    prefilter: PrefilterIndex,
    rules: Vec<CompiledRule>,
}

impl CompiledRuleSet {
    pub fn compile(rules: &[Rule]) -> ScanResult<Self> {
        validate_rules(rules)?;
        let compiled = rules
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let prefilter = PrefilterIndex::build(compiled.iter().map(|r| r.prefilter_key.as_str()))?;
        Ok(Self {
            prefilter,
            rules: compiled,
        })
    }

    pub fn prefilter(&self) -> &PrefilterIndex {
        &self.prefilter
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose keyword the prefilter recorded on `fragment`
    pub fn candidates<'a>(
        &'a self,
        fragment: &'a Fragment,
    ) -> impl Iterator<Item = &'a CompiledRule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| fragment.has_keyword(&rule.prefilter_key))
    }
}
