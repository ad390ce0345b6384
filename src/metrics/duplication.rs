//! Structural duplication
//!
//! Each function body is reduced to the sequence of control-flow tokens met
//! in a pre-order walk. Identifiers and literals never reach the
//! fingerprint, so renamed copies of the same logic collide.

use super::tree::{function_nodes, tree_and_grammar, visit_own};
use super::{lerp, ratio, Metric};
use crate::models::{FunctionRecord, MetricKind, MetricResult, ParseResult};
use crate::parsers::grammar::{Grammar, Token};
use std::collections::BTreeMap;
use tree_sitter::Node;

/// Score given to files with too few functions to compare.
const SMALL_SAMPLE_SCORE: f64 = 0.1;

pub struct DuplicationMetric {
    min_tokens: usize,
    min_functions: usize,
}

impl DuplicationMetric {
    pub fn new(min_tokens: usize, min_functions: usize) -> Self {
        Self {
            min_tokens,
            min_functions,
        }
    }
}

impl Default for DuplicationMetric {
    fn default() -> Self {
        Self::new(4, 3)
    }
}

pub fn fingerprint(func: Node<'_>, grammar: &Grammar) -> Vec<Token> {
    let mut tokens = Vec::new();
    visit_own(func, grammar, |node| {
        if let Some(token) = grammar.token_for(node.kind()) {
            tokens.push(token);
        }
    });
    tokens
}

impl Metric for DuplicationMetric {
    fn kind(&self) -> MetricKind {
        MetricKind::Duplication
    }

    fn description(&self) -> &'static str {
        "Functions sharing the same control-flow skeleton"
    }

    fn weight(&self) -> f64 {
        0.15
    }

    fn requires_tree(&self) -> bool {
        true
    }

    fn analyze(&self, parsed: &ParseResult) -> MetricResult {
        let Some((tree, grammar)) = tree_and_grammar(parsed) else {
            return MetricResult::new(0.0, self.weight(), self.description());
        };
        let functions = function_nodes(parsed, tree);
        if functions.len() < self.min_functions {
            return MetricResult::new(SMALL_SAMPLE_SCORE, self.weight(), self.description());
        }

        let mut groups: BTreeMap<Vec<Token>, Vec<&FunctionRecord>> = BTreeMap::new();
        for (record, node) in &functions {
            let tokens = fingerprint(*node, grammar);
            if tokens.len() >= self.min_tokens {
                groups.entry(tokens).or_default().push(*record);
            }
        }

        let mut duplicates = 0;
        let mut issues = Vec::new();
        for (tokens, members) in groups.iter().filter(|(_, m)| m.len() > 1) {
            duplicates += members.len() - 1;
            let listed: Vec<String> = members
                .iter()
                .map(|f| format!("'{}' (line {})", f.name, f.start_line))
                .collect();
            issues.push(format!(
                "{} functions share a {}-token control-flow structure: {}",
                members.len(),
                tokens.len(),
                listed.join(", ")
            ));
        }

        let duplication_ratio = ratio(duplicates, functions.len());
        MetricResult::new(
            duplication_score(duplication_ratio),
            self.weight(),
            self.description(),
        )
        .with_issues(issues)
    }
}

pub fn duplication_score(duplication_ratio: f64) -> f64 {
    if duplication_ratio <= 0.05 {
        0.0
    } else if duplication_ratio <= 0.1 {
        lerp(duplication_ratio, 0.05, 0.1, 0.0, 0.4)
    } else if duplication_ratio <= 0.2 {
        lerp(duplication_ratio, 0.1, 0.2, 0.4, 1.0)
    } else {
        1.0
    }
}
