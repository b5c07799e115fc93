//! Compiled-in removal rules for generated resource configuration
//!
//! The rule table maps a Terraform resource type to the ordered patterns whose
//! lines are dropped from generated configuration. Two reserved scopes exist
//! next to the resource types: `global` (applied to every line in a separate,
//! earlier pass) and `multiline` (whole-document patterns spanning lines).
//!
//! The table is built once on first use and never mutated afterwards.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Scope name of the rule set applied regardless of the enclosing block
pub const GLOBAL_SCOPE: &str = "global";

/// Scope name of the whole-document patterns
pub const MULTILINE_SCOPE: &str = "multiline";

const ZERO_VALUE: &str = "= 0";
const EMPTY_LIST: &str = r"= \[\]";
const LAUNCH_TEMPLATE_ID: &str = r#"= "lt-"#;
const NAME_PREFIX: &str = "name_prefix";

/// A single removal pattern
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Plain substring match
    Literal(&'static str),
    /// Regular expression searched anywhere in the input
    Regex(Regex),
}

impl Pattern {
    pub fn literal(text: &'static str) -> Self {
        Pattern::Literal(text)
    }

    /// Compile a built-in regular expression pattern.
    ///
    /// Panics on an invalid expression: every caller passes a constant.
    pub fn regex(source: &str) -> Self {
        let regex = Regex::new(source)
            .unwrap_or_else(|e| panic!("Invalid cleanup pattern {:?}: {}", source, e));
        Pattern::Regex(regex)
    }

    pub fn is_match(&self, input: &str) -> bool {
        match self {
            Pattern::Literal(text) => input.contains(text),
            Pattern::Regex(regex) => regex.is_match(input),
        }
    }

    /// Pattern source text
    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Literal(text) => text,
            Pattern::Regex(regex) => regex.as_str(),
        }
    }

    /// Delete every match, returning the new text and the match count
    pub fn remove_all(&self, input: &str) -> (String, usize) {
        match self {
            Pattern::Literal(text) => (input.replace(text, ""), input.matches(text).count()),
            Pattern::Regex(regex) => {
                let count = regex.find_iter(input).count();
                (regex.replace_all(input, "").into_owned(), count)
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Pattern::Literal(_) => "literal",
            Pattern::Regex(_) => "regex",
        }
    }
}

/// A line that matches a removal pattern is kept anyway when `keep_if` matches
/// (and `when`, if set, matches too).
#[derive(Debug, Clone)]
pub struct Exception {
    pub when: Option<Pattern>,
    pub keep_if: Pattern,
}

impl Exception {
    pub fn applies(&self, line: &str) -> bool {
        let triggered = self.when.as_ref().is_none_or(|when| when.is_match(line));
        triggered && self.keep_if.is_match(line)
    }

    pub fn describe(&self) -> String {
        match &self.when {
            Some(when) => format!(
                "keep lines matching '{}' that contain '{}'",
                when.as_str(),
                self.keep_if.as_str()
            ),
            None => format!("never remove lines containing '{}'", self.keep_if.as_str()),
        }
    }
}

/// Ordered removal patterns for one scope
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub scope: &'static str,
    pub patterns: Vec<Pattern>,
    pub exceptions: Vec<Exception>,
}

impl RuleSet {
    fn new(scope: &'static str, patterns: Vec<Pattern>) -> Self {
        Self {
            scope,
            patterns,
            exceptions: Vec::new(),
        }
    }

    fn with_exception(mut self, exception: Exception) -> Self {
        self.exceptions.push(exception);
        self
    }

    /// Whether an exception protects this line from every pattern
    pub fn is_preserved(&self, line: &str) -> bool {
        self.exceptions.iter().any(|e| e.applies(line))
    }

    /// The first pattern that removes `line`, if any
    pub fn removal_match(&self, line: &str) -> Option<&Pattern> {
        let pattern = self.patterns.iter().find(|p| p.is_match(line))?;

        if self.is_preserved(line) {
            return None;
        }

        Some(pattern)
    }

    pub fn summary(&self) -> RuleSetSummary {
        RuleSetSummary {
            scope: self.scope.to_string(),
            patterns: self
                .patterns
                .iter()
                .map(|p| PatternSummary {
                    kind: p.kind().to_string(),
                    pattern: p.as_str().to_string(),
                })
                .collect(),
            exceptions: self.exceptions.iter().map(|e| e.describe()).collect(),
        }
    }
}

/// Serializable view of a rule set, used by the `rules` command
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RuleSetSummary {
    pub scope: String,
    pub patterns: Vec<PatternSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatternSummary {
    pub kind: String,
    pub pattern: String,
}

/// Full rule table: global, multiline and per-resource-type rule sets
#[derive(Debug)]
pub struct RuleTable {
    pub global: RuleSet,
    pub multiline: RuleSet,
    by_type: BTreeMap<&'static str, RuleSet>,
}

impl RuleTable {
    /// Rule set for a resource type. Global patterns are not merged in.
    pub fn rules_for(&self, resource_type: &str) -> Option<&RuleSet> {
        self.by_type.get(resource_type)
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_type.keys().copied()
    }

    pub fn typed_rule_sets(&self) -> impl Iterator<Item = &RuleSet> {
        self.by_type.values()
    }
}

/// Build a stanza pattern for an empty nested block named `block`.
///
/// A stanza alone on its line is removed together with its indentation and
/// line ending; an inline stanza is removed in place.
fn empty_stanza(block: &str) -> Pattern {
    Pattern::regex(&format!(
        r"(?ms)^[ \t]*{block}\s*\{{\s*\}}[ \t]*(?:\r?\n|\z)|{block}\s*\{{\s*\}}"
    ))
}

fn regexes(sources: &[&str]) -> Vec<Pattern> {
    sources.iter().map(|s| Pattern::regex(s)).collect()
}

fn preserve_min_size() -> Exception {
    Exception {
        when: None,
        keep_if: Pattern::literal("min_size"),
    }
}

fn build_rule_table() -> RuleTable {
    let global = RuleSet::new(
        GLOBAL_SCOPE,
        vec![Pattern::literal("null"), Pattern::literal("= {}")],
    )
    // IAM condition objects inside jsonencode() policies are legitimately empty
    .with_exception(Exception {
        when: Some(Pattern::literal("= {}")),
        keep_if: Pattern::literal("Condition"),
    });

    let multiline = RuleSet::new(
        MULTILINE_SCOPE,
        vec![
            empty_stanza("target_failover"),
            empty_stanza("target_health_state"),
        ],
    );

    let typed = vec![
        RuleSet::new(
            "aws_instance",
            regexes(&[ZERO_VALUE, EMPTY_LIST, "ipv6_address_count", LAUNCH_TEMPLATE_ID]),
        ),
        RuleSet::new("aws_rds_cluster", regexes(&[ZERO_VALUE, EMPTY_LIST])),
        RuleSet::new("aws_rds_cluster_instance", regexes(&[ZERO_VALUE, EMPTY_LIST])),
        RuleSet::new("aws_db_instance", regexes(&[ZERO_VALUE, EMPTY_LIST])),
        RuleSet::new(
            "aws_route53_record",
            regexes(&["multivalue_answer_routing_policy", ZERO_VALUE, EMPTY_LIST]),
        ),
        RuleSet::new("aws_ebs_volume", regexes(&[ZERO_VALUE])),
        RuleSet::new(
            "aws_eks_node_group",
            regexes(&[ZERO_VALUE, EMPTY_LIST, "node_group_name_prefix", LAUNCH_TEMPLATE_ID]),
        )
        .with_exception(preserve_min_size()),
        RuleSet::new("aws_security_group", regexes(&[NAME_PREFIX])),
        RuleSet::new(
            "aws_launch_template",
            regexes(&[NAME_PREFIX, ZERO_VALUE, EMPTY_LIST]),
        ),
        RuleSet::new("aws_lb", regexes(&["subnets "])),
        RuleSet::new("aws_lb_target_group", regexes(&[ZERO_VALUE])),
        RuleSet::new(
            "aws_autoscaling_group",
            regexes(&[ZERO_VALUE, EMPTY_LIST, "availability_zones", NAME_PREFIX]),
        )
        .with_exception(preserve_min_size()),
    ];

    RuleTable {
        global,
        multiline,
        by_type: typed.into_iter().map(|set| (set.scope, set)).collect(),
    }
}

lazy_static! {
    pub static ref RULES: RuleTable = build_rule_table();
}
