//! Line-level filtering passes
//!
//! Both passes keep every surviving line byte-for-byte, including its line
//! ending, so a pass over already-clean text is a no-op.

use super::block::{BlockClosing, BlockDetector, Transition};
use super::correlated::{self, CorrelatedRule, Correlation};
use super::rules::RULES;
use tracing::{debug, trace};

/// Result of the global pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalPass {
    pub text: String,
    pub removed: usize,
}

/// Result of the block-scoped pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPass {
    pub text: String,
    /// Lines dropped by the resource type's rule set
    pub removed: usize,
    /// Lines dropped by correlated rules
    pub correlated: usize,
}

/// Whether the rule set of `current_type` removes `line`.
///
/// Types without a rule set keep every line; global defaults are handled
/// by [`filter_global`], not here.
pub fn should_remove(line: &str, current_type: Option<&str>) -> bool {
    current_type
        .and_then(|resource_type| RULES.rules_for(resource_type))
        .is_some_and(|rules| rules.removal_match(line).is_some())
}

/// Drop every line matching a global pattern, whatever block it sits in
pub fn filter_global(text: &str) -> GlobalPass {
    let mut kept = String::with_capacity(text.len());
    let mut removed = 0;

    for (number, line) in text.split_inclusive('\n').enumerate() {
        if let Some(pattern) = RULES.global.removal_match(line) {
            debug!(
                line = number + 1,
                pattern = pattern.as_str(),
                "Removed global default"
            );
            removed += 1;
            continue;
        }

        if RULES.global.is_preserved(line) {
            trace!(line = number + 1, "Preserved policy condition");
        }

        kept.push_str(line);
    }

    GlobalPass {
        text: kept,
        removed,
    }
}

/// Single traversal applying the rule set of the enclosing resource type and
/// the correlated rules
pub fn filter_blocks(text: &str, closing: BlockClosing) -> BlockPass {
    let mut detector = BlockDetector::new(closing);
    let mut rules = correlated::default_rules();
    let mut kept: Vec<&str> = Vec::new();
    let mut removed = 0;
    let mut correlated = 0;

    for (number, line) in text.split_inclusive('\n').enumerate() {
        match detector.advance(line) {
            Transition::Opened { resource_type } => {
                debug!(line = number + 1, resource_type = %resource_type, "Entered resource block");
                reset_all(&mut rules);
                kept.push(line);
                continue;
            }
            Transition::Closed => {
                debug!(line = number + 1, "Left resource block");
                reset_all(&mut rules);
                kept.push(line);
                continue;
            }
            Transition::Interior => {}
        }

        let Some(resource_type) = detector.current_type() else {
            kept.push(line);
            continue;
        };

        let mut drop_current = false;
        for rule in rules.iter_mut().filter(|r| r.applies_to(resource_type)) {
            match rule.observe(line, kept.len()) {
                Correlation::Keep => {}
                Correlation::DropCurrent => {
                    debug!(line = number + 1, rule = rule.name(), "Dropped correlated line");
                    drop_current = true;
                }
                Correlation::Retract {
                    mut lines,
                    drop_current: drop,
                } => {
                    // Highest position first
                    lines.sort_by(|a, b| b.0.cmp(&a.0));
                    for (index, retracted) in lines {
                        if kept.get(index) == Some(&retracted.as_str()) {
                            debug!(rule = rule.name(), line = %retracted.trim_end(), "Retracted correlated line");
                            kept.remove(index);
                            correlated += 1;
                        }
                    }
                    if drop {
                        debug!(line = number + 1, rule = rule.name(), "Dropped correlated line");
                        drop_current = true;
                    }
                }
            }
        }

        if drop_current {
            correlated += 1;
            continue;
        }

        if should_remove(line, Some(resource_type)) {
            debug!(line = number + 1, resource_type = %resource_type, "Removed line by type rule");
            removed += 1;
            continue;
        }

        kept.push(line);
    }

    BlockPass {
        text: kept.concat(),
        removed,
        correlated,
    }
}

fn reset_all(rules: &mut [Box<dyn CorrelatedRule>]) {
    for rule in rules.iter_mut() {
        rule.reset();
    }
}
