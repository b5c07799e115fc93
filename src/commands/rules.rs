use crate::cleanup::{RULES, RuleSetSummary};
use crate::context::Context;
use anyhow::{Context as AnyhowContext, Result};
use serde::Serialize;

/// Handles the 'rules' command - prints the compiled-in rule table
pub struct RulesCommand;

#[derive(Debug, Serialize)]
struct RuleTableView {
    global: RuleSetSummary,
    multiline: RuleSetSummary,
    resource_types: Vec<RuleSetSummary>,
}

impl RulesCommand {
    /// Execute the rules command
    pub fn execute(ctx: &Context, resource_type: Option<&str>, json: bool) -> Result<()> {
        if let Some(resource_type) = resource_type {
            let Some(rules) = RULES.rules_for(resource_type) else {
                let known: Vec<&str> = RULES.resource_types().collect();
                anyhow::bail!(
                    "No rules for resource type '{}'. Known types: {}",
                    resource_type,
                    known.join(", ")
                );
            };

            let summary = rules.summary();
            if json {
                Self::print_json(ctx, &summary)?;
            } else {
                ctx.output.section(&format!("Rules for {}", resource_type));
                Self::print_rule_set(ctx, &summary);
            }
            return Ok(());
        }

        let view = RuleTableView {
            global: RULES.global.summary(),
            multiline: RULES.multiline.summary(),
            resource_types: RULES.typed_rule_sets().map(|r| r.summary()).collect(),
        };

        if json {
            return Self::print_json(ctx, &view);
        }

        ctx.output.section("Cleanup rules");

        ctx.output.subsection("Global (every line)");
        Self::print_rule_set(ctx, &view.global);

        ctx.output.subsection("Multiline (whole document)");
        Self::print_rule_set(ctx, &view.multiline);

        for summary in &view.resource_types {
            ctx.output.subsection(&summary.scope);
            Self::print_rule_set(ctx, summary);
        }

        Ok(())
    }

    fn print_json<T: Serialize>(ctx: &Context, value: &T) -> Result<()> {
        let json =
            serde_json::to_string_pretty(value).context("Failed to serialize rule table")?;
        ctx.output.raw(&format!("{}\n", json));
        Ok(())
    }

    fn print_rule_set(ctx: &Context, summary: &RuleSetSummary) {
        for pattern in &summary.patterns {
            ctx.output.key_value(&pattern.kind, &pattern.pattern);
        }

        for exception in &summary.exceptions {
            ctx.output.dimmed(&format!("  except: {}", exception));
        }
    }
}
