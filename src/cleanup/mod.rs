//! Normalization of configuration generated by `terraform plan -generate-config-out`
//!
//! Generated configuration contains attributes that are valid but redundant
//! (`null`, zero values, empty collections, provider-injected prefixes) and
//! empty nested blocks the provider rejects. This module strips them with
//! line-oriented rules instead of a full HCL parser.
//!
//! # Passes
//!
//! 1. **Global**: drops `null` and `= {}` lines everywhere (IAM `Condition`
//!    objects excepted).
//! 2. **Block-scoped**: tracks the enclosing `resource` type and applies its
//!    rule set plus correlated rules such as `iops` on `gp2` volumes.
//! 3. **Multiline**: deletes empty `target_failover` / `target_health_state`
//!    stanzas across line boundaries.
//!
//! # Example
//!
//! ```ignore
//! use crate::cleanup::{BlockClosing, Pipeline};
//!
//! let pipeline = Pipeline::new(&*ctx.fs, BlockClosing::Legacy);
//! let report = pipeline.run(Path::new("imports/dev_ec2_.tf"))?;
//! println!("{} lines removed", report.lines_removed());
//! ```

mod block;
mod correlated;
mod filter;
mod multiline;
mod pipeline;
mod rules;

pub use block::BlockClosing;
pub use pipeline::{CleanupReport, Pipeline};
pub use rules::{RULES, RuleSetSummary};
