pub mod clean;
pub mod rules;

pub use clean::{CleanCommand, CleanOptions};
pub use rules::RulesCommand;
