//! Resource block boundary detection
//!
//! Tracks which resource type the scan is currently inside without parsing
//! the configuration. Only `resource "<type>" "<name>" {` headers are
//! recognized as block openings.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref BLOCK_OPEN: Regex = Regex::new(r#"^\s*resource\s+"(\w+)"\s+"[^"]+"\s+\{"#)
        .expect("Invalid block opening regex");
    static ref TOP_LEVEL_CLOSE: Regex =
        Regex::new(r"^\}\s*$").expect("Invalid block closing regex");
}

/// How the end of a resource block is recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockClosing {
    /// No line closes a block; the type carries over to every following line
    /// (blank lines and comments included) until the next resource header.
    /// Generated files rely on this today.
    #[default]
    Legacy,
    /// A lone `}` at column 0 closes the current block
    TopLevelBrace,
}

/// Scan state for one pass over one document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Outside,
    Inside { resource_type: String },
}

/// What a line did to the scan state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Opened { resource_type: String },
    Closed,
    Interior,
}

#[derive(Debug)]
pub struct BlockDetector {
    closing: BlockClosing,
    state: ScanState,
}

impl BlockDetector {
    pub fn new(closing: BlockClosing) -> Self {
        Self {
            closing,
            state: ScanState::Outside,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn current_type(&self) -> Option<&str> {
        match &self.state {
            ScanState::Inside { resource_type } => Some(resource_type),
            ScanState::Outside => None,
        }
    }

    /// Feed the next line and update the scan state
    pub fn advance(&mut self, line: &str) -> Transition {
        if let Some(caps) = BLOCK_OPEN.captures(line) {
            let resource_type = caps[1].to_string();
            self.state = ScanState::Inside {
                resource_type: resource_type.clone(),
            };
            return Transition::Opened { resource_type };
        }

        if self.closes(line) {
            self.state = ScanState::Outside;
            return Transition::Closed;
        }

        Transition::Interior
    }

    fn closes(&self, line: &str) -> bool {
        match (self.closing, &self.state) {
            (_, ScanState::Outside) => false,
            (BlockClosing::Legacy, _) => false,
            (BlockClosing::TopLevelBrace, _) => TOP_LEVEL_CLOSE.is_match(line),
        }
    }
}
