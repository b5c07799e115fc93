//! Whole-document removal of empty nested stanzas

use super::rules::RULES;
use tracing::debug;

/// Result of the multiline pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultilinePass {
    pub text: String,
    pub stanzas: usize,
}

/// Delete every stanza matched by the `multiline` rule set
pub fn strip_multiline(text: &str) -> MultilinePass {
    let mut content = text.to_string();
    let mut stanzas = 0;

    for pattern in &RULES.multiline.patterns {
        let (stripped, found) = pattern.remove_all(&content);
        if found > 0 {
            debug!(pattern = pattern.as_str(), count = found, "Removed empty stanzas");
            content = stripped;
            stanzas += found;
        }
    }

    MultilinePass {
        text: content,
        stanzas,
    }
}
