//! Rules whose decision depends on two lines of the same block

/// Decision of a correlated rule for the line it just observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correlation {
    Keep,
    /// Drop the line being observed
    DropCurrent,
    /// Remove already emitted lines, identified by their output position and
    /// text; the observed line goes too when `drop_current` is set
    Retract {
        lines: Vec<(usize, String)>,
        drop_current: bool,
    },
}

/// A rule that needs state from more than one line of a block
pub trait CorrelatedRule: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the rule watches blocks of this resource type
    fn applies_to(&self, resource_type: &str) -> bool;

    /// Observe a line that will land at `position` in the output if kept
    fn observe(&mut self, line: &str, position: usize) -> Correlation;

    /// Forget everything seen so far (called at block boundaries)
    fn reset(&mut self);
}

pub const EBS_VOLUME_TYPE: &str = "aws_ebs_volume";

/// `gp2` volumes reject a configured `iops` value, but the generator may emit
/// `iops` before `type`, so `iops` lines are buffered until `gp2` shows up.
/// Once `gp2` is seen it stays in force until the block ends.
#[derive(Debug, Default)]
pub struct IopsOnGp2 {
    pending_iops: Vec<(usize, String)>,
    gp2_seen: bool,
}

impl IopsOnGp2 {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CorrelatedRule for IopsOnGp2 {
    fn name(&self) -> &str {
        "iops-on-gp2"
    }

    fn applies_to(&self, resource_type: &str) -> bool {
        resource_type == EBS_VOLUME_TYPE
    }

    fn observe(&mut self, line: &str, position: usize) -> Correlation {
        let is_iops = line.contains("iops");
        let gp2_before = self.gp2_seen;
        if line.contains("gp2") {
            self.gp2_seen = true;
        }

        if !self.gp2_seen {
            if is_iops {
                self.pending_iops.push((position, line.to_string()));
            }
            return Correlation::Keep;
        }

        let lines = if gp2_before {
            Vec::new()
        } else {
            std::mem::take(&mut self.pending_iops)
        };

        match (lines.is_empty(), is_iops) {
            (true, true) => Correlation::DropCurrent,
            (true, false) => Correlation::Keep,
            (false, drop_current) => Correlation::Retract {
                lines,
                drop_current,
            },
        }
    }

    fn reset(&mut self) {
        self.pending_iops.clear();
        self.gp2_seen = false;
    }
}

/// Correlated rules active for every scan
pub fn default_rules() -> Vec<Box<dyn CorrelatedRule>> {
    vec![Box::new(IopsOnGp2::new())]
}
