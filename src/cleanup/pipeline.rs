use super::block::BlockClosing;
use super::filter::{filter_blocks, filter_global};
use super::multiline::strip_multiline;
use crate::traits::FileSystem;
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Lines and stanzas removed by one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub global_removed: usize,
    pub block_removed: usize,
    pub correlated_removed: usize,
    pub stanzas_removed: usize,
}

impl CleanupReport {
    pub fn lines_removed(&self) -> usize {
        self.global_removed + self.block_removed + self.correlated_removed
    }

    pub fn is_clean(&self) -> bool {
        self.lines_removed() == 0 && self.stanzas_removed == 0
    }
}

/// Runs the three cleanup passes: global defaults, block-scoped rules, then
/// empty multiline stanzas.
pub struct Pipeline<'a> {
    fs: &'a dyn FileSystem,
    closing: BlockClosing,
}

impl<'a> Pipeline<'a> {
    pub fn new(fs: &'a dyn FileSystem, closing: BlockClosing) -> Self {
        Self { fs, closing }
    }

    /// Clean the file at `path` in place.
    ///
    /// Every pass reads the file and writes its result back before the next
    /// pass starts, so a failure leaves the output of the completed passes on
    /// disk.
    pub fn run(&self, path: &Path) -> Result<CleanupReport> {
        let mut report = CleanupReport::default();

        report.global_removed = self.rewrite(path, |text| {
            let pass = filter_global(text);
            (pass.text, pass.removed)
        })?;
        info!(file = %path.display(), removed = report.global_removed, "Global pass finished");

        let mut correlated = 0;
        report.block_removed = self.rewrite(path, |text| {
            let pass = filter_blocks(text, self.closing);
            correlated = pass.correlated;
            (pass.text, pass.removed)
        })?;
        report.correlated_removed = correlated;
        info!(
            file = %path.display(),
            removed = report.block_removed,
            correlated = report.correlated_removed,
            "Block pass finished"
        );

        report.stanzas_removed = self.rewrite(path, |text| {
            let pass = strip_multiline(text);
            (pass.text, pass.stanzas)
        })?;
        info!(file = %path.display(), stanzas = report.stanzas_removed, "Multiline pass finished");

        Ok(report)
    }

    /// The same passes over an in-memory document
    pub fn clean_text(&self, text: &str) -> (String, CleanupReport) {
        let global = filter_global(text);
        let blocks = filter_blocks(&global.text, self.closing);
        let multiline = strip_multiline(&blocks.text);

        let report = CleanupReport {
            global_removed: global.removed,
            block_removed: blocks.removed,
            correlated_removed: blocks.correlated,
            stanzas_removed: multiline.stanzas,
        };

        (multiline.text, report)
    }

    fn rewrite<F>(&self, path: &Path, pass: F) -> Result<usize>
    where
        F: FnOnce(&str) -> (String, usize),
    {
        let content = self.fs.read_to_string(path)?;
        let (cleaned, removed) = pass(&content);
        self.fs.write(path, &cleaned)?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockFileSystem;
    use std::path::PathBuf;

    const GENERATED: &str = r#"# __generated__ by Terraform
# Please review these resources and move them into your main configuration files.

# __generated__ by Terraform from "vol-0a1b2c3d"
resource "aws_ebs_volume" "data_volume" {
  availability_zone    = "eu-west-1a"
  encrypted            = true
  final_snapshot       = null
  iops                 = 3000
  kms_key_id           = null
  multi_attach_enabled = false
  size                 = 100
  snapshot_id          = null
  tags                 = {}
  throughput           = 0
  type                 = "gp2"
}

# __generated__ by Terraform from "arn:aws:elasticloadbalancing:eu-west-1:123:targetgroup/web/abc"
resource "aws_lb_target_group" "web" {
  deregistration_delay = jsonencode(300)
  name                 = "web"
  port                 = 80
  slow_start           = 0
  target_failover {
  }
  target_health_state {
  }
}

# __generated__ by Terraform from "web-role"
resource "aws_iam_role" "web" {
  assume_role_policy = jsonencode({
    Statement = [{
      Action    = "sts:AssumeRole"
      Condition = {}
      Effect    = "Allow"
    }]
  })
  description          = null
  max_session_duration = 0
  name                 = "web-role"
  tags                 = {}
}
"#;

    const EXPECTED: &str = r#"# __generated__ by Terraform
# Please review these resources and move them into your main configuration files.

# __generated__ by Terraform from "vol-0a1b2c3d"
resource "aws_ebs_volume" "data_volume" {
  availability_zone    = "eu-west-1a"
  encrypted            = true
  multi_attach_enabled = false
  size                 = 100
  type                 = "gp2"
}

# __generated__ by Terraform from "arn:aws:elasticloadbalancing:eu-west-1:123:targetgroup/web/abc"
resource "aws_lb_target_group" "web" {
  deregistration_delay = jsonencode(300)
  name                 = "web"
  port                 = 80
}

# __generated__ by Terraform from "web-role"
resource "aws_iam_role" "web" {
  assume_role_policy = jsonencode({
    Statement = [{
      Action    = "sts:AssumeRole"
      Condition = {}
      Effect    = "Allow"
    }]
  })
  max_session_duration = 0
  name                 = "web-role"
}
"#;

    fn mock_with(path: &Path, content: &str) -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.write(path, content).unwrap();
        fs
    }

    #[test]
    fn test_run_rewrites_file_in_place() {
        let path = PathBuf::from("/repo/dev_eu-west-1_ebs_.tf");
        let fs = mock_with(&path, GENERATED);
        let pipeline = Pipeline::new(&fs, BlockClosing::Legacy);

        let report = pipeline.run(&path).unwrap();

        assert_eq!(fs.get_file_contents(&path).unwrap(), EXPECTED);
        assert_eq!(
            report,
            CleanupReport {
                global_removed: 6,
                block_removed: 2,
                correlated_removed: 1,
                stanzas_removed: 2,
            }
        );
    }

    #[test]
    fn test_clean_text_matches_file_run() {
        let path = PathBuf::from("/repo/generated.tf");
        let fs = mock_with(&path, GENERATED);
        let pipeline = Pipeline::new(&fs, BlockClosing::Legacy);

        let (text, report) = pipeline.clean_text(GENERATED);
        let file_report = pipeline.run(&path).unwrap();

        assert_eq!(text, fs.get_file_contents(&path).unwrap());
        assert_eq!(report, file_report);
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let path = PathBuf::from("/repo/generated.tf");
        let fs = mock_with(&path, GENERATED);
        let pipeline = Pipeline::new(&fs, BlockClosing::Legacy);

        pipeline.run(&path).unwrap();
        let once = fs.get_file_contents(&path).unwrap();

        let second = pipeline.run(&path).unwrap();
        let twice = fs.get_file_contents(&path).unwrap();

        assert_eq!(once, twice);
        assert!(second.is_clean());
    }

    #[test]
    fn test_gp2_volume_with_late_iops_is_idempotent() {
        let input = concat!(
            "resource \"aws_ebs_volume\" \"data\" {\n",
            "  iops = 3000\n",
            "  type = \"gp2\"\n",
            "  iops = 100\n",
            "}\n",
        );
        let fs = MockFileSystem::new();
        let pipeline = Pipeline::new(&fs, BlockClosing::Legacy);

        let (once, report) = pipeline.clean_text(input);
        let (twice, second) = pipeline.clean_text(&once);

        assert_eq!(once, "resource \"aws_ebs_volume\" \"data\" {\n  type = \"gp2\"\n}\n");
        assert_eq!(report.correlated_removed, 2);
        assert_eq!(twice, once);
        assert!(second.is_clean());
    }

    #[test]
    fn test_unknown_type_only_loses_global_lines() {
        let input = "resource \"aws_s3_bucket\" \"logs\" {\n  bucket = \"logs\"\n  object_lock_enabled = 0\n  grants = []\n  policy = null\n}\n";
        let fs = MockFileSystem::new();
        let pipeline = Pipeline::new(&fs, BlockClosing::Legacy);

        let (text, report) = pipeline.clean_text(input);

        assert_eq!(
            text,
            "resource \"aws_s3_bucket\" \"logs\" {\n  bucket = \"logs\"\n  object_lock_enabled = 0\n  grants = []\n}\n"
        );
        assert_eq!(report.global_removed, 1);
        assert_eq!(report.block_removed, 0);
    }

    #[test]
    fn test_rule_scoped_to_matching_type() {
        let line = "  name_prefix = \"terraform-2024\"\n";
        let fs = MockFileSystem::new();
        let pipeline = Pipeline::new(&fs, BlockClosing::Legacy);

        let inside = format!("resource \"aws_security_group\" \"sg\" {{\n{line}}}\n");
        let (text, _) = pipeline.clean_text(&inside);
        assert!(!text.contains("name_prefix"));

        let unrelated = format!("resource \"aws_lb\" \"lb\" {{\n{line}}}\n");
        let (text, _) = pipeline.clean_text(&unrelated);
        assert!(text.contains("name_prefix"));
    }

    #[test]
    fn test_missing_file_fails() {
        let fs = MockFileSystem::new();
        let pipeline = Pipeline::new(&fs, BlockClosing::Legacy);

        let result = pipeline.run(Path::new("/repo/missing.tf"));
        assert!(result.is_err());
    }
}
