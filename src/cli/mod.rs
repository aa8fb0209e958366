use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::backup::{RunnerConfig, DEFAULT_PREFIX};
use crate::quicksight::Category;

/// Region of the QuickSight account if `AWS_REGION` isn't set.
pub const DEFAULT_REGION: &str = "ap-northeast-1";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Verbosity of the command output.
    #[arg(long)]
    pub verbose: Option<LevelFilter>,

    /// Bucket the snapshots are written to.
    #[arg(long, env = "S3_BUCKET_NAME")]
    pub bucket: Option<String>,

    /// Prefix of every snapshot key.
    #[arg(long, env = "S3_PREFIX", default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Region of the QuickSight account.
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Id of the AWS account owning the QuickSight resources.
    #[arg(long, env = "AWS_ACCOUNT_ID")]
    pub account_id: Option<String>,

    /// Simulative backup run: resources are described but nothing is written.
    #[arg(long)]
    pub dry_run: bool,

    /// Resource categories to back up. (Default: all)
    #[arg(long = "category", value_enum)]
    pub categories: Vec<Category>,

    /// JSON file with the payload that triggered the run.
    #[arg(long)]
    pub event: Option<PathBuf>,
}

impl Cli {
    /// Settings of the backup run.
    pub fn runner_config(&self) -> RunnerConfig {
        let categories = if self.categories.is_empty() {
            Category::ALL.into_iter().collect()
        } else {
            self.categories.iter().copied().collect()
        };

        RunnerConfig {
            account_id: self.account_id.clone(),
            prefix: self.prefix.clone(),
            categories,
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn categories_default_to_all() {
        let cli = Cli::try_parse_from(["qs-backup", "--account-id", "123456789012"]).unwrap();
        let config = cli.runner_config();

        assert_eq!(config.account_id.as_deref(), Some("123456789012"));
        assert_eq!(config.categories, HashSet::from(Category::ALL));
        assert!(!config.dry_run);
        assert!(cli.event.is_none());
    }

    #[test]
    fn explicit_options() {
        let cli = Cli::try_parse_from([
            "qs-backup",
            "--bucket",
            "backups",
            "--prefix",
            "qs/",
            "--region",
            "eu-west-1",
            "--category",
            "dashboard",
            "--category",
            "datasource",
            "--dry-run",
            "--verbose",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.bucket.as_deref(), Some("backups"));
        assert_eq!(cli.region, "eu-west-1");
        assert_eq!(cli.verbose, Some(LevelFilter::Debug));

        let config = cli.runner_config();
        assert_eq!(config.prefix, "qs/");
        assert!(config.dry_run);
        assert_eq!(
            config.categories,
            HashSet::from([Category::Dashboard, Category::DataSource])
        );
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["qs-backup", "--category", "theme"]).is_err());
    }
}
