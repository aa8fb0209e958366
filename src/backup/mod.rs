//! The backup run: enumerate every category, describe each resource and
//! persist the description as a JSON snapshot.
//!
//! Failures never abort the run. A resource describe can't handle is skipped
//! with a warning, any other failure of a single resource is logged and the
//! next resource is processed. If listing a category fails the category is
//! abandoned and the run continues with the next one. The outcome of every
//! resource is collected in a [RunReport], the invocation itself always
//! reports success (see [BackupRunner::handle]).

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::document::Document;
use crate::quicksight::{Category, MetadataApi, SourceError};
use crate::store::{ObjectStore, StoreError};

mod category;

pub use category::{descriptors, CategoryDescriptor, DescribeFn, ListFn, DEFAULT_NAME_FIELD};

/// Key prefix of all snapshots unless configured otherwise.
pub const DEFAULT_PREFIX: &str = "quicksight_backup/";
/// Content type of the snapshots.
pub const SNAPSHOT_CONTENT_TYPE: &str = "application/json";
/// Message returned by every invocation.
pub const COMPLETION_MESSAGE: &str = "QuickSight backup completed.";

const UNKNOWN_NAME: &str = "Unknown";

/// Key of the snapshot of resource `id` of `category`.
///
/// ```
/// use qs_backup_lib::backup::snapshot_key;
/// use qs_backup_lib::quicksight::Category;
///
/// assert_eq!(
///     snapshot_key("quicksight_backup/", Category::DataSet, "abc123"),
///     "quicksight_backup/dataset/dataset_abc123.json",
/// );
/// ```
pub fn snapshot_key(prefix: &str, category: Category, id: &str) -> String {
    format!("{prefix}{category}/{category}_{id}.json")
}

/// Settings of a run, fixed for its whole duration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Account whose resources are backed up.
    pub account_id: Option<String>,
    /// Prepended to every snapshot key.
    pub prefix: String,
    /// Categories to back up. They always run in the order of [Category::ALL].
    pub categories: HashSet<Category>,
    /// Describe and serialize, but don't write snapshots.
    pub dry_run: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            account_id: None,
            prefix: DEFAULT_PREFIX.to_string(),
            categories: Category::ALL.into_iter().collect(),
            dry_run: false,
        }
    }
}

/// What happened to a single resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The snapshot was written to `key` (or would have been on a dry run).
    Persisted { key: String },
    /// Describe doesn't support the resource.
    Skipped,
    /// Describing or persisting the resource failed.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    /// `None` if the summary didn't carry an id.
    pub id: Option<String>,
    pub name: String,
    pub outcome: ItemOutcome,
}

#[derive(Debug)]
pub enum CategoryReport {
    /// All listed resources were processed.
    Completed(Vec<ItemReport>),
    /// Listing failed, no resource was processed.
    Abandoned(SourceError),
}

impl CategoryReport {
    /// Reports of the processed resources, empty if abandoned.
    pub fn items(&self) -> &[ItemReport] {
        match self {
            Self::Completed(items) => items,
            Self::Abandoned(_) => &[],
        }
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items().iter().filter(|item| pred(&item.outcome)).count()
    }
}

/// Outcome of a whole run, in category order.
#[derive(Debug)]
pub struct RunReport {
    pub categories: Vec<(Category, CategoryReport)>,
}

impl RunReport {
    pub fn category(&self, category: Category) -> Option<&CategoryReport> {
        self.categories
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, report)| report)
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool + Copy) -> usize {
        self.categories
            .iter()
            .map(|(_, report)| report.count(pred))
            .sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let persisted = self.count(|o| matches!(o, ItemOutcome::Persisted { .. }));
        let skipped = self.count(|o| matches!(o, ItemOutcome::Skipped));
        let failed = self.count(|o| matches!(o, ItemOutcome::Failed));
        let abandoned = self
            .categories
            .iter()
            .filter(|(_, report)| matches!(report, CategoryReport::Abandoned(_)))
            .count();

        write!(
            f,
            "{persisted} persisted, {skipped} skipped, {failed} failed, {abandoned} categories abandoned"
        )
    }
}

/// Result of an invocation.
///
/// `body` holds [COMPLETION_MESSAGE] as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResult {
    pub fn completed() -> Self {
        Self {
            status_code: 200,
            body: Value::from(COMPLETION_MESSAGE).to_string(),
        }
    }
}

/// Backs up the resources of a QuickSight account into an [ObjectStore].
pub struct BackupRunner<A, S> {
    api: A,
    store: S,
    config: RunnerConfig,
}

impl<A: MetadataApi, S: ObjectStore> BackupRunner<A, S> {
    pub fn new(api: A, store: S, config: RunnerConfig) -> Self {
        Self { api, store, config }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Entry point of an invocation.
    ///
    /// The trigger payload is ignored. Always returns [InvocationResult::completed],
    /// failures of single resources or categories are only visible in the log.
    pub fn handle(&self, _event: &Value) -> InvocationResult {
        let report = self.run();
        log::debug!(target: "backup", "Backup finished: {report}");

        InvocationResult::completed()
    }

    /// Backs up all configured categories one after another.
    pub fn run(&self) -> RunReport {
        let categories = descriptors::<A>()
            .iter()
            .filter(|descriptor| self.config.categories.contains(&descriptor.category))
            .map(|descriptor| (descriptor.category, self.backup_category(descriptor)))
            .collect();

        RunReport { categories }
    }

    /// Backs up every resource of one category.
    pub fn backup_category(&self, descriptor: &CategoryDescriptor<A>) -> CategoryReport {
        let category = descriptor.category;
        let target = category.log_target();
        log::info!(target: target, "Start backup of {category}");

        let report = match self.list(descriptor) {
            Ok((account_id, summaries)) => CategoryReport::Completed(
                summaries
                    .iter()
                    .map(|summary| self.backup_item(descriptor, account_id, summary))
                    .collect(),
            ),
            Err(e) => {
                log::error!(target: target, "Listing {category} resources failed: {e}");
                CategoryReport::Abandoned(e)
            }
        };

        log::info!(target: target, "Finished backup of {category}");
        report
    }

    fn list(&self, descriptor: &CategoryDescriptor<A>) -> Result<(&str, Vec<Value>), SourceError> {
        let account_id = self
            .config
            .account_id
            .as_deref()
            .ok_or(SourceError::MissingAccountId)?;
        let mut listing = (descriptor.list)(&self.api, account_id)?;

        let summaries = match listing.get_mut(descriptor.list_field).map(Value::take) {
            Some(Value::Array(summaries)) => summaries,
            _ => Vec::new(),
        };
        log::debug!(
            target: descriptor.category.log_target(),
            "Listed {} {} resources",
            summaries.len(),
            descriptor.category
        );

        Ok((account_id, summaries))
    }

    fn backup_item(
        &self,
        descriptor: &CategoryDescriptor<A>,
        account_id: &str,
        summary: &Value,
    ) -> ItemReport {
        let category = descriptor.category;
        let target = category.log_target();

        let name = summary
            .get(descriptor.name_field)
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_NAME)
            .to_string();
        let Some(id) = summary.get(descriptor.id_field).and_then(Value::as_str) else {
            log::error!(target: target, "Summary of {category} {name} has no {}", descriptor.id_field);
            return ItemReport {
                id: None,
                name,
                outcome: ItemOutcome::Failed,
            };
        };

        let outcome = match (descriptor.describe)(&self.api, account_id, id) {
            Ok(detail) => match self.persist_snapshot(category, id, &detail, &name) {
                Ok(key) => {
                    log::info!(target: target, "Backed up {category} {name} ({id}) to {key}");
                    ItemOutcome::Persisted { key }
                }
                Err(_) => ItemOutcome::Failed,
            },
            Err(e) if e.is_skippable() => {
                log::warn!(target: target, "Skipping unsupported {category} {name} ({id}): {e}");
                ItemOutcome::Skipped
            }
            Err(e) => {
                log::error!(target: target, "Describing {category} {name} ({id}) failed: {e}");
                ItemOutcome::Failed
            }
        };

        ItemReport {
            id: Some(id.to_string()),
            name,
            outcome,
        }
    }

    /// Writes `content` as snapshot of resource `id`.
    ///
    /// Failures are logged here and not retried. The returned error only
    /// feeds the [RunReport].
    pub fn persist_snapshot(
        &self,
        category: Category,
        id: &str,
        content: &Document,
        name: &str,
    ) -> Result<String, StoreError> {
        let target = category.log_target();
        let key = snapshot_key(&self.config.prefix, category, id);

        let written = content.to_json_pretty().map_err(StoreError::from).and_then(|body| {
            if self.config.dry_run {
                log::warn!(target: target, "Dry run: not writing {} bytes to {key}", body.len());
                Ok(())
            } else {
                self.store.put_object(&key, body, SNAPSHOT_CONTENT_TYPE)
            }
        });

        match written {
            Ok(()) => Ok(key),
            Err(e) => {
                log::error!(target: target, "Storing snapshot of {category} {name} ({id}) failed: {e}");
                Err(e)
            }
        }
    }
}
