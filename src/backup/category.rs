use serde_json::Value;

use crate::document::Document;
use crate::quicksight::{Category, MetadataApi, SourceError};

/// Field holding the display name of a summary.
pub const DEFAULT_NAME_FIELD: &str = "Name";

/// List operation of a [Category].
pub type ListFn<A> = fn(&A, &str) -> Result<Value, SourceError>;
/// Describe operation of a [Category].
pub type DescribeFn<A> = fn(&A, &str, &str) -> Result<Document, SourceError>;

/// How to enumerate and describe the resources of one [Category].
pub struct CategoryDescriptor<A> {
    pub category: Category,
    /// Lists the resource summaries of an account.
    pub list: ListFn<A>,
    /// Member of the list response holding the summaries.
    pub list_field: &'static str,
    /// Describes one resource of an account.
    pub describe: DescribeFn<A>,
    /// Member of a summary holding the resource id.
    pub id_field: &'static str,
    /// Member of a summary holding the display name.
    pub name_field: &'static str,
}

/// Descriptors of all categories in backup order.
pub fn descriptors<A: MetadataApi>() -> [CategoryDescriptor<A>; 4] {
    [
        CategoryDescriptor {
            category: Category::DataSource,
            list: A::list_data_sources,
            list_field: "DataSources",
            describe: A::describe_data_source,
            id_field: "DataSourceId",
            name_field: DEFAULT_NAME_FIELD,
        },
        CategoryDescriptor {
            category: Category::DataSet,
            list: A::list_data_sets,
            list_field: "DataSetSummaries",
            describe: A::describe_data_set,
            id_field: "DataSetId",
            name_field: DEFAULT_NAME_FIELD,
        },
        CategoryDescriptor {
            category: Category::Analysis,
            list: A::list_analyses,
            list_field: "AnalysisSummaryList",
            describe: A::describe_analysis,
            id_field: "AnalysisId",
            name_field: DEFAULT_NAME_FIELD,
        },
        CategoryDescriptor {
            category: Category::Dashboard,
            list: A::list_dashboards,
            list_field: "DashboardSummaryList",
            describe: A::describe_dashboard,
            id_field: "DashboardId",
            name_field: DEFAULT_NAME_FIELD,
        },
    ]
}
