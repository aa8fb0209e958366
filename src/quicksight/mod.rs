//! Access to the QuickSight metadata API.
//!
//! The [MetadataApi] trait is the seam the backup runner talks to. [QuickSightRest]
//! implements it against the live service.

use aws_credential_types::provider::error::CredentialsError;
use clap::ValueEnum;
use derive_more::{Display, Error, From};
use serde_json::Value;

use crate::document::Document;

pub mod rest;

pub use rest::QuickSightRest;

/// Error code QuickSight uses for resources a describe call can't handle.
pub const INVALID_PARAMETER_VALUE: &str = "InvalidParameterValueException";

/// Kinds of QuickSight resources that are backed up.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, ValueEnum)]
pub enum Category {
    #[display("datasource")]
    #[value(name = "datasource")]
    DataSource,
    #[display("dataset")]
    #[value(name = "dataset")]
    DataSet,
    #[display("analysis")]
    #[value(name = "analysis")]
    Analysis,
    #[display("dashboard")]
    #[value(name = "dashboard")]
    Dashboard,
}

impl Category {
    /// All categories in backup order.
    pub const ALL: [Category; 4] = [
        Category::DataSource,
        Category::DataSet,
        Category::Analysis,
        Category::Dashboard,
    ];

    /// Log target of records concerning this category.
    pub fn log_target(self) -> &'static str {
        match self {
            Category::DataSource => "backup::datasource",
            Category::DataSet => "backup::dataset",
            Category::Analysis => "backup::analysis",
            Category::Dashboard => "backup::dashboard",
        }
    }
}

#[derive(Debug, Display, Error, From)]
/// Errors returned by the QuickSight API or on the way to it.
pub enum SourceError {
    /// No AWS account id was configured.
    #[display("No AWS account id configured")]
    MissingAccountId,
    /// No credentials provider could be found in the environment.
    #[display("No AWS credentials provider configured")]
    MissingCredentials,
    /// The resource has a parameter value describe can't handle.
    #[display("Invalid parameter value: {_0}")]
    InvalidParameterValue(#[error(ignore)] String),
    /// Any other error reported by the service.
    #[display("{code} (HTTP {status}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },
    /// Resolving credentials failed.
    #[display("Resolving AWS credentials failed: {_0}")]
    #[from]
    Credentials(CredentialsError),
    /// Signing the request failed.
    #[display("Signing the request failed: {_0}")]
    Signing(#[error(ignore)] String),
    /// The request didn't reach the service or the response didn't come back.
    #[display("Request to QuickSight failed: {_0}")]
    #[from]
    Transport(reqwest::Error),
    /// The response body isn't JSON.
    #[display("Malformed QuickSight response: {_0}")]
    MalformedResponse(serde_json::Error),
}

impl SourceError {
    /// Whether the item should be skipped rather than counted as failed.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::InvalidParameterValue(_))
    }
}

/// The list and describe operations of every [Category].
///
/// List operations return the raw response, describe operations the full
/// resource description.
pub trait MetadataApi {
    fn list_data_sources(&self, account_id: &str) -> Result<Value, SourceError>;
    fn describe_data_source(
        &self,
        account_id: &str,
        data_source_id: &str,
    ) -> Result<Document, SourceError>;

    fn list_data_sets(&self, account_id: &str) -> Result<Value, SourceError>;
    fn describe_data_set(&self, account_id: &str, data_set_id: &str)
        -> Result<Document, SourceError>;

    fn list_analyses(&self, account_id: &str) -> Result<Value, SourceError>;
    fn describe_analysis(&self, account_id: &str, analysis_id: &str)
        -> Result<Document, SourceError>;

    fn list_dashboards(&self, account_id: &str) -> Result<Value, SourceError>;
    fn describe_dashboard(
        &self,
        account_id: &str,
        dashboard_id: &str,
    ) -> Result<Document, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_match_command_line_values() {
        for category in Category::ALL {
            let parsed = <Category as ValueEnum>::from_str(&category.to_string(), false);
            assert_eq!(parsed, Ok(category));
        }
        assert_eq!(Category::DataSource.to_string(), "datasource");
        assert!(<Category as ValueEnum>::from_str("data-source", false).is_err());
    }

    #[test]
    fn only_invalid_parameter_is_skippable() {
        assert!(SourceError::InvalidParameterValue("unsupported".into()).is_skippable());
        assert!(!SourceError::Service {
            status: 500,
            code: "InternalFailureException".into(),
            message: String::new(),
        }
        .is_skippable());
        assert!(!SourceError::MissingAccountId.is_skippable());
    }
}
