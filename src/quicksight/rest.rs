use std::time::SystemTime;

use aws_config::SdkConfig;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use serde_json::Value;
use tokio::runtime::Handle;

use super::{MetadataApi, SourceError, INVALID_PARAMETER_VALUE};
use crate::document::Document;

const SIGNING_NAME: &str = "quicksight";
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";
const UNKNOWN_ERROR: &str = "UnknownError";

/// Client of the QuickSight [REST API].
///
/// Requests are signed with SigV4 using the credentials of the ambient AWS
/// environment. Calls block on the given tokio runtime.
///
/// Only the first page of list results is fetched, `NextToken` is ignored.
///
/// [REST API]: https://docs.aws.amazon.com/quicksight/latest/APIReference/
#[derive(Debug, Clone)]
pub struct QuickSightRest {
    http: reqwest::Client,
    credentials: Option<SharedCredentialsProvider>,
    region: String,
    endpoint: String,
    runtime: Handle,
}

impl QuickSightRest {
    /// Create a client for `region` using the credentials of `sdk_config`.
    pub fn new(sdk_config: &SdkConfig, region: &str, runtime: Handle) -> Self {
        let credentials = sdk_config.credentials_provider();
        if credentials.is_none() {
            log::warn!(target: "quicksight::rest", "No AWS credentials provider found");
        }

        Self {
            http: reqwest::Client::new(),
            credentials,
            region: region.to_string(),
            endpoint: endpoint(region),
            runtime,
        }
    }

    fn get(&self, path: &str) -> Result<Value, SourceError> {
        self.runtime.block_on(self.get_async(path))
    }

    async fn get_async(&self, path: &str) -> Result<Value, SourceError> {
        let url = format!("{}{path}", self.endpoint);
        log::trace!(target: "quicksight::rest", "GET {url}");

        let credentials = self
            .credentials
            .as_ref()
            .ok_or(SourceError::MissingCredentials)?
            .provide_credentials()
            .await?;
        let identity: Identity = credentials.into();

        let signing_params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(SIGNING_NAME)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| SourceError::Signing(e.to_string()))?
            .into();
        let signable = SignableRequest::new(
            "GET",
            url.as_str(),
            std::iter::empty(),
            SignableBody::Bytes(&[]),
        )
        .map_err(|e| SourceError::Signing(e.to_string()))?;
        let (instructions, _signature) = sign(signable, &signing_params)
            .map_err(|e| SourceError::Signing(e.to_string()))?
            .into_parts();

        let mut request = self.http.get(&url);
        for (name, value) in instructions.headers() {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let error_type = response
            .headers()
            .get(ERROR_TYPE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;
        log::debug!(target: "quicksight::rest", "GET {path}: {status}");

        if status.is_success() {
            serde_json::from_slice(&body).map_err(SourceError::MalformedResponse)
        } else {
            Err(classify_error(status.as_u16(), error_type.as_deref(), &body))
        }
    }
}

impl MetadataApi for QuickSightRest {
    fn list_data_sources(&self, account_id: &str) -> Result<Value, SourceError> {
        self.get(&collection_path(account_id, "data-sources"))
    }

    fn describe_data_source(
        &self,
        account_id: &str,
        data_source_id: &str,
    ) -> Result<Document, SourceError> {
        self.get(&item_path(account_id, "data-sources", data_source_id))
            .map(Document::from_response)
    }

    fn list_data_sets(&self, account_id: &str) -> Result<Value, SourceError> {
        self.get(&collection_path(account_id, "data-sets"))
    }

    fn describe_data_set(
        &self,
        account_id: &str,
        data_set_id: &str,
    ) -> Result<Document, SourceError> {
        self.get(&item_path(account_id, "data-sets", data_set_id))
            .map(Document::from_response)
    }

    fn list_analyses(&self, account_id: &str) -> Result<Value, SourceError> {
        self.get(&collection_path(account_id, "analyses"))
    }

    fn describe_analysis(
        &self,
        account_id: &str,
        analysis_id: &str,
    ) -> Result<Document, SourceError> {
        self.get(&item_path(account_id, "analyses", analysis_id))
            .map(Document::from_response)
    }

    fn list_dashboards(&self, account_id: &str) -> Result<Value, SourceError> {
        self.get(&collection_path(account_id, "dashboards"))
    }

    fn describe_dashboard(
        &self,
        account_id: &str,
        dashboard_id: &str,
    ) -> Result<Document, SourceError> {
        self.get(&item_path(account_id, "dashboards", dashboard_id))
            .map(Document::from_response)
    }
}

fn endpoint(region: &str) -> String {
    format!("https://quicksight.{region}.amazonaws.com")
}

fn collection_path(account_id: &str, collection: &str) -> String {
    format!("/accounts/{account_id}/{collection}")
}

fn item_path(account_id: &str, collection: &str, id: &str) -> String {
    format!("/accounts/{account_id}/{collection}/{id}")
}

/// Maps an error response to a [SourceError].
///
/// The error code is taken from the `x-amzn-ErrorType` header, or the
/// `__type`/`code` member of the body. Anything after `:` and before `#` is
/// dropped (`InvalidParameterValueException:http://...`,
/// `com.amazonaws.quicksight#InvalidParameterValueException`).
fn classify_error(status: u16, error_type: Option<&str>, body: &[u8]) -> SourceError {
    let body: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

    let code = error_type
        .or_else(|| {
            body.get("__type")
                .or_else(|| body.get("code"))
                .and_then(Value::as_str)
        })
        .map(|raw| {
            let raw = raw.split(':').next().unwrap_or(raw);
            raw.rsplit('#').next().unwrap_or(raw).trim().to_string()
        })
        .filter(|code| !code.is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string());

    let message = body
        .get("Message")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if code == INVALID_PARAMETER_VALUE {
        SourceError::InvalidParameterValue(message)
    } else {
        SourceError::Service {
            status,
            code,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(
            endpoint("ap-northeast-1"),
            "https://quicksight.ap-northeast-1.amazonaws.com"
        );
        assert_eq!(
            collection_path("123456789012", "data-sets"),
            "/accounts/123456789012/data-sets"
        );
        assert_eq!(
            item_path("123456789012", "dashboards", "abc123"),
            "/accounts/123456789012/dashboards/abc123"
        );
    }

    #[test]
    fn invalid_parameter_from_header() {
        let err = classify_error(
            400,
            Some("InvalidParameterValueException:http://internal.amazon.com/coral/com.amazonaws.quicksight/"),
            br#"{"Message":"Data set type is not supported through API yet","RequestId":"r"}"#,
        );

        assert!(err.is_skippable());
        assert_eq!(
            err.to_string(),
            "Invalid parameter value: Data set type is not supported through API yet"
        );
    }

    #[test]
    fn invalid_parameter_from_body() {
        let err = classify_error(
            400,
            None,
            br#"{"__type":"com.amazonaws.quicksight#InvalidParameterValueException","message":"nope"}"#,
        );

        assert!(matches!(err, SourceError::InvalidParameterValue(ref m) if m == "nope"));
    }

    #[test]
    fn other_errors_are_not_skippable() {
        let err = classify_error(
            404,
            Some("ResourceNotFoundException"),
            br#"{"Message":"missing"}"#,
        );
        match err {
            SourceError::Service {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 404);
                assert_eq!(code, "ResourceNotFoundException");
                assert_eq!(message, "missing");
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = classify_error(503, None, b"<html>unavailable</html>");
        assert!(matches!(err, SourceError::Service { ref code, .. } if code == UNKNOWN_ERROR));
    }
}
