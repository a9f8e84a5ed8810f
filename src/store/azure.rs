//! store::azure
//!
//! Azure Blob Storage implementation using the REST API.
//!
//! # Design
//!
//! Every request is authorized by appending a shared access signature (SAS)
//! token to the query string. No request signing is done locally, so the
//! client holds no key material beyond the SAS token.
//!
//! | Operation          | Request                                              | Success |
//! |--------------------|------------------------------------------------------|---------|
//! | `create_container` | `PUT /{container}?restype=container`                 | 201     |
//! | `list_blobs`       | `GET /{container}?restype=container&comp=list`       | 200     |
//! | `get_blob`         | `GET /{container}/{blob}`                            | 200     |
//! | `put_blob`         | `PUT /{container}/{blob}` + `x-ms-blob-type`         | 201     |
//! | `delete_blob`      | `DELETE /{container}/{blob}`                         | 202     |
//!
//! A `409 ContainerAlreadyExists` on container creation is reported as
//! [`ContainerOutcome::AlreadyExisted`]. No other status is suppressed.
//! Only a `404 BlobNotFound` is reported as [`StoreError::NotFound`]; a bare
//! 404 means the endpoint or path is wrong and surfaces as an API error.
//!
//! # Example
//!
//! ```ignore
//! use blobvault::store::azure::AzureBlobStore;
//! use blobvault::store::ObjectStore;
//!
//! let store = AzureBlobStore::new("myaccount", "sv=2022-11-02&ss=b&sig=...");
//! store.create_container("vault").await?;
//! store.put_blob("vault", "db-password", b"s3cr3t".to_vec()).await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::traits::{ContainerOutcome, ObjectStore, StoreError};

/// REST API version sent with every request.
const API_VERSION: &str = "2021-08-06";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("blobvault/", env!("CARGO_PKG_VERSION"));

/// Error code Azure returns when creating a container that exists.
const CONTAINER_ALREADY_EXISTS: &str = "ContainerAlreadyExists";

/// Error code Azure returns when the addressed container is missing.
const CONTAINER_NOT_FOUND: &str = "ContainerNotFound";

/// Error code for a missing blob. A 404 without it (e.g. a wrong endpoint
/// path) is an API failure, not a missing secret.
const BLOB_NOT_FOUND: &str = "BlobNotFound";

/// Error code Azure uses for names it cannot address.
const INVALID_RESOURCE_NAME: &str = "InvalidResourceName";

/// Build the default blob endpoint for a storage account.
///
/// # Example
///
/// ```
/// use blobvault::store::azure::default_endpoint;
///
/// assert_eq!(
///     default_endpoint("myaccount"),
///     "https://myaccount.blob.core.windows.net"
/// );
/// ```
pub fn default_endpoint(account: &str) -> String {
    format!("https://{}.blob.core.windows.net", account)
}

/// Azure Blob Storage client.
pub struct AzureBlobStore {
    /// HTTP client (connection pooled, shared across requests)
    client: Client,
    /// Blob service endpoint without trailing slash
    endpoint: String,
    /// SAS token without leading `?`
    sas_token: String,
}

// Custom Debug to avoid exposing the SAS token
impl std::fmt::Debug for AzureBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureBlobStore")
            .field("endpoint", &self.endpoint)
            .field("has_sas_token", &!self.sas_token.is_empty())
            .finish()
    }
}

impl AzureBlobStore {
    /// Create a client for the public Azure endpoint of `account`.
    pub fn new(account: &str, sas_token: impl Into<String>) -> Self {
        Self::with_endpoint(default_endpoint(account), sas_token)
    }

    /// Create a client for a custom endpoint (Azurite, sovereign clouds, tests).
    pub fn with_endpoint(endpoint: impl Into<String>, sas_token: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let sas_token = sas_token.into().trim_start_matches('?').to_string();
        Self {
            client: Client::new(),
            endpoint,
            sas_token,
        }
    }

    /// Get the blob service endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build a request URL for `path` with the given query and the SAS token.
    fn url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let mut params: Vec<String> = query
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        if !self.sas_token.is_empty() {
            params.push(self.sas_token.clone());
        }

        if params.is_empty() {
            format!("{}/{}", self.endpoint, path)
        } else {
            format!("{}/{}?{}", self.endpoint, path, params.join("&"))
        }
    }

    /// Build URL for a blob inside a container.
    ///
    /// `.` and `..` are refused: URL parsing resolves them as dot segments
    /// (percent-encoded or not), so the request would leave the container.
    fn blob_url(&self, container: &str, name: &str) -> Result<String, StoreError> {
        if name == "." || name == ".." {
            return Err(StoreError::Api {
                status: 400,
                code: INVALID_RESOURCE_NAME.to_string(),
                message: format!("blob name '{}' is not addressable", name),
            });
        }
        Ok(self.url(
            &format!("{}/{}", container, urlencoding::encode(name)),
            &[],
        ))
    }

    /// Common headers for every request.
    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-version", HeaderValue::from_static(API_VERSION));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers
    }

    /// Send a request, mapping transport failures.
    async fn send(request: RequestBuilder) -> Result<Response, StoreError> {
        request
            .headers(Self::headers())
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))
    }

    /// Turn a non-success response into a `StoreError`.
    async fn error_from_response(response: Response) -> StoreError {
        let status = response.status();
        let header_code = response
            .headers()
            .get("x-ms-error-code")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        // The header code wins; the XML body may be empty
        let body = response.text().await.unwrap_or_default();
        let parsed = parse_error_body(&body);

        let code = header_code
            .or_else(|| parsed.as_ref().and_then(|p| p.code.clone()))
            .unwrap_or_default();
        let message = parsed
            .and_then(|p| p.message)
            .map(|m| first_line(&m).to_string())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                if code.is_empty() {
                    StoreError::AuthFailed(message)
                } else {
                    StoreError::AuthFailed(format!("{}: {}", code, message))
                }
            }
            StatusCode::NOT_FOUND if code == CONTAINER_NOT_FOUND => {
                StoreError::ContainerNotFound(message)
            }
            StatusCode::NOT_FOUND if code == BLOB_NOT_FOUND => StoreError::NotFound(code),
            StatusCode::CONFLICT if code == CONTAINER_ALREADY_EXISTS => {
                StoreError::AlreadyExists(code)
            }
            _ => StoreError::Api {
                status: status.as_u16(),
                code,
                message,
            },
        }
    }
}

#[async_trait]
impl ObjectStore for AzureBlobStore {
    fn name(&self) -> &'static str {
        "azure"
    }

    async fn create_container(&self, container: &str) -> Result<ContainerOutcome, StoreError> {
        let url = self.url(container, &[("restype", "container")]);
        tracing::debug!(container, "creating container");

        let response = Self::send(self.client.put(&url)).await?;
        if response.status().is_success() {
            return Ok(ContainerOutcome::Created);
        }

        match Self::error_from_response(response).await {
            StoreError::AlreadyExists(_) => Ok(ContainerOutcome::AlreadyExisted),
            other => Err(other),
        }
    }

    async fn list_blobs(&self, container: &str) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut query = vec![("restype", "container"), ("comp", "list")];
            if let Some(ref m) = marker {
                query.push(("marker", m.as_str()));
            }
            let url = self.url(container, &query);
            tracing::debug!(container, marker = marker.as_deref(), "listing blobs");

            let response = Self::send(self.client.get(&url)).await?;
            if !response.status().is_success() {
                return Err(Self::error_from_response(response).await);
            }

            let body = response
                .text()
                .await
                .map_err(|e| StoreError::Network(e.to_string()))?;
            let page = parse_list_response(&body)?;
            names.extend(page.blobs.items.into_iter().map(|b| b.name));

            match page.next_marker.filter(|m| !m.is_empty()) {
                Some(next) if marker.as_deref() != Some(next.as_str()) => marker = Some(next),
                _ => break,
            }
        }

        Ok(names)
    }

    async fn get_blob(&self, container: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        let url = self.blob_url(container, name)?;
        tracing::debug!(container, blob = name, "downloading blob");

        let response = Self::send(self.client.get(&url)).await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn put_blob(
        &self,
        container: &str,
        name: &str,
        data: Vec<u8>,
    ) -> Result<(), StoreError> {
        let url = self.blob_url(container, name)?;
        tracing::debug!(container, blob = name, len = data.len(), "uploading blob");

        let request = self
            .client
            .put(&url)
            .header("x-ms-blob-type", "BlockBlob")
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(data);
        let response = Self::send(request).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn delete_blob(&self, container: &str, name: &str) -> Result<(), StoreError> {
        let url = self.blob_url(container, name)?;
        tracing::debug!(container, blob = name, "deleting blob");

        let response = Self::send(self.client.delete(&url)).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }
}

// =============================================================================
// Azure XML response types
// =============================================================================

/// `List Blobs` response body.
#[derive(Debug, Deserialize)]
struct EnumerationResults {
    #[serde(rename = "Blobs", default)]
    blobs: BlobList,
    #[serde(rename = "NextMarker", default)]
    next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BlobList {
    #[serde(rename = "Blob", default)]
    items: Vec<BlobItem>,
}

#[derive(Debug, Deserialize)]
struct BlobItem {
    #[serde(rename = "Name")]
    name: String,
}

/// Error response body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "Code", default)]
    code: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

/// Azure prefixes XML bodies with a UTF-8 byte order mark.
fn strip_bom(body: &str) -> &str {
    body.trim_start_matches('\u{feff}').trim_start()
}

fn parse_list_response(body: &str) -> Result<EnumerationResults, StoreError> {
    quick_xml::de::from_str(strip_bom(body))
        .map_err(|e| StoreError::InvalidResponse(format!("blob listing: {}", e)))
}

fn parse_error_body(body: &str) -> Option<ErrorBody> {
    let body = strip_bom(body);
    if body.is_empty() {
        return None;
    }
    quick_xml::de::from_str(body).ok()
}

/// Azure appends `RequestId` and `Time` lines to error messages.
fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or("").trim()
}
