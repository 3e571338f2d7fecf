//! HTTP client implementation
//!
//! Wraps reqwest and implements the RecordStore trait from rstore-core.

use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;
use url::Url;

use rstore_core::{
    Alias, BucketInfo, BucketSettings, EntryInfo, Error, Record, RecordStore, RecordStream, Result,
};

use crate::protocol::{
    API_PREFIX, BucketListResponse, BucketResponse, EntryListResponse, ErrorResponse, QueryResponse,
};

/// Client for the record storage HTTP API.
#[derive(Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpClient {
    /// Create a new client from an alias.
    ///
    /// The token, when present, is sent as a Bearer authorization header on
    /// every request. `timeout` applies per request, not to a whole
    /// transfer.
    pub fn new(alias: &Alias, timeout: Duration) -> Result<Self> {
        let base = Url::parse(&alias.url).map_err(|_| Error::Parse(alias.url.clone()))?;

        let mut headers = HeaderMap::new();
        if !alias.token.is_empty() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", alias.token))
                .map_err(|_| Error::Config(format!("Invalid token for alias '{}'", alias.name)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(transport_error)?;

        Ok(Self { http, base })
    }

    /// Build an API URL from path segments, e.g. `["b", "my-bucket"]`.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Config(format!("Invalid endpoint URL '{}'", self.base)))?;
            path.pop_if_empty();
            path.extend(API_PREFIX.split('/'));
            path.extend(segments);
        }
        Ok(url)
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    Error::Remote(e.to_string())
}

/// Turn a non-2xx response into `Error::Remote`, preferring the service's
/// own `detail` message over the bare status line.
async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match response.json::<ErrorResponse>().await {
        Ok(body) => Err(Error::Remote(body.detail)),
        Err(_) => Err(Error::Remote(format!("Request failed with status {status}"))),
    }
}

/// Resolve the response of a bucket create.
///
/// "Create or reuse": with `exist_ok`, a conflict means the bucket already
/// exists and is kept as-is, settings untouched.
async fn finish_create(response: reqwest::Response, bucket: &str, exist_ok: bool) -> Result<()> {
    if response.status() == StatusCode::CONFLICT && exist_ok {
        debug!(bucket, "Bucket already exists, reusing");
        return Ok(());
    }

    check(response).await?;
    Ok(())
}

#[async_trait]
impl RecordStore for HttpClient {
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        let url = self.url(&["b"])?;
        let response = check(self.http.get(url).send().await.map_err(transport_error)?).await?;
        let body: BucketListResponse = response.json().await.map_err(transport_error)?;
        Ok(body.buckets)
    }

    async fn get_bucket(&self, name: &str) -> Result<BucketInfo> {
        let url = self.url(&["b", name])?;
        let response = check(self.http.get(url).send().await.map_err(transport_error)?).await?;
        let body: BucketResponse = response.json().await.map_err(transport_error)?;
        Ok(body.info)
    }

    async fn get_settings(&self, bucket: &str) -> Result<BucketSettings> {
        let url = self.url(&["b", bucket])?;
        let response = check(self.http.get(url).send().await.map_err(transport_error)?).await?;
        let body: BucketResponse = response.json().await.map_err(transport_error)?;
        Ok(body.settings)
    }

    async fn create_bucket(
        &self,
        bucket: &str,
        settings: &BucketSettings,
        exist_ok: bool,
    ) -> Result<()> {
        let url = self.url(&["b", bucket])?;
        let response = self
            .http
            .post(url)
            .json(settings)
            .send()
            .await
            .map_err(transport_error)?;
        finish_create(response, bucket, exist_ok).await
    }

    async fn remove_bucket(&self, bucket: &str) -> Result<()> {
        let url = self.url(&["b", bucket])?;
        check(self.http.delete(url).send().await.map_err(transport_error)?).await?;
        Ok(())
    }

    async fn get_entry_list(&self, bucket: &str) -> Result<Vec<EntryInfo>> {
        let url = self.url(&["b", bucket, "entries"])?;
        let response = check(self.http.get(url).send().await.map_err(transport_error)?).await?;
        let body: EntryListResponse = response.json().await.map_err(transport_error)?;
        Ok(body.entries)
    }

    async fn query(
        &self,
        bucket: &str,
        entry: &str,
        start: i64,
        stop: i64,
    ) -> Result<RecordStream> {
        let mut url = self.url(&["b", bucket, entry, "q"])?;
        url.query_pairs_mut()
            .append_pair("start", &start.to_string())
            .append_pair("stop", &stop.to_string());

        let response = check(self.http.get(url).send().await.map_err(transport_error)?).await?;
        let body: QueryResponse = response.json().await.map_err(transport_error)?;
        debug!(bucket, entry, count = body.records.len(), "Query resolved");

        // Each record's content is fetched lazily, when the stream yields it
        let http = self.http.clone();
        let content_url = self.url(&["b", bucket, entry])?;
        let records = futures::stream::iter(body.records)
            .then(move |meta| {
                let http = http.clone();
                let mut url = content_url.clone();
                async move {
                    url.query_pairs_mut().append_pair("ts", &meta.ts.to_string());
                    let response =
                        check(http.get(url).send().await.map_err(transport_error)?).await?;
                    let data = response
                        .bytes_stream()
                        .map_err(transport_error)
                        .boxed();
                    Ok(Record {
                        timestamp: meta.ts,
                        size: meta.size,
                        content_type: meta.content_type,
                        data,
                    })
                }
            })
            .boxed();

        Ok(records)
    }

    async fn write_record(&self, bucket: &str, entry: &str, record: Record) -> Result<()> {
        let mut url = self.url(&["b", bucket, entry])?;
        url.query_pairs_mut()
            .append_pair("ts", &record.timestamp.to_string());

        let mut request = self
            .http
            .post(url)
            .header(CONTENT_LENGTH, record.size)
            .body(reqwest::Body::wrap_stream(record.data));
        if let Some(content_type) = &record.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }

        check(request.send().await.map_err(transport_error)?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> HttpClient {
        let alias = Alias::new("test", url, "token");
        HttpClient::new(&alias, Duration::from_secs(60)).unwrap()
    }

    #[test]
    fn test_url_building() {
        let client = client("http://127.0.0.1:8383");
        let url = client.url(&["b", "my-bucket", "entry-1", "q"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8383/api/v1/b/my-bucket/entry-1/q"
        );
    }

    #[test]
    fn test_url_building_with_base_path() {
        let client = client("http://host:8383/storage/");
        let url = client.url(&["b"]).unwrap();
        assert_eq!(url.as_str(), "http://host:8383/storage/api/v1/b");
    }

    #[test]
    fn test_invalid_alias_url() {
        let alias = Alias::new("bad", "not a url", "");
        let err = HttpClient::new(&alias, Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind(), "ParseError");
    }

    #[tokio::test]
    async fn test_check_passes_success() {
        let response = http::Response::builder()
            .status(200)
            .body("ok")
            .unwrap()
            .into();
        assert!(check(response).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_maps_service_detail() {
        let response = http::Response::builder()
            .status(404)
            .body(r#"{"detail":"Bucket 'x' is not found"}"#)
            .unwrap()
            .into();
        let err = check(response).await.unwrap_err();
        assert_eq!(err.to_string(), "Bucket 'x' is not found");
        assert_eq!(err.kind(), "RemoteError");
    }

    fn conflict_response() -> reqwest::Response {
        http::Response::builder()
            .status(409)
            .body(r#"{"detail":"Bucket 'dest' already exists"}"#)
            .unwrap()
            .into()
    }

    #[tokio::test]
    async fn test_create_conflict_with_exist_ok_is_success() {
        finish_create(conflict_response(), "dest", true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_conflict_without_exist_ok_fails() {
        let err = finish_create(conflict_response(), "dest", false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "RemoteError");
        assert_eq!(err.to_string(), "Bucket 'dest' already exists");
    }

    #[tokio::test]
    async fn test_create_success_passes_through() {
        let response = http::Response::builder()
            .status(200)
            .body("{}")
            .unwrap()
            .into();
        finish_create(response, "dest", false).await.unwrap();
    }

    #[tokio::test]
    async fn test_check_falls_back_to_status() {
        let response = http::Response::builder()
            .status(503)
            .body("not json")
            .unwrap()
            .into();
        let err = check(response).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
