//! Raw HTTP client for the platform REST API.
//!
//! No view awareness — just makes API calls via reqwest and maps
//! non-success statuses and malformed bodies to `ApiError`.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::{ApiError, ApiResult};
use super::types::{OverviewPoint, Run, TrendPoint, UploadRequest};

/// Percent-encoded endpoint URL builders.
///
/// Query values go through `Url::query_pairs_mut` and path segments
/// through `path_segments_mut`, so keys like `svc-a/1.1/r1/index.html`
/// arrive as `svc-a%2F1.1%2Fr1%2Findex.html`.
pub mod endpoints {
    use url::Url;

    fn with_query(base: &Url, path: &str, params: &[(&str, &str)]) -> Url {
        let mut url = join(base, path);
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    fn join(base: &Url, path: &str) -> Url {
        base.join(path)
            .expect("relative API paths always join onto an http(s) base")
    }

    fn with_segment(base: &Url, path: &str, segment: &str) -> Url {
        let mut url = join(base, path);
        url.path_segments_mut()
            .expect("http(s) URLs always have path segments")
            .push(segment);
        url
    }

    pub fn apps(base: &Url) -> Url {
        join(base, "/api/apps")
    }

    pub fn releases(base: &Url, app_id: &str) -> Url {
        with_query(base, "/api/releases", &[("appId", app_id)])
    }

    pub fn runs(base: &Url, app_id: &str, release: Option<&str>) -> Url {
        match release {
            Some(rel) => with_query(base, "/api/runs", &[("appId", app_id), ("release", rel)]),
            None => with_query(base, "/api/runs", &[("appId", app_id)]),
        }
    }

    pub fn upload(base: &Url) -> Url {
        join(base, "/api/upload")
    }

    pub fn view(base: &Url, key: &str) -> Url {
        with_query(base, "/api/view", &[("key", key)])
    }

    pub fn download(base: &Url, key: &str) -> Url {
        with_query(base, "/api/download", &[("key", key)])
    }

    pub fn chart_app(base: &Url, app_id: &str, from: &str, to: &str) -> Url {
        with_query(
            base,
            "/api/charts/app",
            &[("appId", app_id), ("from", from), ("to", to)],
        )
    }

    pub fn chart_release(base: &Url, app_id: &str, release: &str, from: &str, to: &str) -> Url {
        with_query(
            base,
            "/api/charts/release",
            &[
                ("appId", app_id),
                ("release", release),
                ("from", from),
                ("to", to),
            ],
        )
    }

    pub fn admin_run(base: &Url, run_id: &str) -> Url {
        with_segment(base, "/api/admin/run", run_id)
    }

    pub fn admin_release(base: &Url, app_id: &str, release: &str) -> Url {
        with_query(
            base,
            "/api/admin/release",
            &[("appId", app_id), ("release", release)],
        )
    }

    pub fn admin_app(base: &Url, app_id: &str) -> Url {
        with_segment(base, "/api/admin/app", app_id)
    }
}

/// HTTP client for the platform API.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    http: Client,
    base: Url,
}

impl PlatformClient {
    /// Create a client against the given server base URL.
    pub fn new(base: Url) -> Self {
        Self {
            http: Client::new(),
            base,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// GET a JSON endpoint and deserialize the body.
    ///
    /// Read failures map to `Network`, non-success statuses to `Status`
    /// (with the body as message), decode failures to `Shape`.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: if body.is_empty() { "(no body)".into() } else { body },
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Shape(e.to_string()))
    }

    pub async fn list_apps(&self) -> ApiResult<Vec<String>> {
        self.get_json(endpoints::apps(&self.base)).await
    }

    pub async fn list_releases(&self, app_id: &str) -> ApiResult<Vec<String>> {
        self.get_json(endpoints::releases(&self.base, app_id)).await
    }

    pub async fn list_runs(&self, app_id: &str, release: Option<&str>) -> ApiResult<Vec<Run>> {
        self.get_json(endpoints::runs(&self.base, app_id, release))
            .await
    }

    /// Upload a report archive as multipart form data.
    ///
    /// Failure is a non-success status or a 2xx body carrying a non-empty
    /// `{error}` field; the server message wins over the generic fallback.
    pub async fn upload(&self, request: &UploadRequest) -> ApiResult<()> {
        let bytes = tokio::fs::read(&request.file).await?;
        let file_name = Path::new(&request.file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive.zip".into());

        let form = Form::new()
            .text("appId", request.app_id.clone())
            .text("release", request.release.clone())
            .text("executionDate", request.execution_date.clone())
            .part("file", Part::bytes(bytes).file_name(file_name));

        let response = self
            .http
            .post(endpoints::upload(&self.base))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let server_error = extract_error_field(&body);

        if !status.is_success() {
            let message = server_error
                .unwrap_or_else(|| format!("Upload failed ({})", status.as_u16()));
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }
        if let Some(message) = server_error {
            return Err(ApiError::Rejected(message));
        }
        Ok(())
    }

    /// Fetch report markup by storage key, as raw text.
    pub async fn fetch_report(&self, key: &str) -> ApiResult<String> {
        let response = self
            .http
            .get(endpoints::view(&self.base, key))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response.text().await?)
    }

    /// Fetch artifact bytes by storage key.
    pub async fn download(&self, key: &str) -> ApiResult<Vec<u8>> {
        let response = self
            .http
            .get(endpoints::download(&self.base, key))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn overview_chart(
        &self,
        app_id: &str,
        from: &str,
        to: &str,
    ) -> ApiResult<Vec<OverviewPoint>> {
        self.get_json(endpoints::chart_app(&self.base, app_id, from, to))
            .await
    }

    pub async fn trend_chart(
        &self,
        app_id: &str,
        release: &str,
        from: &str,
        to: &str,
    ) -> ApiResult<Vec<TrendPoint>> {
        self.get_json(endpoints::chart_release(&self.base, app_id, release, from, to))
            .await
    }

    async fn delete(&self, url: Url) -> ApiResult<()> {
        let response = self.http.delete(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(())
    }

    pub async fn delete_run(&self, run_id: &str) -> ApiResult<()> {
        self.delete(endpoints::admin_run(&self.base, run_id)).await
    }

    pub async fn delete_release(&self, app_id: &str, release: &str) -> ApiResult<()> {
        self.delete(endpoints::admin_release(&self.base, app_id, release))
            .await
    }

    pub async fn delete_app(&self, app_id: &str) -> ApiResult<()> {
        self.delete(endpoints::admin_app(&self.base, app_id)).await
    }
}

/// Pull a non-empty `error` field out of a JSON body, if there is one.
fn extract_error_field(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("error") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8080").unwrap()
    }

    #[test]
    fn client_creation() {
        let client = PlatformClient::new(base());
        assert_eq!(client.base().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn view_url_percent_encodes_key() {
        let url = endpoints::view(&base(), "svc-a/1.1/r1/index.html");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/view?key=svc-a%2F1.1%2Fr1%2Findex.html"
        );
    }

    #[test]
    fn download_url_matches_view_key() {
        let url = endpoints::download(&base(), "svc-a/1.1/r1/index.html");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/download?key=svc-a%2F1.1%2Fr1%2Findex.html"
        );
    }

    #[test]
    fn releases_url_carries_app_id() {
        let url = endpoints::releases(&base(), "svc-a");
        assert_eq!(url.as_str(), "http://localhost:8080/api/releases?appId=svc-a");
    }

    #[test]
    fn runs_url_release_optional() {
        let strict = endpoints::runs(&base(), "svc-a", Some("1.1"));
        assert_eq!(
            strict.as_str(),
            "http://localhost:8080/api/runs?appId=svc-a&release=1.1"
        );

        let loose = endpoints::runs(&base(), "svc-a", None);
        assert_eq!(loose.as_str(), "http://localhost:8080/api/runs?appId=svc-a");
    }

    #[test]
    fn chart_urls() {
        let overview = endpoints::chart_app(&base(), "svc-a", "2024-01-01", "2024-02-01");
        assert_eq!(
            overview.as_str(),
            "http://localhost:8080/api/charts/app?appId=svc-a&from=2024-01-01&to=2024-02-01"
        );

        let trend = endpoints::chart_release(&base(), "svc-a", "1.1", "2024-01-01", "2024-02-01");
        assert_eq!(
            trend.as_str(),
            "http://localhost:8080/api/charts/release?appId=svc-a&release=1.1&from=2024-01-01&to=2024-02-01"
        );
    }

    #[test]
    fn admin_urls_encode_path_segments() {
        let run = endpoints::admin_run(&base(), "run with space");
        assert_eq!(
            run.as_str(),
            "http://localhost:8080/api/admin/run/run%20with%20space"
        );

        let app = endpoints::admin_app(&base(), "svc-a");
        assert_eq!(app.as_str(), "http://localhost:8080/api/admin/app/svc-a");

        let release = endpoints::admin_release(&base(), "svc-a", "1.1");
        assert_eq!(
            release.as_str(),
            "http://localhost:8080/api/admin/release?appId=svc-a&release=1.1"
        );
    }

    #[test]
    fn base_with_path_prefix_is_respected() {
        let prefixed = Url::parse("http://reports.internal/platform/").unwrap();
        // Absolute /api paths land on the host root, matching the
        // same-origin contract of the web front-end.
        let url = endpoints::apps(&prefixed);
        assert_eq!(url.as_str(), "http://reports.internal/api/apps");
    }

    #[test]
    fn extract_error_field_variants() {
        assert_eq!(
            extract_error_field(r#"{"error": "bad archive"}"#),
            Some("bad archive".into())
        );
        assert_eq!(extract_error_field(r#"{"error": ""}"#), None);
        assert_eq!(extract_error_field(r#"{"status": "ok"}"#), None);
        assert_eq!(extract_error_field("not json"), None);
    }
}
