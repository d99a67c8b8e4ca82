//! Platform API layer — wire types, errors, and the reqwest client.
//!
//! The runner talks to the server through the `ReportApi` trait so the
//! controller and runner can be exercised without a network.

pub mod client;
pub mod error;
pub mod types;

use async_trait::async_trait;

pub use client::PlatformClient;
pub use error::{ApiError, ApiResult};
pub use types::{OverviewPoint, Run, TrendPoint, UploadRequest};

/// The platform's HTTP contract, one method per endpoint.
#[async_trait]
pub trait ReportApi: Send + Sync {
    async fn list_apps(&self) -> ApiResult<Vec<String>>;
    async fn list_releases(&self, app_id: &str) -> ApiResult<Vec<String>>;
    async fn list_runs(&self, app_id: &str, release: Option<&str>) -> ApiResult<Vec<Run>>;
    async fn upload(&self, request: &UploadRequest) -> ApiResult<()>;
    async fn fetch_report(&self, key: &str) -> ApiResult<String>;
    async fn download(&self, key: &str) -> ApiResult<Vec<u8>>;
    async fn overview_chart(&self, app_id: &str, from: &str, to: &str)
        -> ApiResult<Vec<OverviewPoint>>;
    async fn trend_chart(
        &self,
        app_id: &str,
        release: &str,
        from: &str,
        to: &str,
    ) -> ApiResult<Vec<TrendPoint>>;
    async fn delete_run(&self, run_id: &str) -> ApiResult<()>;
    async fn delete_release(&self, app_id: &str, release: &str) -> ApiResult<()>;
    async fn delete_app(&self, app_id: &str) -> ApiResult<()>;
}

#[async_trait]
impl ReportApi for PlatformClient {
    async fn list_apps(&self) -> ApiResult<Vec<String>> {
        PlatformClient::list_apps(self).await
    }

    async fn list_releases(&self, app_id: &str) -> ApiResult<Vec<String>> {
        PlatformClient::list_releases(self, app_id).await
    }

    async fn list_runs(&self, app_id: &str, release: Option<&str>) -> ApiResult<Vec<Run>> {
        PlatformClient::list_runs(self, app_id, release).await
    }

    async fn upload(&self, request: &UploadRequest) -> ApiResult<()> {
        PlatformClient::upload(self, request).await
    }

    async fn fetch_report(&self, key: &str) -> ApiResult<String> {
        PlatformClient::fetch_report(self, key).await
    }

    async fn download(&self, key: &str) -> ApiResult<Vec<u8>> {
        PlatformClient::download(self, key).await
    }

    async fn overview_chart(
        &self,
        app_id: &str,
        from: &str,
        to: &str,
    ) -> ApiResult<Vec<OverviewPoint>> {
        PlatformClient::overview_chart(self, app_id, from, to).await
    }

    async fn trend_chart(
        &self,
        app_id: &str,
        release: &str,
        from: &str,
        to: &str,
    ) -> ApiResult<Vec<TrendPoint>> {
        PlatformClient::trend_chart(self, app_id, release, from, to).await
    }

    async fn delete_run(&self, run_id: &str) -> ApiResult<()> {
        PlatformClient::delete_run(self, run_id).await
    }

    async fn delete_release(&self, app_id: &str, release: &str) -> ApiResult<()> {
        PlatformClient::delete_release(self, app_id, release).await
    }

    async fn delete_app(&self, app_id: &str) -> ApiResult<()> {
        PlatformClient::delete_app(self, app_id).await
    }
}
