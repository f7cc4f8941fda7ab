use super::core::CircleClient;
use crate::circleci::types::{
    FlakyTestsResponse, JobMetricsItem, Paged, TestMetricsResponse, WorkflowMetricsItem,
    WorkflowRun,
};
use crate::error::Result;

impl CircleClient {
    /// Pre-aggregated per-workflow metrics over a reporting window.
    pub async fn fetch_workflow_insights(
        &self,
        project_slug: &str,
        window: &str,
    ) -> Result<Vec<WorkflowMetricsItem>> {
        self.fetch_insight_pages(
            &format!("insights/{project_slug}/workflows"),
            &[("reporting-window", window.to_string())],
        )
        .await
    }

    /// Recent runs of one named workflow.
    pub async fn fetch_workflow_runs(
        &self,
        project_slug: &str,
        workflow_name: &str,
    ) -> Result<Vec<WorkflowRun>> {
        self.fetch_insight_pages(
            &format!("insights/{project_slug}/workflows/{workflow_name}"),
            &[],
        )
        .await
    }

    /// Tests that flaked recently anywhere in the project.
    pub async fn fetch_flaky_tests(&self, project_slug: &str) -> Result<FlakyTestsResponse> {
        self.get_json(&format!("insights/{project_slug}/flaky-tests"), &[])
            .await
    }

    /// Pre-aggregated per-job metrics for one workflow.
    pub async fn fetch_job_insights(
        &self,
        project_slug: &str,
        workflow_name: &str,
        window: &str,
    ) -> Result<Vec<JobMetricsItem>> {
        self.fetch_insight_pages(
            &format!("insights/{project_slug}/workflows/{workflow_name}/jobs"),
            &[("reporting-window", window.to_string())],
        )
        .await
    }

    /// Aggregated test health for one workflow.
    pub async fn fetch_test_metrics(
        &self,
        project_slug: &str,
        workflow_name: &str,
    ) -> Result<TestMetricsResponse> {
        self.get_json(
            &format!("insights/{project_slug}/workflows/{workflow_name}/test-metrics"),
            &[],
        )
        .await
    }

    async fn fetch_insight_pages<T>(
        &self,
        path: &str,
        base_query: &[(&str, String)],
    ) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut all_items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = base_query.to_vec();
            if let Some(token) = &page_token {
                query.push(("page-token", token.clone()));
            }

            let page: Paged<T> = self.get_json(path, &query).await?;
            all_items.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetches_workflow_insights_with_the_reporting_window() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/insights/gh/acme/app/workflows")
            .match_query(mockito::Matcher::UrlEncoded(
                "reporting-window".into(),
                "last-30-days".into(),
            ))
            .with_status(200)
            .with_body(
                r#"{"items":[{"name":"build","metrics":{"success_rate":0.97,"total_runs":140,"failed_runs":4,"throughput":4.5,"mttr":1200,"duration_metrics":{"min":60,"max":900,"median":240,"mean":260,"p95":600,"standard_deviation":42.0}}}],"next_page_token":null}"#,
            )
            .create_async()
            .await;

        let client = CircleClient::new(&server.url(), None).unwrap();
        let items = client
            .fetch_workflow_insights("gh/acme/app", "last-30-days")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "build");
        assert_eq!(items[0].metrics.total_runs, 140);
        assert_eq!(items[0].metrics.duration_metrics.p95, 600);
    }

    #[tokio::test]
    async fn fetches_flaky_tests() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/insights/gh/acme/app/flaky-tests")
            .with_status(200)
            .with_body(
                r#"{"flaky_tests":[{"test_name":"test_login","job_name":"unit","times_flaked":9}],"total_flaky_tests":1}"#,
            )
            .create_async()
            .await;

        let client = CircleClient::new(&server.url(), None).unwrap();
        let response = client.fetch_flaky_tests("gh/acme/app").await.unwrap();

        assert_eq!(response.total_flaky_tests, 1);
        assert_eq!(response.flaky_tests[0].times_flaked, 9);
    }

    #[tokio::test]
    async fn fetches_job_insights_across_pages() {
        let mut server = mockito::Server::new_async().await;
        // Mocks match newest-first, so the page-token mock below takes the
        // second request and this one takes the first.
        server
            .mock("GET", "/api/v2/insights/gh/acme/app/workflows/build/jobs")
            .match_query(mockito::Matcher::UrlEncoded(
                "reporting-window".into(),
                "last-90-days".into(),
            ))
            .with_status(200)
            .with_body(
                r#"{"items":[{"name":"unit","metrics":{"success_rate":0.99,"total_runs":50,"duration_metrics":{"median":120,"p95":300}}}],"next_page_token":"next"}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/api/v2/insights/gh/acme/app/workflows/build/jobs")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("reporting-window".into(), "last-90-days".into()),
                mockito::Matcher::UrlEncoded("page-token".into(), "next".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"items":[{"name":"lint","metrics":{"success_rate":1.0,"total_runs":50,"duration_metrics":{"median":30,"p95":45}}}],"next_page_token":null}"#,
            )
            .create_async()
            .await;

        let client = CircleClient::new(&server.url(), None).unwrap();
        let items = client
            .fetch_job_insights("gh/acme/app", "build", "last-90-days")
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "unit");
        assert_eq!(items[1].name, "lint");
    }
}
