use super::core::CircleClient;
use crate::circleci::types::{Job, Paged, Workflow};
use crate::error::{CiviewError, Result};

impl CircleClient {
    /// Fetch all workflows of one pipeline.
    pub async fn fetch_workflows(&self, pipeline_id: &str) -> Result<Vec<Workflow>> {
        let mut all_workflows = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(token) = &page_token {
                query.push(("page-token", token.clone()));
            }

            let page: Paged<Workflow> = self
                .get_json(&format!("pipeline/{pipeline_id}/workflow"), &query)
                .await?;

            all_workflows.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_workflows)
    }

    /// Fetch all jobs of one workflow, dependency edges included.
    pub async fn fetch_jobs(&self, workflow_id: &str) -> Result<Vec<Job>> {
        let mut all_jobs = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query: Vec<(&str, String)> = Vec::new();
            if let Some(token) = &page_token {
                query.push(("page-token", token.clone()));
            }

            let page: Paged<Job> = self
                .get_json(&format!("workflow/{workflow_id}/job"), &query)
                .await
                .map_err(|e| match e {
                    CiviewError::Api { status: 404, .. } => {
                        CiviewError::WorkflowNotFound(workflow_id.to_string())
                    }
                    other => other,
                })?;

            all_jobs.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circleci::status::Status;
    use crate::circleci::types::JobType;

    #[tokio::test]
    async fn fetches_workflows_across_pages() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/pipeline/pipe-1/workflow")
            .match_query(mockito::Matcher::Missing)
            .with_status(200)
            .with_body(
                r#"{"items":[{"id":"wf-1","name":"build","pipeline_id":"pipe-1","pipeline_number":7,"status":"success","created_at":"2024-03-01T12:00:00Z","stopped_at":"2024-03-01T12:05:00Z"}],"next_page_token":"more"}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/api/v2/pipeline/pipe-1/workflow")
            .match_query(mockito::Matcher::UrlEncoded("page-token".into(), "more".into()))
            .with_status(200)
            .with_body(
                r#"{"items":[{"id":"wf-2","name":"deploy","pipeline_id":"pipe-1","pipeline_number":7,"status":"on_hold","created_at":"2024-03-01T12:06:00Z"}],"next_page_token":null}"#,
            )
            .create_async()
            .await;

        let client = CircleClient::new(&server.url(), None).unwrap();
        let workflows = client.fetch_workflows("pipe-1").await.unwrap();

        assert_eq!(workflows.len(), 2);
        assert_eq!(workflows[0].status, Status::Success);
        assert_eq!(workflows[1].status, Status::OnHold);
        assert_eq!(workflows[1].stopped_at, None);
    }

    #[tokio::test]
    async fn fetches_jobs_with_dependencies_and_types() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/workflow/wf-1/job")
            .with_status(200)
            .with_body(
                r#"{"items":[
                    {"id":"job-1","name":"build","status":"success","type":"build","started_at":"2024-03-01T12:00:00Z","stopped_at":"2024-03-01T12:01:00Z","dependencies":[]},
                    {"id":"job-2","name":"release-gate","status":"blocked","type":"approval","dependencies":["job-1"]}
                ],"next_page_token":null}"#,
            )
            .create_async()
            .await;

        let client = CircleClient::new(&server.url(), None).unwrap();
        let jobs = client.fetch_jobs("wf-1").await.unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].job_type, JobType::Build);
        assert_eq!(jobs[1].job_type, JobType::Approval);
        assert_eq!(jobs[1].dependencies, vec!["job-1".to_string()]);
        assert_eq!(jobs[1].started_at, None);
        assert_eq!(jobs[1].status, Status::Blocked);
    }

    #[tokio::test]
    async fn unknown_status_strings_degrade_to_unknown() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/workflow/wf-1/job")
            .with_status(200)
            .with_body(
                r#"{"items":[{"id":"job-1","name":"weird","status":"brand_new_state","type":"build","dependencies":[]}],"next_page_token":null}"#,
            )
            .create_async()
            .await;

        let client = CircleClient::new(&server.url(), None).unwrap();
        let jobs = client.fetch_jobs("wf-1").await.unwrap();

        assert_eq!(jobs[0].status, Status::Unknown);
    }
}
