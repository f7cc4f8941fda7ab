use super::core::CircleClient;
use crate::circleci::types::{Paged, Pipeline};
use crate::error::{CiviewError, Result};

impl CircleClient {
    /// Fetch one page of a project's pipelines, most recent first.
    pub async fn list_pipelines(
        &self,
        project_slug: &str,
        branch: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<Paged<Pipeline>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(branch) = branch {
            query.push(("branch", branch.to_string()));
        }
        if let Some(token) = page_token {
            query.push(("page-token", token.to_string()));
        }

        self.get_json(&format!("project/{project_slug}/pipeline"), &query)
            .await
            .map_err(|e| match e {
                CiviewError::Api { status: 404, .. } => {
                    CiviewError::ProjectNotFound(project_slug.to_string())
                }
                other => other,
            })
    }

    /// Fetch up to `max_pages` pages of pipelines. The bound caps API load
    /// on busy projects; it is a tunable, not a completeness guarantee.
    pub async fn fetch_pipelines(
        &self,
        project_slug: &str,
        branch: Option<&str>,
        max_pages: usize,
    ) -> Result<Vec<Pipeline>> {
        let mut all_pipelines = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..max_pages {
            let page = self
                .list_pipelines(project_slug, branch, page_token.as_deref())
                .await?;

            all_pipelines.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_pipelines)
    }
}
