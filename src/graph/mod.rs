pub mod dto;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::lookup_string;
use crate::error::AppError;
use crate::models::{
    AttachedResource, DriveItem, EducationAssignment, EducationClass, EducationModule,
    EducationSubmission, NewAssignment, PostedResource, ResourceTarget, TargetKind,
};
use crate::session::{Audience, SessionStore};

#[derive(Clone, Debug)]
pub struct GraphConfig {
    pub api_base: String,
}

impl GraphConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_base: lookup_string(lookup, "GRAPH_API_BASE", "https://graph.microsoft.com/v1.0"),
        }
    }
}

/// Write side of a migration: the Graph education endpoints.
///
/// Every create call makes a new entity; nothing here deduplicates.
#[async_trait]
pub trait EducationClient: Send + Sync {
    /// Fails with `AppError::Auth` when no destination token is available.
    fn ensure_authenticated(&self) -> Result<(), AppError>;
    async fn list_classes(&self) -> Result<Vec<EducationClass>, AppError>;
    async fn create_assignment(
        &self,
        class_id: &str,
        assignment: &NewAssignment,
    ) -> Result<EducationAssignment, AppError>;
    async fn create_module(
        &self,
        class_id: &str,
        display_name: &str,
        description: &str,
    ) -> Result<EducationModule, AppError>;
    /// Returns a copy of `target` carrying the provisioned folder URL.
    async fn setup_resources_folder(
        &self,
        target: &ResourceTarget,
    ) -> Result<ResourceTarget, AppError>;
    async fn post_resource(
        &self,
        target: &ResourceTarget,
        resource: &AttachedResource,
    ) -> Result<PostedResource, AppError>;
    /// Overwrites any existing file with the same name in the folder.
    async fn upload_file(
        &self,
        drive_id: &str,
        item_id: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<DriveItem, AppError>;
    async fn get_assignment(
        &self,
        class_id: &str,
        assignment_id: &str,
    ) -> Result<EducationAssignment, AppError>;
    async fn publish_assignment(
        &self,
        class_id: &str,
        assignment_id: &str,
    ) -> Result<EducationAssignment, AppError>;
    async fn list_submissions(
        &self,
        class_id: &str,
        assignment_id: &str,
    ) -> Result<Vec<EducationSubmission>, AppError>;
    async fn get_submission(
        &self,
        class_id: &str,
        assignment_id: &str,
        submission_id: &str,
    ) -> Result<EducationSubmission, AppError>;
    async fn return_submission(
        &self,
        class_id: &str,
        assignment_id: &str,
        submission_id: &str,
    ) -> Result<EducationSubmission, AppError>;
}

pub struct GraphHttpClient {
    client: Client,
    config: GraphConfig,
    session: Arc<SessionStore>,
}

impl GraphHttpClient {
    pub fn new(
        config: GraphConfig,
        session: Arc<SessionStore>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            config,
            session,
        })
    }

    fn class_url(&self, class_id: &str) -> String {
        format!("{}/education/classes/{}", self.config.api_base, class_id)
    }

    fn target_url(&self, target: &ResourceTarget) -> String {
        format!(
            "{}/{}/{}",
            self.class_url(&target.class_id),
            target.kind.collection(),
            target.id
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, AppError> {
        let token = self.session.bearer(Audience::Graph)?;
        let response = request.bearer_auth(token).send().await?;

        if !response.status().is_success() {
            let err = AppError::from_response(response).await;
            if let AppError::Transient { status, body } = &err {
                match serde_json::from_str::<dto::ODataError>(body) {
                    Ok(odata) => tracing::warn!(
                        "Graph API error {}: {} - {}",
                        status,
                        odata.error.code,
                        odata.error.message
                    ),
                    Err(_) => tracing::warn!("Graph API error {}: {}", status, body),
                }
            }
            return Err(err);
        }
        Ok(response)
    }

    async fn request_json<T, B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, AppError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let text = self.send(request).await?.text().await?;
        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to parse Graph response from {}: {}", url, e);
            AppError::Json(e)
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        self.request_json::<T, ()>(Method::GET, url, None).await
    }

    /// Path-addressed upload into a folder; the file name is percent-encoded.
    fn upload_url(&self, drive_id: &str, item_id: &str, file_name: &str) -> String {
        format!(
            "{}/drives/{}/items/{}:/{}:/content",
            self.config.api_base,
            drive_id,
            item_id,
            urlencoding::encode(file_name)
        )
    }

    /// Follows `@odata.nextLink` until the collection is exhausted.
    async fn list_all<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, AppError> {
        let mut items = Vec::new();
        let mut next = Some(url.to_string());

        while let Some(url) = next {
            let page: dto::ODataResponse<T> = self.get_json(&url).await?;
            items.extend(page.value);
            next = page.next_link;
        }

        Ok(items)
    }
}

#[async_trait]
impl EducationClient for GraphHttpClient {
    fn ensure_authenticated(&self) -> Result<(), AppError> {
        self.session.bearer(Audience::Graph).map(|_| ())
    }

    async fn list_classes(&self) -> Result<Vec<EducationClass>, AppError> {
        let url = format!("{}/education/classes", self.config.api_base);
        self.list_all(&url).await
    }

    async fn create_assignment(
        &self,
        class_id: &str,
        assignment: &NewAssignment,
    ) -> Result<EducationAssignment, AppError> {
        let url = format!("{}/assignments", self.class_url(class_id));
        let mut created: EducationAssignment = self
            .request_json(Method::POST, &url, Some(assignment))
            .await
            .map_err(|e| AppError::destination_write("createAssignment", class_id, None, e))?;
        if created.class_id.is_empty() {
            created.class_id = class_id.to_string();
        }
        tracing::info!(
            "Created assignment '{}' ({}) in class {}",
            created.display_name,
            created.id,
            class_id
        );
        Ok(created)
    }

    async fn create_module(
        &self,
        class_id: &str,
        display_name: &str,
        description: &str,
    ) -> Result<EducationModule, AppError> {
        let url = format!("{}/modules", self.class_url(class_id));
        let body = dto::NewModuleRequest {
            display_name,
            description,
        };
        let mut created: EducationModule = self
            .request_json(Method::POST, &url, Some(&body))
            .await
            .map_err(|e| AppError::destination_write("createModule", class_id, None, e))?;
        if created.class_id.is_empty() {
            created.class_id = class_id.to_string();
        }
        tracing::info!(
            "Created module '{}' ({}) in class {}",
            created.display_name,
            created.id,
            class_id
        );
        Ok(created)
    }

    async fn setup_resources_folder(
        &self,
        target: &ResourceTarget,
    ) -> Result<ResourceTarget, AppError> {
        let url = format!("{}/setUpResourcesFolder", self.target_url(target));
        let wrap = |e: AppError| {
            AppError::destination_write(
                "setUpResourcesFolder",
                &target.class_id,
                Some(&target.id),
                e,
            )
        };

        let response: dto::ResourcesFolderResponse = self
            .request_json(Method::POST, &url, Some(&serde_json::json!({})))
            .await
            .map_err(wrap)?;

        let folder_url = response.resources_folder_url.ok_or_else(|| {
            wrap(AppError::BadRequest(
                "setUpResourcesFolder returned no resourcesFolderUrl".to_string(),
            ))
        })?;
        Ok(target.clone().with_resources_folder(folder_url))
    }

    async fn post_resource(
        &self,
        target: &ResourceTarget,
        attached: &AttachedResource,
    ) -> Result<PostedResource, AppError> {
        let url = format!("{}/resources", self.target_url(target));
        let result: Result<PostedResource, AppError> = match target.kind {
            TargetKind::Assignment => {
                let body = dto::AssignmentResourceRequest {
                    distribute_for_student_work: attached.distribute_for_student_work,
                    resource: &attached.resource,
                };
                self.request_json(Method::POST, &url, Some(&body)).await
            }
            TargetKind::Module => {
                let body = dto::ModuleResourceRequest {
                    resource: &attached.resource,
                };
                self.request_json(Method::POST, &url, Some(&body)).await
            }
        };
        result.map_err(|e| {
            AppError::destination_write("postResource", &target.class_id, Some(&target.id), e)
        })
    }

    async fn upload_file(
        &self,
        drive_id: &str,
        item_id: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<DriveItem, AppError> {
        let url = self.upload_url(drive_id, item_id, file_name);
        let request = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content);

        let text = self.send(request).await?.text().await?;
        serde_json::from_str::<DriveItem>(&text).map_err(|e| {
            tracing::error!("Failed to parse upload response for {}: {}", file_name, e);
            AppError::Json(e)
        })
    }

    async fn get_assignment(
        &self,
        class_id: &str,
        assignment_id: &str,
    ) -> Result<EducationAssignment, AppError> {
        let url = format!("{}/assignments/{}", self.class_url(class_id), assignment_id);
        self.get_json(&url).await
    }

    async fn publish_assignment(
        &self,
        class_id: &str,
        assignment_id: &str,
    ) -> Result<EducationAssignment, AppError> {
        let url = format!(
            "{}/assignments/{}/publish",
            self.class_url(class_id),
            assignment_id
        );
        self.request_json(Method::POST, &url, Some(&serde_json::json!({})))
            .await
            .map_err(|e| {
                AppError::destination_write("publishAssignment", class_id, Some(assignment_id), e)
            })
    }

    async fn list_submissions(
        &self,
        class_id: &str,
        assignment_id: &str,
    ) -> Result<Vec<EducationSubmission>, AppError> {
        let url = format!(
            "{}/assignments/{}/submissions",
            self.class_url(class_id),
            assignment_id
        );
        self.list_all(&url).await
    }

    async fn get_submission(
        &self,
        class_id: &str,
        assignment_id: &str,
        submission_id: &str,
    ) -> Result<EducationSubmission, AppError> {
        let url = format!(
            "{}/assignments/{}/submissions/{}",
            self.class_url(class_id),
            assignment_id,
            submission_id
        );
        self.get_json(&url).await
    }

    async fn return_submission(
        &self,
        class_id: &str,
        assignment_id: &str,
        submission_id: &str,
    ) -> Result<EducationSubmission, AppError> {
        let url = format!(
            "{}/assignments/{}/submissions/{}/return",
            self.class_url(class_id),
            assignment_id,
            submission_id
        );
        self.request_json(Method::POST, &url, Some(&serde_json::json!({})))
            .await
            .map_err(|e| {
                AppError::destination_write("returnSubmission", class_id, Some(assignment_id), e)
            })
    }
}
