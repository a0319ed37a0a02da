pub mod dto;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::lookup_string;
use crate::error::AppError;
use crate::models::{Course, CourseWork, CourseWorkMaterial, DriveFileMetadata};
use crate::session::{Audience, SessionStore};

use dto::Paged;

#[derive(Clone, Debug)]
pub struct ClassroomConfig {
    pub api_base: String,
    pub drive_base: String,
}

impl ClassroomConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_base: lookup_string(
                lookup,
                "CLASSROOM_API_BASE",
                "https://classroom.googleapis.com/v1",
            ),
            drive_base: lookup_string(
                lookup,
                "DRIVE_API_BASE",
                "https://www.googleapis.com/drive/v3",
            ),
        }
    }
}

/// Read side of a migration: Google Classroom plus the Drive files it links to.
#[async_trait]
pub trait ClassroomClient: Send + Sync {
    /// Fails with `AppError::Auth` when no source token is available.
    fn ensure_authenticated(&self) -> Result<(), AppError>;
    async fn list_courses(&self) -> Result<Vec<Course>, AppError>;
    async fn list_course_work(&self, course_id: &str) -> Result<Vec<CourseWork>, AppError>;
    async fn list_course_work_materials(
        &self,
        course_id: &str,
    ) -> Result<Vec<CourseWorkMaterial>, AppError>;
    async fn get_file_metadata(&self, file_id: &str) -> Result<DriveFileMetadata, AppError>;
    /// Server-side conversion of a Google-native file into `mime_type`.
    async fn export_file(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>, AppError>;
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, AppError>;
}

pub struct ClassroomHttpClient {
    client: Client,
    config: ClassroomConfig,
    session: Arc<SessionStore>,
}

impl ClassroomHttpClient {
    pub fn new(
        config: ClassroomConfig,
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

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, AppError> {
        let token = self.session.bearer(Audience::Classroom)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = AppError::from_response(response).await;
            tracing::warn!("Classroom API call failed: GET {} - {}", url, err);
            return Err(err);
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let body = self.get(url, query).await?.text().await?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            tracing::error!("Failed to parse Classroom response from {}: {}", url, e);
            AppError::Json(e)
        })
    }

    /// Follows `nextPageToken` until the listing is exhausted.
    async fn list_all<R>(&self, url: &str) -> Result<Vec<R::Item>, AppError>
    where
        R: DeserializeOwned + Paged,
    {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", "100")];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: R = self.get_json(url, &query).await?;
            let (mut batch, next) = page.into_page();
            items.append(&mut batch);

            match next {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl ClassroomClient for ClassroomHttpClient {
    fn ensure_authenticated(&self) -> Result<(), AppError> {
        self.session.bearer(Audience::Classroom).map(|_| ())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, AppError> {
        let url = format!("{}/courses", self.config.api_base);
        let courses = self.list_all::<dto::ListCoursesResponse>(&url).await?;
        Ok(courses.into_iter().map(Course::from).collect())
    }

    async fn list_course_work(&self, course_id: &str) -> Result<Vec<CourseWork>, AppError> {
        let url = format!("{}/courses/{}/courseWork", self.config.api_base, course_id);
        let items = self.list_all::<dto::ListCourseWorkResponse>(&url).await?;
        Ok(items.into_iter().map(CourseWork::from).collect())
    }

    async fn list_course_work_materials(
        &self,
        course_id: &str,
    ) -> Result<Vec<CourseWorkMaterial>, AppError> {
        let url = format!(
            "{}/courses/{}/courseWorkMaterials",
            self.config.api_base, course_id
        );
        let items = self
            .list_all::<dto::ListCourseWorkMaterialResponse>(&url)
            .await?;
        Ok(items.into_iter().map(CourseWorkMaterial::from).collect())
    }

    async fn get_file_metadata(&self, file_id: &str) -> Result<DriveFileMetadata, AppError> {
        let url = format!("{}/files/{}", self.config.drive_base, file_id);
        self.get_json(&url, &[("fields", "id,name,mimeType")]).await
    }

    async fn export_file(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>, AppError> {
        let url = format!("{}/files/{}/export", self.config.drive_base, file_id);
        let bytes = self
            .get(&url, &[("mimeType", mime_type)])
            .await?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, AppError> {
        let url = format!("{}/files/{}", self.config.drive_base, file_id);
        let bytes = self.get(&url, &[("alt", "media")]).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
