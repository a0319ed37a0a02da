use serde::Deserialize;

use crate::models::{
    Course, CourseWork, CourseWorkMaterial, DriveFile, DueDate, DueTime, Link, Material, ShareMode,
    YoutubeVideo,
};

/// List responses that carry a `nextPageToken`.
pub trait Paged {
    type Item;

    fn into_page(self) -> (Vec<Self::Item>, Option<String>);
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCoursesResponse {
    #[serde(default)]
    pub courses: Vec<CourseDto>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Paged for ListCoursesResponse {
    type Item = CourseDto;

    fn into_page(self) -> (Vec<CourseDto>, Option<String>) {
        (self.courses, self.next_page_token)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCourseWorkResponse {
    #[serde(default)]
    pub course_work: Vec<CourseWorkDto>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Paged for ListCourseWorkResponse {
    type Item = CourseWorkDto;

    fn into_page(self) -> (Vec<CourseWorkDto>, Option<String>) {
        (self.course_work, self.next_page_token)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCourseWorkMaterialResponse {
    #[serde(default)]
    pub course_work_material: Vec<CourseWorkMaterialDto>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Paged for ListCourseWorkMaterialResponse {
    type Item = CourseWorkMaterialDto;

    fn into_page(self) -> (Vec<CourseWorkMaterialDto>, Option<String>) {
        (self.course_work_material, self.next_page_token)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_heading: Option<String>,
}

impl From<CourseDto> for Course {
    fn from(dto: CourseDto) -> Self {
        Course {
            id: dto.id,
            name: dto.name,
            section: dto.section,
            description: dto.description.or(dto.description_heading),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWorkDto {
    pub id: String,
    pub course_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub materials: Vec<MaterialDto>,
    #[serde(default)]
    pub due_date: Option<DueDate>,
    #[serde(default)]
    pub due_time: Option<DueTime>,
    #[serde(default)]
    pub max_points: Option<f64>,
}

impl From<CourseWorkDto> for CourseWork {
    fn from(dto: CourseWorkDto) -> Self {
        CourseWork {
            id: dto.id,
            course_id: dto.course_id,
            title: dto.title,
            description: dto.description,
            state: dto.state,
            materials: into_materials(dto.materials),
            due_date: dto.due_date,
            due_time: dto.due_time,
            max_points: dto.max_points,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWorkMaterialDto {
    pub id: String,
    pub course_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub materials: Vec<MaterialDto>,
}

impl From<CourseWorkMaterialDto> for CourseWorkMaterial {
    fn from(dto: CourseWorkMaterialDto) -> Self {
        CourseWorkMaterial {
            id: dto.id,
            course_id: dto.course_id,
            title: dto.title,
            description: dto.description,
            materials: into_materials(dto.materials),
        }
    }
}

/// Classroom's material object: one of the optional members is set.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDto {
    #[serde(default)]
    pub drive_file: Option<SharedDriveFileDto>,
    #[serde(default)]
    pub youtube_video: Option<YoutubeVideoDto>,
    #[serde(default)]
    pub link: Option<LinkDto>,
    #[serde(default)]
    pub form: Option<FormDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDriveFileDto {
    pub drive_file: DriveFileDto,
    #[serde(default)]
    pub share_mode: ShareMode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileDto {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeVideoDto {
    #[serde(default)]
    pub title: String,
    pub alternate_link: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDto {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDto {
    pub form_url: String,
    #[serde(default)]
    pub title: String,
}

impl MaterialDto {
    pub fn into_material(self) -> Option<Material> {
        if let Some(shared) = self.drive_file {
            return Some(Material::DriveFile(DriveFile {
                id: shared.drive_file.id,
                title: shared.drive_file.title,
                share_mode: shared.share_mode,
                mime_type: None,
            }));
        }
        if let Some(link) = self.link {
            let title = link.title.unwrap_or_else(|| link.url.clone());
            return Some(Material::Link(Link {
                url: link.url,
                title,
            }));
        }
        if let Some(video) = self.youtube_video {
            return Some(Material::YoutubeVideo(YoutubeVideo {
                alternate_link: video.alternate_link,
                title: video.title,
            }));
        }
        // Forms have no Teams counterpart, they travel as plain links.
        self.form.map(|form| {
            Material::Link(Link {
                url: form.form_url,
                title: form.title,
            })
        })
    }
}

fn into_materials(materials: Vec<MaterialDto>) -> Vec<Material> {
    materials
        .into_iter()
        .filter_map(|m| {
            let material = m.into_material();
            if material.is_none() {
                tracing::warn!("Dropping material with no recognised kind");
            }
            material
        })
        .collect()
}
