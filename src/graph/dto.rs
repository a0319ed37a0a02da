use serde::{Deserialize, Serialize};

use crate::models::EducationResource;

/// Collection wrapper returned by Graph list endpoints.
#[derive(Debug, Deserialize)]
pub struct ODataResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ODataError {
    pub error: ODataErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ODataErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewModuleRequest<'a> {
    pub display_name: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResourceRequest<'a> {
    pub distribute_for_student_work: bool,
    pub resource: &'a EducationResource,
}

#[derive(Debug, Serialize)]
pub struct ModuleResourceRequest<'a> {
    pub resource: &'a EducationResource,
}

/// Response of `setUpResourcesFolder` for either an assignment or a module.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesFolderResponse {
    pub id: String,
    #[serde(default)]
    pub resources_folder_url: Option<String>,
}
