use crate::error::AppError;
use crate::models::{EducationResource, FileKind};

pub const GRAPH_FILE_BASE: &str = "https://graph.microsoft.com/v1.0";

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PPTX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// What happens to a source file whose MIME type matches a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Export through Drive into `target_mime`, renamed with `extension`.
    Convert {
        extension: &'static str,
        target_mime: &'static str,
        kind: FileKind,
    },
    /// Copy the bytes as they are.
    Copy { kind: FileKind },
    /// No Teams equivalent.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatRule {
    pub needle: &'static str,
    pub disposition: Disposition,
}

const DEFAULT_RULES: &[FormatRule] = &[
    FormatRule {
        needle: "drawing",
        disposition: Disposition::Skip,
    },
    FormatRule {
        needle: "vnd.google-apps.document",
        disposition: Disposition::Convert {
            extension: ".docx",
            target_mime: DOCX_MIME,
            kind: FileKind::Word,
        },
    },
    FormatRule {
        needle: "vnd.google-apps.presentation",
        disposition: Disposition::Convert {
            extension: ".pptx",
            target_mime: PPTX_MIME,
            kind: FileKind::PowerPoint,
        },
    },
    FormatRule {
        needle: "vnd.google-apps.spreadsheet",
        disposition: Disposition::Convert {
            extension: ".xlsx",
            target_mime: XLSX_MIME,
            kind: FileKind::Excel,
        },
    },
    FormatRule {
        needle: "image",
        disposition: Disposition::Copy {
            kind: FileKind::Media,
        },
    },
    FormatRule {
        needle: "pdf",
        disposition: Disposition::Copy {
            kind: FileKind::File,
        },
    },
];

/// Resolved transfer plan for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFormat {
    /// Empty when the file is copied unchanged.
    pub extension: &'static str,
    pub target_mime: String,
    pub kind: FileKind,
}

impl FileFormat {
    pub fn is_export(&self) -> bool {
        !self.extension.is_empty()
    }
}

/// Format-compatibility policy between Drive and Teams, as an ordered rule
/// table. Rules match by substring on the source MIME type; first match wins
/// and anything unmatched is copied as a generic file.
#[derive(Debug, Clone)]
pub struct ResourceMapper {
    rules: Vec<FormatRule>,
}

impl Default for ResourceMapper {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
        }
    }
}

impl ResourceMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule that takes precedence over every existing one.
    pub fn with_rule(mut self, rule: FormatRule) -> Self {
        self.rules.insert(0, rule);
        self
    }

    pub fn rules(&self) -> &[FormatRule] {
        &self.rules
    }

    pub fn file_details(&self, mime_type: &str) -> Result<FileFormat, AppError> {
        let disposition = self
            .rules
            .iter()
            .find(|rule| mime_type.contains(rule.needle))
            .map(|rule| rule.disposition)
            .unwrap_or(Disposition::Copy {
                kind: FileKind::File,
            });

        match disposition {
            Disposition::Convert {
                extension,
                target_mime,
                kind,
            } => Ok(FileFormat {
                extension,
                target_mime: target_mime.to_string(),
                kind,
            }),
            Disposition::Copy { kind } => Ok(FileFormat {
                extension: "",
                target_mime: mime_type.to_string(),
                kind,
            }),
            Disposition::Skip => Err(AppError::UnsupportedMaterial {
                mime_type: mime_type.to_string(),
            }),
        }
    }

    pub fn map_resource(
        &self,
        mime_type: &str,
        file_url: &str,
        display_name: &str,
    ) -> Result<EducationResource, AppError> {
        let format = self.file_details(mime_type)?;
        Ok(EducationResource::file(format.kind, display_name, file_url))
    }
}

pub fn link_resource(url: &str, title: &str) -> EducationResource {
    EducationResource::Link {
        display_name: title.to_string(),
        link: url.to_string(),
    }
}

pub fn build_file_url(drive_id: &str, item_id: &str) -> String {
    format!("{}/drives/{}/items/{}", GRAPH_FILE_BASE, drive_id, item_id)
}
