//! On-disk course drafts.
//!
//! A draft file is JSON. Each lesson may name a local `video` path, resolved against
//! the draft file's directory, or carry the `videoUrl` / `videoBlobId` of a video
//! uploaded earlier.

use anyhow::Context;
use lectern_core::models::{CourseDraft, DisciplineDraft, LessonDraft, LocalFile};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DraftFile {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub disciplines: Vec<DisciplineEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DisciplineEntry {
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<LessonEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LessonEntry {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Local video to upload
    #[serde(default)]
    pub video: Option<String>,
    /// Overrides the type guessed from the file extension
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub video_blob_id: Option<String>,
}

/// MIME type for common video extensions.
pub fn guess_content_type(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => return None,
    };
    Some(mime.to_string())
}

impl DraftFile {
    pub fn into_draft(self, base_dir: &Path) -> CourseDraft {
        CourseDraft {
            title: self.title,
            description: self.description,
            disciplines: self
                .disciplines
                .into_iter()
                .map(|discipline| DisciplineDraft {
                    title: discipline.title,
                    lessons: discipline
                        .lessons
                        .into_iter()
                        .map(|lesson| {
                            let file = lesson.video.map(|video| {
                                let path = base_dir.join(video);
                                let content_type =
                                    lesson.content_type.or_else(|| guess_content_type(&path));
                                LocalFile::from_path(path, content_type)
                            });
                            LessonDraft {
                                title: lesson.title,
                                description: lesson.description,
                                video_url: lesson.video_url,
                                video_blob_id: lesson.video_blob_id,
                                file,
                            }
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Read a draft file. Video paths must exist.
pub fn load_draft(path: &Path) -> anyhow::Result<CourseDraft> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft {}", path.display()))?;
    let file: DraftFile = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid draft {}", path.display()))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let draft = file.into_draft(base_dir);

    for lesson in draft.disciplines.iter().flat_map(|d| d.lessons.iter()) {
        if let Some(LocalFile {
            source: lectern_core::models::FileSource::Path(video),
            ..
        }) = &lesson.file
        {
            anyhow::ensure!(
                video.is_file(),
                "Video for lesson '{}' not found: {}",
                lesson.title,
                video.display()
            );
        }
    }

    Ok(draft)
}
