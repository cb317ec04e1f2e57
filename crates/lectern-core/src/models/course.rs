//! Course drafts as composed by an author before anything is uploaded or persisted.

use std::path::PathBuf;

use bytes::Bytes;

/// A course tree that exists only in the authoring session.
#[derive(Debug, Clone, Default)]
pub struct CourseDraft {
    pub title: String,
    pub description: Option<String>,
    pub disciplines: Vec<DisciplineDraft>,
}

#[derive(Debug, Clone, Default)]
pub struct DisciplineDraft {
    pub title: String,
    pub lessons: Vec<LessonDraft>,
}

/// A lesson draft. `file` is the pending local video; `video_url` / `video_blob_id`
/// describe a video stored by an earlier attempt and are kept as-is when no file is
/// bound.
#[derive(Debug, Clone, Default)]
pub struct LessonDraft {
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub video_blob_id: Option<String>,
    pub file: Option<LocalFile>,
}

impl LessonDraft {
    pub fn has_pending_file(&self) -> bool {
        self.file.is_some()
    }
}

/// A file bound to a lesson, waiting to be transferred.
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub source: FileSource,
}

impl LocalFile {
    pub fn from_path(path: impl Into<PathBuf>, content_type: Option<String>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file_name,
            content_type,
            source: FileSource::Path(path),
        }
    }

    pub fn from_bytes(
        file_name: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            source: FileSource::Memory(data.into()),
        }
    }
}

/// Where a pending file's bytes come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Memory(Bytes),
}
