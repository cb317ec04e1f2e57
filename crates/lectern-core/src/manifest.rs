//! Manifest builder
//!
//! Flattens a course tree into the ordered list of upload slots. The slot order,
//! discipline index then lesson index, is the join key every later stage relies on.
//! Building a manifest does no I/O.

use crate::constants::DEFAULT_CONTENT_TYPE;
use crate::models::{
    CourseDraft, LocalFile, PresignDiscipline, PresignLesson, PresignRequest, SlotId, UploadSlot,
};

/// Ordered upload slots of one course tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    slots: Vec<UploadSlot>,
}

impl Manifest {
    /// Server-side view of the slots a presign request announces.
    pub fn from_presign_request(request: &PresignRequest) -> Self {
        let mut slots = Vec::new();
        for (d, discipline) in request.disciplines.iter().enumerate() {
            for (l, lesson) in discipline.lessons.iter().enumerate() {
                if !lesson.video_file_present {
                    continue;
                }
                let id = SlotId::new(d, l);
                slots.push(UploadSlot {
                    id,
                    original_file_name: file_name_or_default(
                        lesson.video_file_name.as_deref(),
                        id,
                    ),
                    declared_content_type: content_type_or_default(
                        lesson.video_content_type.as_deref(),
                    ),
                });
            }
        }
        Self { slots }
    }

    pub fn slots(&self) -> &[UploadSlot] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &UploadSlot> {
        self.slots.iter()
    }

    pub fn slot_ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.slots.iter().map(|s| s.id)
    }

    pub fn get(&self, id: SlotId) -> Option<&UploadSlot> {
        self.slots
            .binary_search_by(|s| s.id.cmp(&id))
            .ok()
            .map(|i| &self.slots[i])
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a UploadSlot;
    type IntoIter = std::slice::Iter<'a, UploadSlot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}

/// One slot per lesson with a bound file, in `(discipline, lesson)` order.
pub fn build_manifest(draft: &CourseDraft) -> Manifest {
    let mut slots = Vec::new();
    for (d, discipline) in draft.disciplines.iter().enumerate() {
        for (l, lesson) in discipline.lessons.iter().enumerate() {
            if let Some(file) = &lesson.file {
                slots.push(slot_for(SlotId::new(d, l), file));
            }
        }
    }
    Manifest { slots }
}

fn slot_for(id: SlotId, file: &LocalFile) -> UploadSlot {
    UploadSlot {
        id,
        original_file_name: file_name_or_default(Some(&file.file_name), id),
        declared_content_type: content_type_or_default(file.content_type.as_deref()),
    }
}

fn file_name_or_default(name: Option<&str>, id: SlotId) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => id.to_string(),
    }
}

fn content_type_or_default(content_type: Option<&str>) -> String {
    match content_type {
        Some(ct) if !ct.trim().is_empty() => ct.to_string(),
        _ => DEFAULT_CONTENT_TYPE.to_string(),
    }
}

impl PresignRequest {
    /// Wire body announcing which lessons will upload a file.
    pub fn from_draft(draft: &CourseDraft) -> Self {
        let disciplines = draft
            .disciplines
            .iter()
            .enumerate()
            .map(|(d, discipline)| PresignDiscipline {
                title: Some(discipline.title.clone()),
                lessons: discipline
                    .lessons
                    .iter()
                    .enumerate()
                    .map(|(l, lesson)| match &lesson.file {
                        Some(file) => {
                            let slot = slot_for(SlotId::new(d, l), file);
                            PresignLesson {
                                title: Some(lesson.title.clone()),
                                video_file_present: true,
                                video_file_name: Some(slot.original_file_name),
                                video_content_type: Some(slot.declared_content_type),
                            }
                        }
                        None => PresignLesson {
                            title: Some(lesson.title.clone()),
                            ..Default::default()
                        },
                    })
                    .collect(),
            })
            .collect();

        Self {
            title: Some(draft.title.clone()),
            disciplines,
        }
    }
}
