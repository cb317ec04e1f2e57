use lectern_core::models::{
    CommitDiscipline, CommitLesson, CommitPayload, CourseDraft, PresignedBatch, SlotId,
};

/// Assemble the commit body for a draft whose slots in `batch` were all uploaded.
///
/// A lesson with a credential gets that credential's key and public URL. Any other
/// lesson keeps the `videoUrl` / `videoBlobId` it already had.
pub fn build_commit_payload(draft: &CourseDraft, batch: &PresignedBatch) -> CommitPayload {
    CommitPayload {
        title: draft.title.clone(),
        description: draft.description.clone(),
        disciplines: draft
            .disciplines
            .iter()
            .enumerate()
            .map(|(d, discipline)| CommitDiscipline {
                title: discipline.title.clone(),
                lessons: discipline
                    .lessons
                    .iter()
                    .enumerate()
                    .map(|(l, lesson)| match batch.get(&SlotId::new(d, l)) {
                        Some(credential) => CommitLesson {
                            title: lesson.title.clone(),
                            description: lesson.description.clone(),
                            video_key: Some(credential.key.clone()),
                            video_url: Some(credential.public_url.clone()),
                            video_blob_id: None,
                        },
                        None => CommitLesson {
                            title: lesson.title.clone(),
                            description: lesson.description.clone(),
                            video_key: None,
                            video_url: lesson.video_url.clone(),
                            video_blob_id: lesson.video_blob_id.clone(),
                        },
                    })
                    .collect(),
            })
            .collect(),
    }
}
