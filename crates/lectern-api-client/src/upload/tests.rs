use super::*;
use crate::Auth;
use lectern_core::models::{DisciplineDraft, LessonDraft};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

const INTRO: &[u8] = b"intro-video-bytes";
const SETUP: &[u8] = b"setup-video-bytes";
const INTRO_KEY: &str = "5f0c6a0e8e6b4c3a9d1e2f3a4b5c6d7e-0-0-intro.mp4";
const SETUP_KEY: &str = "9a8b7c6d5e4f4a3b8c2d1e0f9a8b7c6d-1-0-setup.mov";
const COURSE_ID: &str = "0b6f1e2a-3c4d-4e5f-8a9b-0c1d2e3f4a5b";

fn lesson(title: &str) -> LessonDraft {
    LessonDraft {
        title: title.to_string(),
        ..Default::default()
    }
}

fn lesson_with(title: &str, file: LocalFile) -> LessonDraft {
    LessonDraft {
        file: Some(file),
        ..lesson(title)
    }
}

/// Videos at (0,0) and (1,0); (0,1) has none.
fn draft() -> CourseDraft {
    CourseDraft {
        title: "Rust for Backend Engineers".to_string(),
        description: Some("From zero to production".to_string()),
        disciplines: vec![
            DisciplineDraft {
                title: "Foundations".to_string(),
                lessons: vec![
                    lesson_with(
                        "Intro",
                        LocalFile::from_bytes("intro.mp4", Some("video/mp4".to_string()), INTRO),
                    ),
                    lesson("Reading"),
                ],
            },
            DisciplineDraft {
                title: "Tooling".to_string(),
                lessons: vec![lesson_with(
                    "Setup",
                    LocalFile::from_bytes("setup.mov", Some("video/quicktime".to_string()), SETUP),
                )],
            },
        ],
    }
}

fn credential_json(server: &ServerGuard, key: &str) -> Value {
    credential_json_at(&server.url(), key)
}

/// Credential whose PUT and DELETE URLs live under `storage_base`.
fn credential_json_at(storage_base: &str, key: &str) -> Value {
    json!({
        "key": key,
        "presignedUrl": format!("{}/videos/{}", storage_base, key),
        "publicUrl": format!("https://cdn.example.com/videos/{}", key),
        "expiresAt": "2026-10-16T12:15:00Z",
        "deleteUrl": format!("{}/delete/videos/{}", storage_base, key),
    })
}

fn presign_body(server: &ServerGuard, slots: &[(&str, &str)]) -> String {
    let presigned: serde_json::Map<String, Value> = slots
        .iter()
        .map(|(slot, key)| (slot.to_string(), credential_json(server, key)))
        .collect();
    json!({ "ok": true, "presigned": presigned }).to_string()
}

fn course_body() -> String {
    json!({
        "ok": true,
        "course": {
            "id": COURSE_ID,
            "title": "Rust for Backend Engineers",
            "description": "From zero to production",
            "disciplines": [],
            "createdAt": "2026-10-16T12:00:00Z",
            "updatedAt": "2026-10-16T12:00:00Z"
        }
    })
    .to_string()
}

async fn mock_presign(server: &mut ServerGuard, slots: &[(&str, &str)]) -> Mock {
    let body = presign_body(server, slots);
    server
        .mock("POST", "/api/courses/presign")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

async fn mock_put(
    server: &mut ServerGuard,
    key: &str,
    content_type: &str,
    body: &[u8],
    status: usize,
) -> Mock {
    server
        .mock("PUT", format!("/videos/{}", key).as_str())
        .match_header("content-type", content_type)
        .match_body(body.to_vec())
        .with_status(status)
        .create_async()
        .await
}

async fn mock_commit(server: &mut ServerGuard, hits: usize) -> Mock {
    server
        .mock("POST", "/api/courses")
        .match_body(Matcher::PartialJson(
            json!({ "title": "Rust for Backend Engineers" }),
        ))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(course_body())
        .expect(hits)
        .create_async()
        .await
}

fn orchestrator(server: &ServerGuard) -> UploadOrchestrator {
    UploadOrchestrator::new(ApiClient::new(server.url(), Auth::Anonymous).unwrap())
}

#[tokio::test]
async fn all_transfers_succeed_and_course_is_committed() {
    let mut server = Server::new_async().await;
    let presign = mock_presign(
        &mut server,
        &[("file-0-0", INTRO_KEY), ("file-1-0", SETUP_KEY)],
    )
    .await;
    let put_intro = mock_put(&mut server, INTRO_KEY, "video/mp4", INTRO, 200).await;
    let put_setup = mock_put(&mut server, SETUP_KEY, "video/quicktime", SETUP, 200).await;
    let commit = mock_commit(&mut server, 1).await;

    let published = orchestrator(&server).publish(&draft()).await.unwrap();

    presign.assert_async().await;
    put_intro.assert_async().await;
    put_setup.assert_async().await;
    commit.assert_async().await;

    assert_eq!(published.course.id.to_string(), COURSE_ID);
    assert_eq!(
        published.history,
        vec![
            PipelineState::Draft,
            PipelineState::Presigning,
            PipelineState::Uploading,
            PipelineState::Committing,
            PipelineState::Committed,
        ]
    );
    assert!(published
        .outcomes
        .values()
        .all(|o| *o == SlotOutcome::Succeeded));

    let lessons = &published.payload.disciplines[0].lessons;
    assert_eq!(lessons[0].video_key.as_ref().map(|k| k.as_str()), Some(INTRO_KEY));
    assert_eq!(
        lessons[0].video_url.as_deref(),
        Some(format!("https://cdn.example.com/videos/{}", INTRO_KEY).as_str())
    );
    assert!(lessons[1].video_key.is_none());
    let setup = &published.payload.disciplines[1].lessons[0];
    assert_eq!(setup.video_key.as_ref().map(|k| k.as_str()), Some(SETUP_KEY));
}

#[tokio::test]
async fn forbidden_transfer_fails_before_commit_and_keeps_orphan() {
    let mut server = Server::new_async().await;
    mock_presign(
        &mut server,
        &[("file-0-0", INTRO_KEY), ("file-1-0", SETUP_KEY)],
    )
    .await;
    let put_intro = mock_put(&mut server, INTRO_KEY, "video/mp4", INTRO, 200).await;
    let put_setup = mock_put(&mut server, SETUP_KEY, "video/quicktime", SETUP, 403).await;
    let delete = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let commit = mock_commit(&mut server, 0).await;

    let failure = orchestrator(&server)
        .with_orphan_policy(OrphanPolicy::Retain)
        .publish(&draft())
        .await
        .unwrap_err();

    put_intro.assert_async().await;
    put_setup.assert_async().await;
    delete.assert_async().await;
    commit.assert_async().await;

    assert_eq!(failure.failed_in, PipelineState::Uploading);
    assert_eq!(failure.history.last(), Some(&PipelineState::Failed));
    match failure.error {
        PipelineError::Transfer {
            failures,
            removed,
            orphaned,
        } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].slot, SlotId::new(1, 0));
            assert_eq!(failures[0].error.status, Some(403));
            assert!(removed.is_empty());
            assert_eq!(orphaned, vec![ObjectKey::from(INTRO_KEY.to_string())]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn failed_transfer_deletes_uploaded_objects_by_default() {
    let mut server = Server::new_async().await;
    mock_presign(
        &mut server,
        &[("file-0-0", INTRO_KEY), ("file-1-0", SETUP_KEY)],
    )
    .await;
    mock_put(&mut server, INTRO_KEY, "video/mp4", INTRO, 200).await;
    mock_put(&mut server, SETUP_KEY, "video/quicktime", SETUP, 500).await;
    let delete_intro = server
        .mock("DELETE", format!("/delete/videos/{}", INTRO_KEY).as_str())
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let commit = mock_commit(&mut server, 0).await;

    let orchestrator = orchestrator(&server);
    assert_eq!(orchestrator.orphan_policy(), OrphanPolicy::DeleteUploaded);
    let failure = orchestrator.publish(&draft()).await.unwrap_err();

    delete_intro.assert_async().await;
    commit.assert_async().await;
    match failure.error {
        PipelineError::Transfer {
            removed, orphaned, ..
        } => {
            assert_eq!(removed, vec![ObjectKey::from(INTRO_KEY.to_string())]);
            assert!(orphaned.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn failed_cleanup_is_reported_as_orphan() {
    let mut server = Server::new_async().await;
    mock_presign(
        &mut server,
        &[("file-0-0", INTRO_KEY), ("file-1-0", SETUP_KEY)],
    )
    .await;
    mock_put(&mut server, INTRO_KEY, "video/mp4", INTRO, 200).await;
    mock_put(&mut server, SETUP_KEY, "video/quicktime", SETUP, 403).await;
    server
        .mock("DELETE", format!("/delete/videos/{}", INTRO_KEY).as_str())
        .with_status(403)
        .create_async()
        .await;

    let failure = orchestrator(&server).publish(&draft()).await.unwrap_err();

    match failure.error {
        PipelineError::Transfer {
            removed, orphaned, ..
        } => {
            assert!(removed.is_empty());
            assert_eq!(orphaned, vec![ObjectKey::from(INTRO_KEY.to_string())]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn configuration_error_stops_before_any_transfer() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/courses/presign")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "ok": false,
                "error": "Missing required setting: CLOUDFLARE_R2_BUCKET_NAME",
                "code": "CONFIGURATION_ERROR",
                "recoverable": false
            })
            .to_string(),
        )
        .create_async()
        .await;
    let puts = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let failure = orchestrator(&server).publish(&draft()).await.unwrap_err();

    puts.assert_async().await;
    assert_eq!(failure.failed_in, PipelineState::Presigning);
    assert!(matches!(
        failure.error,
        PipelineError::Configuration { ref message } if message.contains("CLOUDFLARE_R2_BUCKET_NAME")
    ));
}

#[tokio::test]
async fn signing_error_keeps_status() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/courses/presign")
        .with_status(500)
        .with_body(r#"{"ok":false,"error":"Presign failed: AccessDenied","code":"PRESIGN_ERROR"}"#)
        .create_async()
        .await;

    let failure = orchestrator(&server).publish(&draft()).await.unwrap_err();

    match failure.error {
        PipelineError::Presign { status, message } => {
            assert_eq!(status, Some(500));
            assert_eq!(message, "Presign failed: AccessDenied");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn presign_response_missing_a_slot_fails_closed() {
    let mut server = Server::new_async().await;
    mock_presign(&mut server, &[("file-0-0", INTRO_KEY), ("file-0-1", SETUP_KEY)]).await;
    let puts = server
        .mock("PUT", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let failure = orchestrator(&server).publish(&draft()).await.unwrap_err();

    puts.assert_async().await;
    assert_eq!(failure.failed_in, PipelineState::Presigning);
    match failure.error {
        PipelineError::SlotMismatch {
            missing,
            unexpected,
        } => {
            assert_eq!(missing, vec![SlotId::new(1, 0)]);
            assert_eq!(unexpected, vec![SlotId::new(0, 1)]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn commit_error_body_is_surfaced_verbatim() {
    let mut server = Server::new_async().await;
    mock_presign(
        &mut server,
        &[("file-0-0", INTRO_KEY), ("file-1-0", SETUP_KEY)],
    )
    .await;
    mock_put(&mut server, INTRO_KEY, "video/mp4", INTRO, 200).await;
    mock_put(&mut server, SETUP_KEY, "video/quicktime", SETUP, 200).await;
    let body = r#"{"ok":false,"error":"Uploaded video not found in storage","code":"BAD_REQUEST"}"#;
    let commit = server
        .mock("POST", "/api/courses")
        .with_status(400)
        .with_body(body)
        .expect(1)
        .create_async()
        .await;

    let failure = orchestrator(&server).publish(&draft()).await.unwrap_err();

    commit.assert_async().await;
    assert_eq!(failure.failed_in, PipelineState::Committing);
    match failure.error {
        PipelineError::Commit { status, message } => {
            assert_eq!(status, Some(400));
            assert_eq!(message, body);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn draft_without_files_commits_without_presign() {
    let mut server = Server::new_async().await;
    let presign = server
        .mock("POST", "/api/courses/presign")
        .expect(0)
        .create_async()
        .await;
    let commit = mock_commit(&mut server, 1).await;

    let mut kept = lesson("Kept");
    kept.video_url = Some("https://cdn.example.com/videos/old.mp4".to_string());
    kept.video_blob_id = Some("1700000000000-0-0-old.mp4".to_string());
    let draft = CourseDraft {
        title: "Rust for Backend Engineers".to_string(),
        description: None,
        disciplines: vec![DisciplineDraft {
            title: "Foundations".to_string(),
            lessons: vec![kept],
        }],
    };

    let published = orchestrator(&server).publish(&draft).await.unwrap();

    presign.assert_async().await;
    commit.assert_async().await;
    let lesson = &published.payload.disciplines[0].lessons[0];
    assert!(lesson.video_key.is_none());
    assert_eq!(
        lesson.video_blob_id.as_deref(),
        Some("1700000000000-0-0-old.mp4")
    );
}

#[tokio::test]
async fn streams_video_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("intro.mp4");
    std::fs::write(&path, INTRO).unwrap();

    let mut server = Server::new_async().await;
    mock_presign(&mut server, &[("file-0-0", INTRO_KEY)]).await;
    let put = server
        .mock("PUT", format!("/videos/{}", INTRO_KEY).as_str())
        .match_header("content-type", "application/octet-stream")
        .match_header("content-length", INTRO.len().to_string().as_str())
        .match_body(INTRO.to_vec())
        .with_status(200)
        .create_async()
        .await;
    mock_commit(&mut server, 1).await;

    let draft = CourseDraft {
        title: "Rust for Backend Engineers".to_string(),
        description: None,
        disciplines: vec![DisciplineDraft {
            title: "Foundations".to_string(),
            lessons: vec![lesson_with("Intro", LocalFile::from_path(&path, None))],
        }],
    };

    orchestrator(&server).publish(&draft).await.unwrap();
    put.assert_async().await;
}

#[tokio::test]
async fn unreadable_file_fails_its_slot() {
    let mut server = Server::new_async().await;
    mock_presign(&mut server, &[("file-0-0", INTRO_KEY)]).await;
    let commit = mock_commit(&mut server, 0).await;

    let draft = CourseDraft {
        title: "Rust for Backend Engineers".to_string(),
        description: None,
        disciplines: vec![DisciplineDraft {
            title: "Foundations".to_string(),
            lessons: vec![lesson_with(
                "Intro",
                LocalFile::from_path("/nonexistent/lectern/intro.mp4", None),
            )],
        }],
    };

    let failure = orchestrator(&server).publish(&draft).await.unwrap_err();

    commit.assert_async().await;
    match failure.error {
        PipelineError::Transfer { failures, .. } => {
            assert_eq!(failures[0].error.status, None);
            assert!(failures[0].error.message.contains("Failed to open"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Storage stub whose PUTs only answer once `expected` of them are in flight together.
async fn spawn_rendezvous_storage(expected: usize) -> String {
    use axum::{extract::State, http::StatusCode, routing::put, Router};
    use std::sync::Arc;
    use tokio::sync::Barrier;

    async fn accept(State(barrier): State<Arc<Barrier>>) -> StatusCode {
        barrier.wait().await;
        StatusCode::OK
    }

    let app = Router::new()
        .route("/videos/{key}", put(accept))
        .with_state(Arc::new(Barrier::new(expected)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn transfers_run_concurrently() {
    let storage = spawn_rendezvous_storage(2).await;

    let mut server = Server::new_async().await;
    let presigned = json!({
        "ok": true,
        "presigned": {
            "file-0-0": credential_json_at(&storage, INTRO_KEY),
            "file-1-0": credential_json_at(&storage, SETUP_KEY),
        }
    });
    server
        .mock("POST", "/api/courses/presign")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(presigned.to_string())
        .create_async()
        .await;
    let commit = mock_commit(&mut server, 1).await;

    // Sequential uploads would leave the first PUT waiting on the barrier forever.
    let published = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        orchestrator(&server).publish(&draft()),
    )
    .await
    .expect("both uploads must be in flight at the same time")
    .unwrap();

    commit.assert_async().await;
    assert!(published
        .outcomes
        .values()
        .all(|outcome| matches!(outcome, SlotOutcome::Succeeded)));
}

#[tokio::test]
async fn created_course_id_is_enough_to_commit() {
    let mut server = Server::new_async().await;
    mock_presign(&mut server, &[("file-0-0", INTRO_KEY), ("file-1-0", SETUP_KEY)]).await;
    mock_put(&mut server, INTRO_KEY, "video/mp4", INTRO, 200).await;
    mock_put(&mut server, SETUP_KEY, "video/quicktime", SETUP, 200).await;
    let mut body: Value = serde_json::from_str(&course_body()).unwrap();
    body["ok"] = json!(false);
    server
        .mock("POST", "/api/courses")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let published = orchestrator(&server).publish(&draft()).await.unwrap();

    assert_eq!(published.course.id.to_string(), COURSE_ID);
    assert_eq!(published.history.last(), Some(&PipelineState::Committed));
}
