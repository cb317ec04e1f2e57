//! Test fixtures: presign and commit request bodies.

use serde_json::{json, Value};

pub const INTRO_VIDEO: &[u8] = b"\x00\x00\x00\x18ftypmp42intro";
pub const SETUP_VIDEO: &[u8] = b"\x00\x00\x00\x14ftypqt  setup";

/// Two disciplines; videos announced at (0,0) and (0,2) only.
pub fn presign_request() -> Value {
    json!({
        "title": "Rust for Backend Engineers",
        "disciplines": [
            {
                "title": "Foundations",
                "lessons": [
                    {
                        "title": "Intro",
                        "videoFilePresent": true,
                        "videoFileName": "intro.mp4",
                        "videoContentType": "video/mp4"
                    },
                    { "title": "Reading", "videoFilePresent": false },
                    {
                        "title": "Setup",
                        "videoFilePresent": true,
                        "videoFileName": "setup-part-2.mov",
                        "videoContentType": "video/quicktime"
                    }
                ]
            },
            {
                "title": "Async",
                "lessons": [{ "title": "Futures", "videoFilePresent": false }]
            }
        ]
    })
}

pub fn commit_payload(intro: &Value, setup: &Value) -> Value {
    json!({
        "title": "Rust for Backend Engineers",
        "description": "From zero to production",
        "disciplines": [
            {
                "title": "Foundations",
                "lessons": [
                    {
                        "title": "Intro",
                        "videoKey": intro["key"],
                        "videoUrl": intro["publicUrl"]
                    },
                    { "title": "Reading" },
                    {
                        "title": "Setup",
                        "videoKey": setup["key"],
                        "videoUrl": setup["publicUrl"]
                    }
                ]
            },
            {
                "title": "Async",
                "lessons": [{
                    "title": "Futures",
                    "videoUrl": "https://cdn.example.com/futures.mp4",
                    "videoBlobId": "1700000000000-1-0-futures.mp4"
                }]
            }
        ]
    })
}
