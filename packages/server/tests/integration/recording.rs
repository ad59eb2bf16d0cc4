use crate::common::TestApp;

mod upload {
    use super::*;

    #[tokio::test]
    async fn creates_a_recording() {
        let app = TestApp::spawn().await;
        let data = b"ID3fake-mp3-payload".to_vec();

        let res = app
            .upload_recording(
                "clip.mp3",
                "audio/mpeg",
                data.clone(),
                Some("52.52"),
                Some("13.405"),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(res.body["id"].as_str().is_some());
        assert_eq!(res.body["lat"].as_f64().unwrap(), 52.52);
        assert_eq!(res.body["lng"].as_f64().unwrap(), 13.405);
        assert_eq!(res.body["mimetype"].as_str().unwrap(), "audio/mpeg");
        assert_eq!(res.body["size"].as_i64().unwrap(), data.len() as i64);
        assert!(res.body["createdAt"].as_str().is_some());

        let url = res.body["url"].as_str().unwrap();
        assert!(url.starts_with("/uploads/"), "unexpected url: {url}");
        assert!(url.ends_with(".mp3"), "unexpected url: {url}");

        assert_eq!(app.blob_count(), 1);
    }

    #[tokio::test]
    async fn stored_audio_is_byte_identical() {
        let app = TestApp::spawn().await;
        let data: Vec<u8> = (0..=255).cycle().take(4096).map(|b| b as u8).collect();

        let body = app.upload_ok("audio/wav", data.clone(), "0.0", "0.0").await;
        let url = body["url"].as_str().unwrap();

        let res = app.get_raw(url).await;
        assert_eq!(res.status().as_u16(), 200);
        assert_eq!(
            res.headers()["content-type"].to_str().unwrap(),
            "audio/wav"
        );
        assert_eq!(res.bytes().await.unwrap().as_ref(), data.as_slice());
    }

    #[tokio::test]
    async fn webm_is_served_with_explicit_audio_content_type() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_recording(
                "clip.webm",
                "audio/webm;codecs=opus",
                b"webm-bytes".to_vec(),
                Some("1.0"),
                Some("2.0"),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["mimetype"].as_str().unwrap(), "audio/webm");

        let audio = app.get_raw(res.body["url"].as_str().unwrap()).await;
        assert_eq!(
            audio.headers()["content-type"].to_str().unwrap(),
            "audio/webm"
        );
    }

    #[tokio::test]
    async fn missing_audio_field_is_rejected() {
        let app = TestApp::spawn().await;

        let form = reqwest::multipart::Form::new()
            .text("lat", "1.0")
            .text("lng", "2.0");
        let res = app
            .client
            .post(format!("http://{}/api/recordings", app.addr))
            .multipart(form)
            .send()
            .await
            .unwrap();
        let res = crate::common::TestResponse::from_response(res).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "No audio file uploaded");
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn missing_coordinates_leave_no_orphan_blob() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_recording("clip.mp3", "audio/mpeg", b"data".to_vec(), None, None)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "Missing coordinates");
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn unparseable_coordinates_leave_no_orphan_blob() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_recording(
                "clip.mp3",
                "audio/mpeg",
                b"data".to_vec(),
                Some("not-a-number"),
                Some("2.0"),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "Missing coordinates");
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn out_of_range_latitude_persists_nothing() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_recording(
                "clip.mp3",
                "audio/mpeg",
                b"data".to_vec(),
                Some("91"),
                Some("0"),
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.error().contains("Latitude"), "got: {}", res.text);
        assert_eq!(app.blob_count(), 0);

        // No row either: a search around the equator sees nothing.
        let search = app.get(&crate::common::routes::search("89.9", "0", None)).await;
        assert_eq!(search.status, 200);
        assert_eq!(search.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected_before_storage() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_recording(
                "clip.ogg",
                "audio/ogg",
                b"OggS".to_vec(),
                Some("1.0"),
                Some("2.0"),
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.error().contains("audio/ogg"), "got: {}", res.text);
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn storage_failure_reports_failed_to_save() {
        let app = TestApp::spawn().await;

        // Replace the store's staging directory with a regular file so
        // the blob write itself fails.
        let staging = app.blobs_dir.join(".tmp");
        std::fs::remove_dir_all(&staging).unwrap();
        std::fs::write(&staging, b"").unwrap();

        let res = app
            .upload_recording(
                "clip.mp3",
                "audio/mpeg",
                b"data".to_vec(),
                Some("1.0"),
                Some("2.0"),
            )
            .await;

        assert_eq!(res.status, 500, "{}", res.text);
        assert_eq!(res.error(), "Failed to save recording");
    }

    #[tokio::test]
    async fn oversized_payload_is_rejected() {
        let app = TestApp::spawn().await;
        let data = vec![0u8; crate::common::MAX_BLOB_SIZE as usize + 1];

        let res = app
            .upload_recording("clip.wav", "audio/wav", data, Some("1.0"), Some("2.0"))
            .await;

        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(app.blob_count(), 0);
    }
}
