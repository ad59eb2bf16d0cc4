use crate::common::TestApp;

mod serve_audio {
    use super::*;

    #[tokio::test]
    async fn unknown_blob_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get("/uploads/0193-no-such-blob.mp3").await;
        assert_eq!(res.status, 404);
        assert_eq!(res.error(), "Audio file not found");
    }

    #[tokio::test]
    async fn traversal_refs_are_not_found() {
        let app = TestApp::spawn().await;
        // %2F decodes to a path separator inside the single segment.
        let res = app.get("/uploads/..%2Fcatalog.db").await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn sets_content_length() {
        let app = TestApp::spawn().await;
        let data = b"sixteen bytes!!!".to_vec();
        let body = app.upload_ok("audio/mpeg", data.clone(), "0", "0").await;

        let res = app.get_raw(body["url"].as_str().unwrap()).await;
        assert_eq!(res.status().as_u16(), 200);
        assert_eq!(
            res.headers()["content-length"].to_str().unwrap(),
            data.len().to_string()
        );
    }
}
