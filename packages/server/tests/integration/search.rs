use crate::common::{TestApp, routes};

mod search {
    use super::*;

    #[tokio::test]
    async fn requires_coordinates() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::RECORDINGS).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "Missing coordinates");

        let res = app.get("/api/recordings?lat=1.0").await;
        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "Missing coordinates");
    }

    #[tokio::test]
    async fn ranks_nearby_recordings_nearest_first() {
        let app = TestApp::spawn().await;
        app.upload_ok("audio/mpeg", b"at-center".to_vec(), "0", "0").await;
        app.upload_ok("audio/mpeg", b"nearby".to_vec(), "0", "0.001").await;
        app.upload_ok("audio/mpeg", b"far-away".to_vec(), "10", "10").await;

        let res = app.get(&routes::search("0", "0", Some("0.5"))).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);

        assert!(items[0]["distance"].as_f64().unwrap().abs() < 1e-9);
        assert_eq!(items[0]["lng"].as_f64().unwrap(), 0.0);

        let second = items[1]["distance"].as_f64().unwrap();
        assert!((second - 0.111).abs() < 0.01, "got {second}");
        assert_eq!(items[1]["lng"].as_f64().unwrap(), 0.001);
    }

    #[tokio::test]
    async fn omitted_radius_defaults_to_half_a_kilometer() {
        let app = TestApp::spawn().await;
        app.upload_ok("audio/webm", b"near".to_vec(), "0", "0.001").await;
        // ~11 km out, beyond the 0.5 km default.
        app.upload_ok("audio/webm", b"too-far".to_vec(), "0", "0.1").await;

        let res = app.get(&routes::search("0", "0", None)).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["lng"].as_f64().unwrap(), 0.001);
    }

    #[tokio::test]
    async fn wider_radius_reaches_further() {
        let app = TestApp::spawn().await;
        app.upload_ok("audio/webm", b"eleven-km".to_vec(), "0", "0.1").await;

        let narrow = app.get(&routes::search("0", "0", Some("0.5"))).await;
        assert_eq!(narrow.body.as_array().unwrap().len(), 0);

        let wide = app.get(&routes::search("0", "0", Some("20"))).await;
        assert_eq!(wide.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_radius_is_rejected() {
        let app = TestApp::spawn().await;

        for radius in ["-1", "0", "abc", "inf"] {
            let res = app.get(&routes::search("0", "0", Some(radius))).await;
            assert_eq!(res.status, 400, "radius={radius}: {}", res.text);
        }
    }

    #[tokio::test]
    async fn out_of_range_center_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::search("91", "0", None)).await;
        assert_eq!(res.status, 400);
        assert!(res.error().contains("Latitude"), "got: {}", res.text);
    }

    #[tokio::test]
    async fn no_matches_yields_an_empty_array() {
        let app = TestApp::spawn().await;
        app.upload_ok("audio/mpeg", b"somewhere".to_vec(), "45", "45").await;

        let res = app.get(&routes::search("-45", "-45", Some("1"))).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 0);
    }
}
