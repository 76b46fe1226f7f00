use rest_gateway::{RestGateway, RestGatewayConfig};
use serde_json::json;
use std::time::Duration;
use trackdeck_core::gateway_contract::{run_gateway_contract, GatewayContractExpectations};
use trackdeck_core::models::{Query, SortKey, StreamUrl, TrackDraft, TrackId, TrackPatch};
use trackdeck_core::{AudioUpload, GatewayError, TrackGateway, AUDIO_CONTENT_TYPE};
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> RestGateway {
    RestGateway::new(RestGatewayConfig::new(server.uri())).expect("gateway")
}

fn track_json(id: serde_json::Value, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "artist": "Contract Artist",
        "album": "Contract Album",
        "genres": ["Rock"],
        "coverImage": null,
        "audioFile": null,
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    })
}

#[tokio::test]
async fn list_sends_query_and_maps_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .and(query_param("page", "2"))
        .and(query_param("limit", "5"))
        .and(query_param("sort", "artist"))
        .and(query_param("genre", "Rock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [track_json(json!(17), "Heroes"), track_json(json!("abc"), "Angel")],
            "meta": {"total": 7, "page": 2, "limit": 5, "totalPages": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut query = Query::first_page(5).with_page(2).with_sort(SortKey::Artist);
    query.genre = "Rock".into();
    let page = gateway_for(&server).list(&query).await.expect("list");

    assert_eq!(page.total_pages, 2);
    let ids: Vec<&str> = page.tracks.iter().map(|t| t.id.as_ref()).collect();
    assert_eq!(ids, vec!["17", "abc"]);
    assert_eq!(page.tracks[0].genres, vec!["Rock".to_string()]);
}

#[tokio::test]
async fn server_failure_on_list_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "maintenance"})))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .list(&Query::first_page(10))
        .await
        .expect_err("503");
    assert_eq!(
        err,
        GatewayError::Server {
            status: 503,
            message: "maintenance".into()
        }
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn malformed_body_is_a_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .list(&Query::first_page(10))
        .await
        .expect_err("bad json");
    assert!(matches!(err, GatewayError::Server { .. }));
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let mut config = RestGatewayConfig::new("http://127.0.0.1:1/");
    config.connect_timeout = Duration::from_millis(500);
    let gateway = RestGateway::new(config).expect("gateway");

    let err = gateway
        .list(&Query::first_page(10))
        .await
        .expect_err("connection refused");
    assert!(matches!(err, GatewayError::Network { .. }));
}

#[tokio::test]
async fn create_rejection_maps_to_validation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tracks"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"error": "Track already exists"})),
        )
        .mount(&server)
        .await;

    let draft = TrackDraft {
        title: "Dup".into(),
        artist: "A".into(),
        album: "B".into(),
        genres: vec!["Rock".into()],
        cover_image: None,
    };
    let err = gateway_for(&server).create(&draft).await.expect_err("409");
    assert_eq!(
        err,
        GatewayError::Validation {
            message: "Track already exists".into()
        }
    );
}

#[tokio::test]
async fn update_sends_only_changed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/tracks/9"))
        .and(body_json(json!({"album": "Live", "coverImage": ""})))
        .respond_with(ResponseTemplate::new(200).set_body_json(track_json(json!(9), "Song")))
        .expect(1)
        .mount(&server)
        .await;

    let patch = TrackPatch {
        album: Some("Live".into()),
        cover_image: Some(String::new()),
        ..TrackPatch::default()
    };
    let track = gateway_for(&server)
        .update(&TrackId::new("9"), &patch)
        .await
        .expect("update");
    assert_eq!(track.id, TrackId::new("9"));
}

#[tokio::test]
async fn oversized_upload_reports_payload_too_large() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tracks/3/upload"))
        .respond_with(ResponseTemplate::new(413))
        .mount(&server)
        .await;

    let file = AudioUpload::new("big.mp3", AUDIO_CONTENT_TYPE, vec![0; 32]);
    let err = gateway_for(&server)
        .upload_audio(&TrackId::new("3"), &file)
        .await
        .expect_err("413");
    assert!(matches!(err, GatewayError::PayloadTooLarge { size: 32, .. }));
}

#[tokio::test]
async fn remove_audio_targets_file_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/tracks/4/file"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    gateway_for(&server)
        .remove_audio(&TrackId::new("4"))
        .await
        .expect("remove audio");
}

#[tokio::test]
async fn audio_is_fetched_from_stream_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/uploads/song.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3\x04".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/uploads/gone.mp3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let url = StreamUrl::new(format!("{}/uploads/song.mp3", server.uri()));
    assert_eq!(gateway.fetch_audio(&url).await.expect("fetch"), b"ID3\x04");

    let gone = StreamUrl::new(format!("{}/uploads/gone.mp3", server.uri()));
    assert!(matches!(
        gateway.fetch_audio(&gone).await,
        Err(GatewayError::NotFound { .. })
    ));
    assert!(matches!(
        gateway.fetch_audio(&StreamUrl::new("not a url")).await,
        Err(GatewayError::Validation { .. })
    ));
}

#[tokio::test]
async fn genres_are_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/genres"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Jazz", "Rock"])))
        .mount(&server)
        .await;

    let genres = gateway_for(&server).genres().await.expect("genres");
    assert_eq!(genres, vec!["Jazz".to_string(), "Rock".to_string()]);
}

#[tokio::test]
async fn rest_gateway_passes_contract() {
    let server = MockServer::start().await;
    let expectations = GatewayContractExpectations::default();
    let title = expectations.draft.title.clone();

    Mock::given(method("GET"))
        .and(path("/api/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "meta": {"totalPages": 0}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tracks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(track_json(json!(7), &title)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tracks/7/upload"))
        .and(body_string_contains("audio/wav"))
        .respond_with(ResponseTemplate::new(415))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/tracks/7/upload"))
        .and(body_string_contains(AUDIO_CONTENT_TYPE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/tracks/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(track_json(json!(7), &format!("{title} (edited)"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tracks/7"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(path("/api/tracks/does-not-exist"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Track not found"})))
        .mount(&server)
        .await;

    let result = run_gateway_contract(&gateway_for(&server), &expectations).await;
    assert!(result.is_ok(), "expected contract to pass: {result:?}");
}
