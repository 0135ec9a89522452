use crate::common::fixtures::{playlist_item, playlist_page, spotify_token};
use crate::common::spotify_credentials;
use crate::{Mock, MockServer, ResponseTemplate, assert_eq, assert_matches};
use nagham::commands::music::audio_sources::spotify::{SpotifyClient, SpotifyError};
use nagham::commands::music::utils::music_manager::{MusicError, MusicManager, TrackOrigin};
use serde_json::json;
use wiremock::matchers::{any, method, path, query_param};

fn client_for(server: &MockServer) -> SpotifyClient {
    SpotifyClient::with_endpoints(
        spotify_credentials(),
        format!("{}/v1", server.uri()),
        format!("{}/api", server.uri()),
    )
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(spotify_token()))
        .mount(server)
        .await;
}

/// Serves playlist `pl1` as three pages of 2, 2 and 1 tracks.
async fn mount_paged_playlist(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/playlists/pl1"))
        .and(query_param("fields", "name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Tarab Classics"})))
        .expect(1)
        .mount(server)
        .await;

    let page_url = |offset: u32| format!("{}/v1/playlists/pl1/tracks?offset={}", server.uri(), offset);

    Mock::given(method("GET"))
        .and(path("/v1/playlists/pl1/tracks"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(
            vec![
                playlist_item("t1", "Enta Omri", "Umm Kulthum"),
                playlist_item("t2", "Li Beirut", "Fairuz"),
            ],
            Some(page_url(2)),
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/playlists/pl1/tracks"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(
            vec![
                playlist_item("t3", "Aghadan Alqak", "Umm Kulthum"),
                json!({"track": null}),
            ],
            Some(page_url(4)),
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/playlists/pl1/tracks"))
        .and(query_param("offset", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(
            vec![playlist_item("t5", "Sawah", "Abdel Halim Hafez")],
            None,
        )))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_playlist_collects_every_page() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_paged_playlist(&server).await;

    let playlist = client_for(&server)
        .playlist("https://open.spotify.com/playlist/pl1?si=share")
        .await
        .unwrap();

    assert_eq!(playlist.name, "Tarab Classics");
    assert_eq!(playlist.track_count(), 4);
    assert_eq!(
        playlist
            .tracks
            .iter()
            .map(|t| t.title.as_str())
            .collect::<Vec<_>>(),
        ["Enta Omri", "Li Beirut", "Aghadan Alqak", "Sawah"]
    );
}

#[tokio::test]
async fn test_playlist_plan_plays_first_track() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_paged_playlist(&server).await;
    let client = client_for(&server);

    let plan = MusicManager::plan(Some(&client), "https://open.spotify.com/playlist/pl1")
        .await
        .unwrap();

    assert_eq!(plan.query, "Umm Kulthum - Enta Omri official audio");
    assert_matches!(
        plan.origin,
        TrackOrigin::SpotifyCollection { ref name, total: 4, .. } if name == "Tarab Classics"
    );
}

#[tokio::test]
async fn test_malformed_track_link_fails_before_network() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let client = client_for(&server);

    assert_matches!(
        client.track("https://open.spotify.com/track/").await,
        Err(SpotifyError::InvalidUrl(_))
    );
    assert_matches!(
        MusicManager::plan(Some(&client), "https://open.spotify.com/show/abc").await,
        Err(MusicError::Metadata(SpotifyError::InvalidUrl(_)))
    );
}

#[tokio::test]
async fn test_empty_playlist_is_reported() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/playlists/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Nothing"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/playlists/empty/tracks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(vec![], None)))
        .mount(&server)
        .await;

    let result = MusicManager::plan(
        Some(&client_for(&server)),
        "https://open.spotify.com/playlist/empty",
    )
    .await;

    assert_matches!(result, Err(MusicError::Metadata(SpotifyError::Empty)));
}
