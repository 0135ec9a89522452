use crate::common::anonymous_resolver;
use crate::common::fixtures::{YTDLP_EMPTY_SEARCH, YTDLP_SEARCH_LINE};
use crate::common::mocks::{MockExtractor, MockTrack, compliant_track};
use crate::{assert_eq, assert_matches};
use mockall::Sequence;
use nagham::commands::music::audio_sources::track_metadata::{NowPlaying, StreamHandle};
use nagham::commands::music::audio_sources::youtube::{
    ExtractError, Resolver, parse_extraction_output,
};
use nagham::commands::music::utils::music_manager::{MusicError, MusicManager, MusicResult};
use nagham::commands::music::utils::session::{PlaybackState, SessionRegistry};
use poise::serenity_prelude::GuildId;
use rstest::{fixture, rstest};

fn guild() -> GuildId {
    GuildId::new(4242)
}

#[fixture]
fn sessions() -> SessionRegistry<MockTrack> {
    let sessions = SessionRegistry::new();
    sessions.connect(guild());
    sessions
}

fn stream(title: &str) -> StreamHandle {
    StreamHandle {
        stream_url: format!("https://cdn.example/{}", title),
        title: title.to_string(),
        ..Default::default()
    }
}

/// The `play` command flow with the voice call replaced by `start`.
async fn play(
    sessions: &SessionRegistry<MockTrack>,
    resolver: &Resolver,
    query: &str,
    start: impl FnOnce() -> MockTrack,
) -> MusicResult<u64> {
    sessions.stop(guild())?;
    let plan = MusicManager::plan(None, query).await?;
    let stream = MusicManager::resolve(resolver, &plan).await?;
    sessions.play(guild(), NowPlaying::from(&stream), |_| Ok(start()))
}

#[rstest]
#[tokio::test]
async fn test_garbage_query_leaves_bot_connected_and_idle(sessions: SessionRegistry<MockTrack>) {
    let mut extractor = MockExtractor::new();
    extractor
        .expect_extract()
        .returning(|_, _| parse_extraction_output(YTDLP_EMPTY_SEARCH));
    let resolver = anonymous_resolver(extractor);

    let result = play(&sessions, &resolver, "nonexistent-garbage-query-xyz", || {
        panic!("nothing should start")
    })
    .await;

    assert_matches!(result, Err(MusicError::Resolve(ExtractError::NoMatch)));
    assert!(sessions.is_connected(guild()));
    let snapshot = sessions.snapshot(guild()).unwrap();
    assert_eq!(snapshot.state, PlaybackState::Idle);
    assert_eq!(snapshot.current, None);
}

#[rstest]
#[tokio::test]
async fn test_new_query_replaces_current_track(sessions: SessionRegistry<MockTrack>) {
    let mut extractor = MockExtractor::new();
    extractor
        .expect_extract()
        .returning(|target, _| match target {
            "ytsearch:track a" => Ok(stream("A")),
            _ => parse_extraction_output(YTDLP_SEARCH_LINE),
        });
    let resolver = anonymous_resolver(extractor);

    let mut seq = Sequence::new();
    let mut track_a = MockTrack::new();
    track_a.expect_stop().times(1).in_sequence(&mut seq).returning(|| Ok(()));

    let first = play(&sessions, &resolver, "track a", || track_a).await.unwrap();
    assert_eq!(
        sessions.snapshot(guild()).unwrap().current.map(|t| t.title),
        Some("A".to_string())
    );

    let second = play(&sessions, &resolver, "https://youtu.be/kVTY0ZFdPzI", || {
        let mut track_b = MockTrack::new();
        track_b.expect_stop().times(0);
        track_b
    })
    .await
    .unwrap();

    assert!(second > first);
    let snapshot = sessions.snapshot(guild()).unwrap();
    assert_eq!(snapshot.state, PlaybackState::Playing);
    assert_eq!(snapshot.generation, second);
    assert_eq!(
        snapshot.current,
        Some(NowPlaying {
            title: "Fairuz - Li Beirut".to_string(),
            source_url: Some("https://www.youtube.com/watch?v=kVTY0ZFdPzI".to_string()),
            duration: Some(std::time::Duration::from_secs(287)),
        })
    );
}

#[rstest]
#[tokio::test]
async fn test_control_commands_follow_state_machine(sessions: SessionRegistry<MockTrack>) {
    let mut extractor = MockExtractor::new();
    extractor.expect_extract().returning(|_, _| Ok(stream("A")));
    let resolver = anonymous_resolver(extractor);

    assert_matches!(sessions.pause(guild()), Err(MusicError::NothingPlaying));

    play(&sessions, &resolver, "a", compliant_track).await.unwrap();
    sessions.pause(guild()).unwrap();
    assert_matches!(sessions.pause(guild()), Err(MusicError::NothingPlaying));
    assert_eq!(sessions.snapshot(guild()).unwrap().state, PlaybackState::Paused);

    sessions.resume(guild()).unwrap();
    assert_matches!(sessions.resume(guild()), Err(MusicError::NothingPaused));

    assert_eq!(
        sessions.stop(guild()).unwrap().map(|t| t.title),
        Some("A".to_string())
    );
    assert!(sessions.is_connected(guild()));

    assert_eq!(sessions.disconnect(guild()), None);
    assert_matches!(sessions.stop(guild()), Err(MusicError::NotConnected));
}

#[rstest]
#[tokio::test]
async fn test_stream_end_returns_session_to_idle(sessions: SessionRegistry<MockTrack>) {
    let mut extractor = MockExtractor::new();
    extractor.expect_extract().returning(|_, _| Ok(stream("A")));
    let resolver = anonymous_resolver(extractor);

    let generation = play(&sessions, &resolver, "a", compliant_track).await.unwrap();

    assert!(sessions.finish(guild(), generation));
    assert_eq!(sessions.snapshot(guild()).unwrap().state, PlaybackState::Idle);
    assert_matches!(sessions.pause(guild()), Err(MusicError::NothingPlaying));
}
