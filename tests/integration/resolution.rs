use crate::common::fixtures::{YTDLP_EMPTY_SEARCH, YTDLP_SEARCH_LINE};
use crate::common::mocks::MockExtractor;
use crate::common::{anonymous_resolver, cookie_resolver};
use crate::{assert_eq, assert_matches};
use mockall::Sequence;
use mockall::predicate::{always, eq};
use nagham::commands::music::audio_sources::cookies::Browser;
use nagham::commands::music::audio_sources::youtube::{ExtractError, parse_extraction_output};
use std::time::Duration;

#[tokio::test]
async fn test_search_resolves_first_hit() {
    crate::test_utils::init();
    let mut extractor = MockExtractor::new();
    extractor
        .expect_extract()
        .with(eq("ytsearch:fairuz li beirut"), always())
        .times(1)
        .returning(|_, _| parse_extraction_output(YTDLP_SEARCH_LINE));

    let resolver = anonymous_resolver(extractor);
    let stream = resolver.resolve("  fairuz li beirut ").await.unwrap();

    assert_eq!(stream.title, "Fairuz - Li Beirut");
    assert_eq!(stream.duration, Some(Duration::from_secs(287)));
    assert_eq!(
        stream.webpage_url.as_deref(),
        Some("https://www.youtube.com/watch?v=kVTY0ZFdPzI")
    );
    assert_eq!(stream.http_headers.len(), 2);
}

#[tokio::test]
async fn test_video_link_is_not_prefixed() {
    let mut extractor = MockExtractor::new();
    extractor
        .expect_extract()
        .with(eq("https://youtu.be/kVTY0ZFdPzI"), always())
        .times(1)
        .returning(|_, _| parse_extraction_output(YTDLP_SEARCH_LINE));

    let resolver = anonymous_resolver(extractor);

    assert!(resolver.resolve("https://youtu.be/kVTY0ZFdPzI").await.is_ok());
}

#[tokio::test]
async fn test_cookie_failure_retries_exactly_once() {
    let mut seq = Sequence::new();
    let mut extractor = MockExtractor::new();
    extractor
        .expect_extract()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|_, options| {
            options
                .cookies
                .as_ref()
                .is_some_and(|c| c.browser == Browser::Firefox)
        })
        .returning(|_, _| Err(ExtractError::Failed("could not copy cookie database".into())));
    extractor
        .expect_extract()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|_, options| options.cookies.is_none())
        .returning(|_, _| parse_extraction_output(YTDLP_SEARCH_LINE));

    let (_home, resolver) = cookie_resolver(extractor);

    let stream = resolver.resolve("li beirut").await.unwrap();
    assert_eq!(stream.title, "Fairuz - Li Beirut");
}

#[tokio::test]
async fn test_garbage_query_reports_no_match() {
    let mut extractor = MockExtractor::new();
    extractor
        .expect_extract()
        .times(2)
        .returning(|_, _| parse_extraction_output(YTDLP_EMPTY_SEARCH));

    let (_home, resolver) = cookie_resolver(extractor);

    assert_matches!(
        resolver.resolve("nonexistent-garbage-query-xyz").await,
        Err(ExtractError::NoMatch)
    );
}
