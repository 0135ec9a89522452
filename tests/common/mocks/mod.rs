//! Mock implementations of the extractor and of a live stream

use async_trait::async_trait;
use mockall::mock;
use nagham::commands::music::audio_sources::track_metadata::StreamHandle;
use nagham::commands::music::audio_sources::youtube::{ExtractError, Extractor, ResolverOptions};
use nagham::commands::music::utils::session::TrackControl;
use songbird::error::ControlError;

mock! {
    pub Extractor {}

    #[async_trait]
    impl Extractor for Extractor {
        async fn extract(
            &self,
            target: &str,
            options: &ResolverOptions,
        ) -> Result<StreamHandle, ExtractError>;
    }
}

mock! {
    pub Track {}

    impl TrackControl for Track {
        fn pause(&self) -> Result<(), ControlError>;
        fn resume(&self) -> Result<(), ControlError>;
        fn stop(&self) -> Result<(), ControlError>;
    }
}

/// A stream handle that accepts any control call.
pub fn compliant_track() -> MockTrack {
    let mut track = MockTrack::new();
    track.expect_pause().returning(|| Ok(()));
    track.expect_resume().returning(|| Ok(()));
    track.expect_stop().returning(|| Ok(()));
    track
}
