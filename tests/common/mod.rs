//! Common test utilities, fixtures, and mocks

pub mod fixtures;
pub mod mocks;

use nagham::commands::music::audio_sources::cookies::{Browser, CookieProbe, HostOs};
use nagham::commands::music::audio_sources::youtube::{Extractor, Resolver, ResolverOptions};
use nagham::config::SpotifyCredentials;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

/// A resolver that never finds browser cookies.
pub fn anonymous_resolver(extractor: impl Extractor + 'static) -> Resolver {
    Resolver::new(
        Arc::new(extractor),
        CookieProbe::disabled(),
        ResolverOptions::default(),
    )
}

/// A resolver whose probe finds a Firefox profile in a temporary home.
/// Keep the returned directory alive for as long as the resolver is used.
pub fn cookie_resolver(extractor: impl Extractor + 'static) -> (TempDir, Resolver) {
    let home = tempfile::tempdir().unwrap();
    fs::create_dir_all(home.path().join(Browser::Firefox.profile_dir(HostOs::Linux))).unwrap();

    let resolver = Resolver::new(
        Arc::new(extractor),
        CookieProbe::new(HostOs::Linux, home.path()),
        ResolverOptions::default(),
    );
    (home, resolver)
}

pub fn spotify_credentials() -> SpotifyCredentials {
    SpotifyCredentials {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
    }
}
