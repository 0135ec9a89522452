//! Locates a local browser profile whose cookies the extractor can reuse for
//! authenticated requests. The probe only checks that directories exist; it
//! never reads or writes the cookie stores.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Operating systems with known browser profile layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
}

impl HostOs {
    /// The OS this binary was built for, if it has a known layout.
    pub fn current() -> Option<Self> {
        Self::from_name(std::env::consts::OS)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "windows" => Some(Self::Windows),
            "macos" => Some(Self::MacOs),
            "linux" => Some(Self::Linux),
            _ => None,
        }
    }
}

/// Browsers the extractor can read cookies from, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Firefox,
    Edge,
}

impl Browser {
    pub const ALL: [Browser; 3] = [Browser::Chrome, Browser::Firefox, Browser::Edge];

    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
            Browser::Edge => "edge",
        }
    }

    /// Profile directory of this browser relative to the user's home directory.
    pub fn profile_dir(&self, os: HostOs) -> PathBuf {
        let parts: &[&str] = match (os, self) {
            (HostOs::Windows, Browser::Chrome) => {
                &["AppData", "Local", "Google", "Chrome", "User Data", "Default"]
            }
            (HostOs::Windows, Browser::Firefox) => {
                &["AppData", "Roaming", "Mozilla", "Firefox", "Profiles"]
            }
            (HostOs::Windows, Browser::Edge) => {
                &["AppData", "Local", "Microsoft", "Edge", "User Data", "Default"]
            }
            (HostOs::MacOs, Browser::Chrome) => {
                &["Library", "Application Support", "Google", "Chrome", "Default"]
            }
            (HostOs::MacOs, Browser::Firefox) => {
                &["Library", "Application Support", "Firefox", "Profiles"]
            }
            (HostOs::MacOs, Browser::Edge) => {
                &["Library", "Application Support", "Microsoft Edge", "Default"]
            }
            (HostOs::Linux, Browser::Chrome) => &[".config", "google-chrome", "Default"],
            (HostOs::Linux, Browser::Firefox) => &[".mozilla", "firefox"],
            (HostOs::Linux, Browser::Edge) => &[".config", "microsoft-edge", "Default"],
        };
        parts.iter().collect()
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A browser profile found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSource {
    pub browser: Browser,
    pub profile: PathBuf,
}

impl CookieSource {
    /// Value for the extractor's `--cookies-from-browser` flag.
    pub fn to_arg(&self) -> String {
        format!("{}:{}", self.browser, self.profile.display())
    }
}

/// Filesystem probe for browser profiles.
#[derive(Debug, Clone)]
pub struct CookieProbe {
    os: Option<HostOs>,
    home: Option<PathBuf>,
}

impl CookieProbe {
    /// Probe for the running OS under the current user's home directory.
    pub fn system() -> Self {
        Self {
            os: HostOs::current(),
            home: dirs::home_dir(),
        }
    }

    pub fn new(os: HostOs, home: impl Into<PathBuf>) -> Self {
        Self {
            os: Some(os),
            home: Some(home.into()),
        }
    }

    /// A probe that never finds anything.
    pub fn disabled() -> Self {
        Self {
            os: None,
            home: None,
        }
    }

    /// Returns the first browser profile (chrome, firefox, edge) that exists.
    pub fn find(&self) -> Option<CookieSource> {
        let (Some(os), Some(home)) = (self.os, self.home.as_deref()) else {
            debug!("Cookie probe skipped: unsupported OS or no home directory");
            return None;
        };

        let found = Self::scan(os, home);
        match &found {
            Some(source) => info!(
                "Found {} profile at {}",
                source.browser,
                source.profile.display()
            ),
            None => debug!("No browser profile found under {}", home.display()),
        }
        found
    }

    fn scan(os: HostOs, home: &Path) -> Option<CookieSource> {
        Browser::ALL.iter().find_map(|browser| {
            let profile = home.join(browser.profile_dir(os));
            profile.exists().then(|| CookieSource {
                browser: *browser,
                profile,
            })
        })
    }
}
