use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Opaque playable handle issued by [`super::MediaRegistry`].
///
/// Unique within a session; never reissued after revocation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaUrl(pub(super) u64);

impl fmt::Display for MediaUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blob:vinyl/{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub url: MediaUrl,
    pub name: String,
    pub duration: Option<Duration>,
}

/// One accepted file after its duration probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub duration: Option<Duration>,
}
