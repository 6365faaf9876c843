//! Wire schema for upstream version feed documents.
//!
//! The feed contract is externally owned; this module pins the shape we
//! accept and converts it into domain entries, failing fast on anything
//! that does not validate instead of letting loosely-typed JSON flow
//! inward.

use serde::Deserialize;
use stalewatch_core::Platform;

/// One supported release track and its latest point release.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedTrack {
    /// Upstream track name, e.g. `"sonoma"` or `"24.x"`.
    pub track: String,
    /// Latest point release of the track, e.g. `"14.7.6"`.
    pub latest: String,
}

/// A full feed document for a single platform.
///
/// ```json
/// { "platform": "macos",
///   "tracks": [ { "track": "sequoia", "latest": "15.5" },
///               { "track": "sonoma",  "latest": "14.7.6" } ] }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct FeedDocument {
    /// Platform token the tracks belong to.
    pub platform: String,
    /// All currently supported tracks. Must be non-empty.
    pub tracks: Vec<FeedTrack>,
}

impl FeedDocument {
    /// Validate the document and extract `(platform, versions)`.
    ///
    /// Rejects unrecognized platform tokens, empty track lists, and empty
    /// version strings; any of those means the upstream changed shape
    /// under us and the run must not guess.
    pub fn into_entries(self) -> Result<(Platform, Vec<String>), String> {
        let platform = Platform::parse(&self.platform)
            .ok_or_else(|| format!("unrecognized platform token \"{}\"", self.platform))?;

        if self.tracks.is_empty() {
            return Err(format!(
                "feed for \"{}\" contains no release tracks",
                self.platform
            ));
        }

        let mut versions = Vec::with_capacity(self.tracks.len());
        for track in &self.tracks {
            let version = track.latest.trim();
            if version.is_empty() {
                return Err(format!(
                    "track \"{}\" has an empty latest version",
                    track.track
                ));
            }
            versions.push(version.to_string());
        }

        Ok((platform, versions))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
