//! Domain types shared across the staleness pipeline.
//!
//! Everything here is produced fresh during a single run and dropped when
//! the run ends. Nothing in this module persists state or caches across
//! invocations.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// Operating-system platform of a managed host.
///
/// Parsed from upstream strings via [`Platform::parse`], which accepts the
/// common alias spellings the reporting backends actually emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[serde(rename = "macos")]
    MacOs,
    #[serde(rename = "chromeos")]
    ChromeOs,
    Windows,
    Linux,
    Android,
    Ios,
}

impl Platform {
    /// Parse a platform token from an upstream feed or inventory row.
    ///
    /// Matching is case-insensitive and tolerant of the alias spellings
    /// seen in the wild (`darwin`, `chrome_os`, `win`, ...). Returns
    /// `None` for anything unrecognized; callers decide how to surface
    /// that (the inventory adapter counts and skips such rows).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "macos" | "mac_os" | "darwin" | "osx" => Some(Self::MacOs),
            "chromeos" | "chrome_os" => Some(Self::ChromeOs),
            "windows" | "win" => Some(Self::Windows),
            "linux" => Some(Self::Linux),
            "android" => Some(Self::Android),
            "ios" => Some(Self::Ios),
            _ => None,
        }
    }

    /// Human-readable platform name for message bodies and logs.
    pub fn human_name(&self) -> &'static str {
        match self {
            Self::MacOs => "macOS",
            Self::ChromeOs => "ChromeOS",
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::Android => "Android",
            Self::Ios => "iOS",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.human_name())
    }
}

// ---------------------------------------------------------------------------
// HostRecord
// ---------------------------------------------------------------------------

/// One host as observed by the reporting backend for this run.
///
/// The inventory adapter guarantees `hardware_serial` and
/// `observed_version` are non-empty; rows that would violate that are
/// filtered out before a `HostRecord` is ever constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRecord {
    /// Stable, unique device identifier.
    pub hardware_serial: String,
    /// Dotted version string the host reported, e.g. `"14.5"`.
    pub observed_version: String,
    /// Platform the version belongs to.
    pub platform: Platform,
}

// ---------------------------------------------------------------------------
// LatestVersionSet
// ---------------------------------------------------------------------------

/// The set of versions considered "current" per platform.
///
/// A platform commonly maintains several supported major-version tracks at
/// once, each with its own latest point release, so "current" is a set
/// membership question, never a single maximum. Built once per run by the
/// version feed adapter and treated as immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatestVersionSet {
    by_platform: HashMap<Platform, BTreeSet<String>>,
}

impl LatestVersionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one current version for a platform.
    pub fn insert(&mut self, platform: Platform, version: impl Into<String>) {
        self.by_platform.entry(platform).or_default().insert(version.into());
    }

    /// All current versions for a platform, or `None` when the platform
    /// has no feed entry (which callers must treat as "cannot evaluate").
    pub fn versions_for(&self, platform: Platform) -> Option<&BTreeSet<String>> {
        self.by_platform.get(&platform)
    }

    /// Number of platforms with at least one current version.
    pub fn platform_count(&self) -> usize {
        self.by_platform.len()
    }

    /// True when no platform has any entry.
    pub fn is_empty(&self) -> bool {
        self.by_platform.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

/// The responsible person for a host, as resolved from the device
/// directory.
///
/// The directory hands back an email identity. Whether that email maps to
/// an account on the messaging platform is a separate question answered by
/// the notifier's identity-lookup step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    /// Directory-assigned email address of the responsible user.
    pub email: String,
    /// Serial of the device this contact was resolved from.
    pub hardware_serial: String,
}

// ---------------------------------------------------------------------------
// NotificationEvent
// ---------------------------------------------------------------------------

/// Everything the notifier needs to deliver one reminder.
///
/// Exists only long enough to be handed to delivery; nothing retains it
/// after the send attempt resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationEvent {
    /// The resolved recipient.
    pub contact: Contact,
    /// Serial of the stale host.
    pub hardware_serial: String,
    /// Version the host reported.
    pub observed_version: String,
    /// Platform of the stale host.
    pub platform: Platform,
    /// Rendered human-readable reminder text.
    pub message_body: String,
}

impl NotificationEvent {
    /// Assemble an event for a stale host.
    pub fn new(contact: Contact, host: &HostRecord, message_body: String) -> Self {
        Self {
            contact,
            hardware_serial: host.hardware_serial.clone(),
            observed_version: host.observed_version.clone(),
            platform: host.platform,
            message_body,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Platform::parse ------------------------------------------------------

    #[test]
    fn parse_accepts_canonical_tokens() {
        assert_eq!(Platform::parse("macos"), Some(Platform::MacOs));
        assert_eq!(Platform::parse("chromeos"), Some(Platform::ChromeOs));
        assert_eq!(Platform::parse("windows"), Some(Platform::Windows));
        assert_eq!(Platform::parse("linux"), Some(Platform::Linux));
    }

    #[test]
    fn parse_accepts_aliases_and_case() {
        assert_eq!(Platform::parse("Darwin"), Some(Platform::MacOs));
        assert_eq!(Platform::parse("CHROME_OS"), Some(Platform::ChromeOs));
        assert_eq!(Platform::parse(" win "), Some(Platform::Windows));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert_eq!(Platform::parse("templeos"), None);
        assert_eq!(Platform::parse(""), None);
    }

    #[test]
    fn human_name_is_branded_spelling() {
        assert_eq!(Platform::MacOs.human_name(), "macOS");
        assert_eq!(Platform::Ios.to_string(), "iOS");
    }

    // -- LatestVersionSet -----------------------------------------------------

    #[test]
    fn insert_and_lookup() {
        let mut set = LatestVersionSet::new();
        set.insert(Platform::MacOs, "14.5");
        set.insert(Platform::MacOs, "13.7.1");

        let versions = set.versions_for(Platform::MacOs).expect("macOS entry");
        assert_eq!(versions.len(), 2);
        assert!(versions.contains("14.5"));
        assert!(versions.contains("13.7.1"));
    }

    #[test]
    fn missing_platform_yields_none() {
        let set = LatestVersionSet::new();
        assert!(set.versions_for(Platform::Windows).is_none());
        assert!(set.is_empty());
    }

    #[test]
    fn duplicate_insert_is_idempotent() {
        let mut set = LatestVersionSet::new();
        set.insert(Platform::Linux, "6.9");
        set.insert(Platform::Linux, "6.9");
        assert_eq!(set.versions_for(Platform::Linux).unwrap().len(), 1);
        assert_eq!(set.platform_count(), 1);
    }

    // -- NotificationEvent ----------------------------------------------------

    #[test]
    fn event_copies_host_fields() {
        let host = HostRecord {
            hardware_serial: "C02XK".to_string(),
            observed_version: "14.4".to_string(),
            platform: Platform::MacOs,
        };
        let contact = Contact {
            email: "user@example.com".to_string(),
            hardware_serial: "C02XK".to_string(),
        };

        let event = NotificationEvent::new(contact, &host, "update please".to_string());
        assert_eq!(event.hardware_serial, "C02XK");
        assert_eq!(event.observed_version, "14.4");
        assert_eq!(event.platform, Platform::MacOs);
        assert_eq!(event.message_body, "update please");
    }
}
