//! The staleness decision rule.
//!
//! A host is stale when its observed version is not a member of its
//! platform's current set. This is exact set membership, not an ordering
//! comparison: a host sitting on the latest point release of an older but
//! still-supported track is current, while a host one patch behind on any
//! track is stale. Replacing this with a greatest-version comparison would
//! wrongly flag everyone on legitimately supported older tracks.

use crate::types::{LatestVersionSet, Platform};

// ---------------------------------------------------------------------------
// Freshness
// ---------------------------------------------------------------------------

/// Outcome of evaluating one host against the current version sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The observed version is one of the platform's current versions.
    Current,
    /// The observed version is absent from the platform's current set.
    Stale,
    /// The platform has no entry in the set; the host cannot be evaluated
    /// this run and must be skipped, never treated as stale or current.
    Indeterminate,
}

// ---------------------------------------------------------------------------
// evaluate
// ---------------------------------------------------------------------------

/// Evaluate one observed version against the run's [`LatestVersionSet`].
pub fn evaluate(observed_version: &str, platform: Platform, latest: &LatestVersionSet) -> Freshness {
    match latest.versions_for(platform) {
        None => Freshness::Indeterminate,
        Some(versions) if versions.contains(observed_version) => Freshness::Current,
        Some(_) => Freshness::Stale,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn macos_two_tracks() -> LatestVersionSet {
        let mut set = LatestVersionSet::new();
        set.insert(Platform::MacOs, "14.5");
        set.insert(Platform::MacOs, "13.7.1");
        set
    }

    #[test]
    fn member_of_newest_track_is_current() {
        let set = macos_two_tracks();
        assert_eq!(evaluate("14.5", Platform::MacOs, &set), Freshness::Current);
    }

    #[test]
    fn member_of_older_track_is_current() {
        // 13.7.1 is numerically older than 14.5 but is the latest point
        // release of a supported track, so it must not be flagged.
        let set = macos_two_tracks();
        assert_eq!(evaluate("13.7.1", Platform::MacOs, &set), Freshness::Current);
    }

    #[test]
    fn one_patch_behind_is_stale() {
        let set = macos_two_tracks();
        assert_eq!(evaluate("14.4", Platform::MacOs, &set), Freshness::Stale);
    }

    #[test]
    fn behind_on_older_track_is_stale() {
        let set = macos_two_tracks();
        assert_eq!(evaluate("13.7", Platform::MacOs, &set), Freshness::Stale);
    }

    #[test]
    fn version_newer_than_any_track_is_stale() {
        // Membership is exact: a beta build ahead of every published track
        // is still not a member of the current set.
        let set = macos_two_tracks();
        assert_eq!(evaluate("15.0", Platform::MacOs, &set), Freshness::Stale);
    }

    #[test]
    fn platform_without_entry_is_indeterminate() {
        let set = macos_two_tracks();
        assert_eq!(
            evaluate("11.0", Platform::Windows, &set),
            Freshness::Indeterminate
        );
    }

    #[test]
    fn indeterminate_is_distinct_from_both_outcomes() {
        let set = macos_two_tracks();
        let outcome = evaluate("6.9", Platform::Linux, &set);
        assert_ne!(outcome, Freshness::Current);
        assert_ne!(outcome, Freshness::Stale);
    }

    #[test]
    fn fleet_scenario_two_current_one_stale() {
        // LatestVersionSet = {macOS: {"14.5", "13.7.1"}};
        // A on 14.5 and C on 13.7.1 are current, B on 14.4 is stale.
        let set = macos_two_tracks();
        let outcomes: Vec<Freshness> = [("A", "14.5"), ("B", "14.4"), ("C", "13.7.1")]
            .iter()
            .map(|(_, v)| evaluate(v, Platform::MacOs, &set))
            .collect();

        assert_eq!(
            outcomes,
            vec![Freshness::Current, Freshness::Stale, Freshness::Current]
        );
    }
}
