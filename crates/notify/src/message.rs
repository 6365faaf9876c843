//! Reminder message rendering.
//!
//! One plain-text body per stale host. The body always names the
//! platform, the version the host reported, and a concrete update
//! instruction the recipient can act on without asking IT what to do.

use stalewatch_core::Platform;

/// Per-platform update instruction.
fn update_instruction(platform: Platform) -> &'static str {
    match platform {
        Platform::MacOs => {
            "open System Settings > General > Software Update and install the pending update"
        }
        Platform::ChromeOs => {
            "open Settings > About ChromeOS > Check for updates, then restart to apply"
        }
        Platform::Windows => {
            "open Settings > Windows Update and install the pending update"
        }
        Platform::Linux => "run your distribution's package update and reboot if prompted",
        Platform::Android => {
            "open Settings > System > Software update and install the pending update"
        }
        Platform::Ios => "open Settings > General > Software Update and install the pending update",
    }
}

/// Render the reminder body for a stale host.
pub fn render_reminder(platform: Platform, observed_version: &str) -> String {
    format!(
        "Your {platform} device is running {observed_version}, which is no longer a current \
         release. To keep your machine compliant, please {instruction}. If you believe this \
         is in error, reply to this message and IT will take a look.",
        platform = platform.human_name(),
        observed_version = observed_version,
        instruction = update_instruction(platform),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_names_platform_and_version() {
        let body = render_reminder(Platform::MacOs, "14.4");
        assert!(body.contains("macOS"));
        assert!(body.contains("14.4"));
    }

    #[test]
    fn body_contains_an_actionable_instruction() {
        let body = render_reminder(Platform::MacOs, "14.4");
        assert!(body.contains("Software Update"));

        let body = render_reminder(Platform::Windows, "10.0.19043");
        assert!(body.contains("Windows Update"));
    }

    #[test]
    fn every_platform_has_a_distinct_instruction() {
        let platforms = [
            Platform::MacOs,
            Platform::ChromeOs,
            Platform::Windows,
            Platform::Linux,
            Platform::Android,
            Platform::Ios,
        ];
        for platform in platforms {
            assert!(!update_instruction(platform).is_empty());
        }
    }
}
