//! Wire schema for the directory service's token and device endpoints.

use serde::Deserialize;

/// Response from `POST /auth/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Short-lived bearer secret.
    pub access_token: String,
    /// Seconds until expiry, when the directory reports it.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// The user a device is assigned to.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignedUser {
    /// Directory email address of the user.
    pub email: String,
}

/// One device record.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRecord {
    /// Serial the record is keyed by.
    pub hardware_serial: String,
    /// Assigned user, or `None` for unassigned devices.
    #[serde(default)]
    pub assigned_user: Option<AssignedUser>,
}

/// Response from `GET /api/v1/devices/{serial}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceResponse {
    /// The looked-up device.
    pub device: DeviceRecord,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_parses_with_and_without_expiry() {
        let with: TokenResponse =
            serde_json::from_str(r#"{ "access_token": "tok", "expires_in": 3600 }"#).unwrap();
        assert_eq!(with.access_token, "tok");
        assert_eq!(with.expires_in, Some(3600));

        let without: TokenResponse =
            serde_json::from_str(r#"{ "access_token": "tok" }"#).unwrap();
        assert!(without.expires_in.is_none());
    }

    #[test]
    fn device_with_assignee_parses() {
        let resp: DeviceResponse = serde_json::from_str(
            r#"{ "device": { "hardware_serial": "C02A",
                             "assigned_user": { "email": "kim@example.com" } } }"#,
        )
        .unwrap();
        assert_eq!(resp.device.assigned_user.unwrap().email, "kim@example.com");
    }

    #[test]
    fn unassigned_device_parses_to_none() {
        let resp: DeviceResponse = serde_json::from_str(
            r#"{ "device": { "hardware_serial": "C02B", "assigned_user": null } }"#,
        )
        .unwrap();
        assert!(resp.device.assigned_user.is_none());

        let omitted: DeviceResponse =
            serde_json::from_str(r#"{ "device": { "hardware_serial": "C02C" } }"#).unwrap();
        assert!(omitted.device.assigned_user.is_none());
    }

    #[test]
    fn missing_access_token_fails_to_parse() {
        let result: Result<TokenResponse, _> = serde_json::from_str(r#"{ "expires_in": 60 }"#);
        assert!(result.is_err());
    }
}
