//! Signature records held in the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A signed (or formerly signed) Contributor License Agreement.
///
/// `expires_at == None` means the signature is active. Timestamps are stored
/// as Unix milliseconds under `signed` / `expires` so that records written by
/// earlier deployments stay readable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedCla {
    #[serde(rename = "gitHubUser")]
    pub github_user: String,

    #[serde(default)]
    pub company: Option<String>,

    /// Corporate mail, set only for employee-verified records.
    #[serde(default)]
    pub msft_mail: Option<String>,

    #[serde(default)]
    pub employee: bool,

    #[serde(rename = "signed", with = "chrono::serde::ts_milliseconds")]
    pub signed_at: DateTime<Utc>,

    #[serde(
        rename = "expires",
        default,
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub can_self_terminate: bool,
}

impl SignedCla {
    /// An employee record without corporate mail cannot be verified and
    /// counts as unsigned until it is re-resolved.
    pub fn is_incomplete(&self) -> bool {
        self.employee && self.msft_mail.is_none()
    }

    /// Whether the signature has not expired at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) => expires_at > now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Mark the record expired at `at`.
    pub fn expire(&mut self, at: DateTime<Utc>) {
        self.expires_at = Some(at);
    }

    /// `user;company;mail` with a single space standing in for missing values.
    pub fn parsable_log(&self) -> String {
        let company = match self.company.as_deref() {
            None | Some("") => " ",
            Some(company) => company,
        };
        format!(
            "{};{};{}",
            self.github_user,
            company,
            self.msft_mail.as_deref().unwrap_or(" ")
        )
    }
}

impl fmt::Display for SignedCla {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User: {}", self.github_user)?;
        if let Some(company) = self.company.as_deref().filter(|c| !c.is_empty()) {
            write!(f, ", Company: {}", company)?;
        }
        if self.employee {
            write!(f, ", eMail: {}", self.msft_mail.as_deref().unwrap_or(""))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(employee: bool, mail: Option<&str>) -> SignedCla {
        SignedCla {
            github_user: "user0".into(),
            company: None,
            msft_mail: mail.map(str::to_string),
            employee,
            signed_at: Utc::now(),
            expires_at: None,
            can_self_terminate: true,
        }
    }

    #[test]
    fn test_incomplete_employee_record() {
        assert!(record(true, None).is_incomplete());
        assert!(!record(true, Some("user0@microsoft.com")).is_incomplete());
        assert!(!record(false, None).is_incomplete());
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let mut cla = record(false, None);
        assert!(cla.is_active_at(now));

        cla.expire(now);
        assert!(!cla.is_active_at(now));

        cla.expires_at = Some(now + Duration::days(1));
        assert!(cla.is_active_at(now));
    }

    #[test]
    fn test_reads_legacy_millisecond_layout() {
        let json = r#"{"gitHubUser":"externalUser0","company":null,"msftMail":null,
            "employee":false,"signed":1,"expires":null,"canSelfTerminate":true}"#;
        let cla: SignedCla = serde_json::from_str(json).unwrap();
        assert_eq!(cla.github_user, "externalUser0");
        assert_eq!(cla.signed_at.timestamp_millis(), 1);
        assert!(cla.is_active());

        let value = serde_json::to_value(&cla).unwrap();
        assert_eq!(value["signed"], 1);
        assert!(value["expires"].is_null());
    }

    #[test]
    fn test_missing_self_terminate_defaults_to_false() {
        let json = r#"{"gitHubUser":"formerUser0","msftMail":"formerUser0@microsoft.com",
            "employee":true,"signed":1,"expires":null}"#;
        let cla: SignedCla = serde_json::from_str(json).unwrap();
        assert!(!cla.can_self_terminate);
    }

    #[test]
    fn test_display_and_parsable_log() {
        let mut cla = record(true, Some("user0@microsoft.com"));
        cla.company = Some("Contoso".into());
        assert_eq!(
            cla.to_string(),
            "User: user0, Company: Contoso, eMail: user0@microsoft.com"
        );
        assert_eq!(cla.parsable_log(), "user0;Contoso;user0@microsoft.com");

        let external = record(false, None);
        assert_eq!(external.to_string(), "User: user0");
        assert_eq!(external.parsable_log(), "user0; ; ");
    }
}
