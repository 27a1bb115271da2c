//! Identity and employment lookups returned by external collaborators.

use serde::{Deserialize, Serialize};

/// Result of an employment-directory lookup. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentResolution {
    pub was_resolved: bool,
    pub principal_name: String,
}

impl EmploymentResolution {
    pub fn resolved(principal_name: impl Into<String>) -> Self {
        Self {
            was_resolved: true,
            principal_name: principal_name.into(),
        }
    }

    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Resolved with a non-empty principal.
    pub fn is_conclusive(&self) -> bool {
        self.was_resolved && !self.principal_name.is_empty()
    }
}

/// Link between a platform account and a corporate identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityLink {
    #[serde(rename = "gitHub")]
    pub platform: PlatformIdentity,

    #[serde(rename = "aad", default)]
    pub corporate: Option<CorporateIdentity>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformIdentity {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub organizations: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporateIdentity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
    #[serde(rename = "eMailAddress", default)]
    pub email_address: Option<String>,
}

impl IdentityLink {
    /// Link for `login` with corporate principal `upn`.
    pub fn linked(id: i64, login: impl Into<String>, upn: impl Into<String>) -> Self {
        Self {
            platform: PlatformIdentity {
                id,
                login: login.into(),
                organizations: Vec::new(),
            },
            corporate: Some(CorporateIdentity {
                user_principal_name: Some(upn.into()),
                ..CorporateIdentity::default()
            }),
        }
    }

    /// Corporate mail used to sign on behalf of an employee.
    pub fn corporate_email(&self) -> Option<&str> {
        let corporate = self.corporate.as_ref()?;
        corporate
            .user_principal_name
            .as_deref()
            .or(corporate.email_address.as_deref())
            .filter(|mail| !mail.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corporate_email_prefers_principal_name() {
        let link = IdentityLink::linked(1, "user1", "user1@microsoft.com");
        assert_eq!(link.corporate_email(), Some("user1@microsoft.com"));
    }

    #[test]
    fn test_unlinked_identity_has_no_email() {
        let json = r#"{"gitHub":{"id":1,"login":"user1"}}"#;
        let link: IdentityLink = serde_json::from_str(json).unwrap();
        assert_eq!(link.corporate_email(), None);

        let json = r#"{"gitHub":{"id":1,"login":"user1"},"aad":{"alias":"user1","eMailAddress":"u1@corp.example"}}"#;
        let link: IdentityLink = serde_json::from_str(json).unwrap();
        assert_eq!(link.corporate_email(), Some("u1@corp.example"));
    }

    #[test]
    fn test_resolution_conclusive() {
        assert!(EmploymentResolution::resolved("test").is_conclusive());
        assert!(!EmploymentResolution::unresolved().is_conclusive());
        assert!(!EmploymentResolution::resolved("").is_conclusive());
    }
}
