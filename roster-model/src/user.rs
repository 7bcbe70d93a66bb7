use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::validation::{self, ValidationError};

/// A user record as the remote API describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Shallow merge: fields present in the patch overwrite, the rest stay.
    /// The id is never rewritten so the entity keeps its cache key.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(first_name) = &patch.first_name {
            self.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name.clone_from(last_name);
        }
        if let Some(avatar) = &patch.avatar {
            self.avatar = Some(avatar.clone());
        }
    }

    /// Copy of the editable fields, used to pre-populate an edit form.
    pub fn to_payload(&self) -> UserPayload {
        UserPayload {
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            avatar: self.avatar.clone().unwrap_or_default(),
        }
    }
}

/// Body of create and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
}

impl UserPayload {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            avatar: avatar.into(),
        }
    }

    /// Runs every form rule and reports all violations at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut report = ValidationError::default();
        validation::check_email(&self.email, &mut report);
        validation::check_name("First name", &self.first_name, &mut report);
        validation::check_name("Last name", &self.last_name, &mut report);
        validation::check_avatar(&self.avatar, &mut report);
        report.into_result()
    }
}

/// Partial user fields returned by an update. Anything else the server
/// echoes back (timestamps and the like) is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<&UserPayload> for UserPatch {
    fn from(payload: &UserPayload) -> Self {
        UserPatch {
            email: Some(payload.email.clone()),
            first_name: Some(payload.first_name.clone()),
            last_name: Some(payload.last_name.clone()),
            avatar: Some(payload.avatar.clone()),
        }
    }
}
