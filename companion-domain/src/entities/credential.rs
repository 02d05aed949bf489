// Credential entity

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub rsn: String,
    pub jwt: String,
    pub team_id: String,
    pub expires_implicitly: bool,
}

impl Credential {
    pub fn new(rsn: impl Into<String>, jwt: impl Into<String>, team_id: impl Into<String>) -> Self {
        Self {
            rsn: rsn.into(),
            jwt: jwt.into(),
            team_id: team_id.into(),
            expires_implicitly: true,
        }
    }

    pub fn has_team(&self) -> bool {
        !self.team_id.trim().is_empty()
    }
}

/// What callers outside the session may see; never carries the jwt.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub rsn: Option<String>,
    pub team_id: Option<String>,
}

impl From<Option<&Credential>> for SessionSnapshot {
    fn from(credential: Option<&Credential>) -> Self {
        match credential {
            Some(credential) => Self {
                authenticated: true,
                rsn: Some(credential.rsn.clone()),
                team_id: Some(credential.team_id.clone()).filter(|id| !id.is_empty()),
            },
            None => Self::default(),
        }
    }
}
