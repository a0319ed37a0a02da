use std::sync::RwLock;

use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Classroom,
    Graph,
}

/// Bearer tokens handed over by the host. Refreshing them is the host's job;
/// a missing token surfaces as `AppError::Auth` on the next call.
#[derive(Debug, Default)]
pub struct SessionStore {
    classroom: RwLock<Option<String>>,
    graph: RwLock<Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    #[serde(default)]
    pub source_token: Option<String>,
    #[serde(default)]
    pub destination_token: Option<String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, audience: Audience) -> &RwLock<Option<String>> {
        match audience {
            Audience::Classroom => &self.classroom,
            Audience::Graph => &self.graph,
        }
    }

    pub fn set(&self, audience: Audience, token: impl Into<String>) -> Result<(), AppError> {
        let mut slot = self
            .slot(audience)
            .write()
            .map_err(|_| AppError::InternalServerError)?;
        *slot = Some(token.into());
        Ok(())
    }

    pub fn apply(&self, tokens: SessionTokens) -> Result<(), AppError> {
        if let Some(token) = tokens.source_token {
            self.set(Audience::Classroom, token)?;
        }
        if let Some(token) = tokens.destination_token {
            self.set(Audience::Graph, token)?;
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<(), AppError> {
        for audience in [Audience::Classroom, Audience::Graph] {
            let mut slot = self
                .slot(audience)
                .write()
                .map_err(|_| AppError::InternalServerError)?;
            *slot = None;
        }
        Ok(())
    }

    pub fn bearer(&self, audience: Audience) -> Result<String, AppError> {
        let slot = self
            .slot(audience)
            .read()
            .map_err(|_| AppError::InternalServerError)?;
        match slot.as_deref() {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(AppError::Auth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_is_auth_error() {
        let store = SessionStore::new();
        assert!(matches!(store.bearer(Audience::Graph), Err(AppError::Auth)));
    }

    #[test]
    fn apply_sets_only_given_tokens() {
        let store = SessionStore::new();
        store
            .apply(SessionTokens {
                source_token: Some("g-token".into()),
                destination_token: None,
            })
            .unwrap();
        assert_eq!(store.bearer(Audience::Classroom).unwrap(), "g-token");
        assert!(store.bearer(Audience::Graph).is_err());

        store.clear().unwrap();
        assert!(store.bearer(Audience::Classroom).is_err());
    }
}
