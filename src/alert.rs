//! One-shot messages carried in the session until the next page render.

use serde::{Deserialize, Serialize};

use crate::auth::session::{Session, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Info,
    Danger,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Info => "info",
            AlertKind::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub body: String,
}

impl Alert {
    pub fn new(kind: AlertKind, body: impl Into<String>) -> Self {
        Self {
            kind,
            body: body.into(),
        }
    }
}

impl Session {
    /// Queue an alert for the next page render
    pub fn add_alert(&self, kind: AlertKind, body: impl Into<String>) -> Result<(), SessionError> {
        let alert = Alert::new(kind, body);
        self.update(|claims| claims.alerts.push(alert))
    }

    /// Take every pending alert, leaving none behind
    pub fn drain_alerts(&self) -> Result<Vec<Alert>, SessionError> {
        if self.claims().alerts.is_empty() {
            return Ok(Vec::new());
        }
        self.update(|claims| std::mem::take(&mut claims.alerts))
    }
}
