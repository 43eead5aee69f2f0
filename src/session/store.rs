use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use super::storage::SessionStorage;
use crate::api::LoginResponse;

/// Who is logged in on this client. Only [SessionStore::login] and
/// [SessionStore::logout] change it, and always as a whole.
#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    account_id: Option<String>,
    agency: Option<String>,
    account_number: Option<String>,
    customer_name: Option<String>,
    is_authenticated: bool,
}

impl Session {
    pub fn logged_out() -> Self {
        Self::default()
    }

    fn logged_in(data: &LoginResponse) -> Self {
        Self {
            account_id: Some(data.account_id.clone()),
            agency: Some(data.agency.clone()),
            account_number: Some(data.account_number.clone()),
            customer_name: Some(data.customer_name.clone()),
            is_authenticated: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    pub fn agency(&self) -> Option<&str> {
        self.agency.as_deref()
    }

    pub fn account_number(&self) -> Option<&str> {
        self.account_number.as_deref()
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    /// The logged in account, if any.
    pub fn identity(&self) -> Option<Identity> {
        if !self.is_authenticated {
            return None;
        }
        Some(Identity {
            account_id: self.account_id.clone()?,
            agency: self.agency.clone()?,
            account_number: self.account_number.clone()?,
            customer_name: self.customer_name.clone()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: String,
    pub agency: String,
    pub account_number: String,
    pub customer_name: String,
}

// Shape of the persisted record. Extra keys such as `isAuthenticated` are ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    account_id: String,
    agency: String,
    account_number: String,
    customer_name: String,
}

impl From<StoredSession> for LoginResponse {
    fn from(stored: StoredSession) -> Self {
        LoginResponse {
            account_id: stored.account_id,
            agency: stored.agency,
            account_number: stored.account_number,
            customer_name: stored.customer_name,
        }
    }
}

type Observer = Box<dyn Fn(&Session) + Send + Sync>;

pub struct SessionStore<S: SessionStorage> {
    storage: S,
    session: Session,
    observers: Vec<Observer>,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Restores the saved session. A missing, unreadable or corrupt record
    /// means nobody is logged in.
    pub async fn open(storage: S) -> Self {
        let session = match storage.load().await {
            Ok(Some(record)) => match serde_json::from_str::<StoredSession>(&record) {
                Ok(stored) => Session::logged_in(&stored.into()),
                Err(err) => {
                    log::warn!("Ignoring corrupt session record: {err}");
                    Session::logged_out()
                }
            },
            Ok(None) => Session::logged_out(),
            Err(err) => {
                log::warn!("Ignoring unreadable session record: {err:#}");
                Session::logged_out()
            }
        };
        Self {
            storage,
            session,
            observers: vec![],
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// `observer` is called with the new session after every login and logout.
    pub fn subscribe(&mut self, observer: impl Fn(&Session) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Replaces whatever session there was with `data`. The record is saved
    /// before the in-memory session changes, so a failed save leaves both untouched.
    pub async fn login(&mut self, data: &LoginResponse) -> Result<()> {
        let session = Session::logged_in(data);
        let record = serde_json::to_string(&session).context("Failed to serialize session")?;
        self.storage
            .save(&record)
            .await
            .context("Failed to save session")?;
        self.replace(session);
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.storage
            .remove()
            .await
            .context("Failed to remove saved session")?;
        self.replace(Session::logged_out());
        Ok(())
    }

    fn replace(&mut self, session: Session) {
        self.session = session;
        for observer in &self.observers {
            observer(&self.session);
        }
    }
}
