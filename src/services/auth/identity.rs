//! Identity and grant types, and how login rows become an identity.
use serde::{Deserialize, Serialize};

/// A caller's resolved identity.
///
/// Created once per login, cached under the issued token, and never mutated.
/// Serialised as `{"sub": ..., "grants": [{"app": ..., "keys": [...]}], "iat": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "sub")]
    pub subject: String,
    pub grants: Vec<Grant>,
    #[serde(rename = "iat")]
    pub issued_at: i64,
}

/// Keys (roles) an identity holds for one app.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub app: String,
    pub keys: Vec<String>,
}

/// One (app, role) row from the identity store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrantRow {
    pub app: String,
    pub key: String,
}

impl GrantRow {
    pub fn new(app: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            key: key.into(),
        }
    }
}

impl Identity {
    /// Group rows by app. Apps keep first-seen order; duplicate apps and
    /// duplicate keys within an app are collapsed.
    ///
    /// Returns `None` when there are no rows.
    pub fn from_rows(subject: String, rows: &[GrantRow], issued_at: i64) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let mut grants: Vec<Grant> = Vec::new();
        for row in rows {
            match grants.iter_mut().find(|g| g.app == row.app) {
                Some(grant) => {
                    if !grant.keys.contains(&row.key) {
                        grant.keys.push(row.key.clone());
                    }
                }
                None => grants.push(Grant {
                    app: row.app.clone(),
                    keys: vec![row.key.clone()],
                }),
            }
        }

        Some(Self {
            subject,
            grants,
            issued_at,
        })
    }

    /// Keys held for `app`. Empty when the identity has no grant for it.
    pub fn keys_for(&self, app: &str) -> &[String] {
        self.grants
            .iter()
            .find(|g| g.app == app)
            .map(|g| g.keys.as_slice())
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Opaque subject label for a userid.
///
/// A 32-bit polynomial string hash (`h = 31 * h + unit` over UTF-16 code units,
/// wrapping) rendered as signed decimal. Not cryptographic: distinct userids can
/// collide. Issued tokens carry this value as `sub`, so changing it changes the
/// wire format.
pub fn subject_hash(userid: &str) -> String {
    let hash = userid
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)));
    hash.to_string()
}
