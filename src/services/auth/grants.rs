//! Grant-versus-lock matching.
use std::collections::BTreeSet;

use crate::services::auth::{identity::Identity, locks::AccessPolicy};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Authorized,
    NotAuthorized,
}

impl Decision {
    pub fn is_authorized(self) -> bool {
        matches!(self, Self::Authorized)
    }
}

/// Decide whether `identity` may act on `app` under `policy`.
///
/// - no grant for `app` (or an empty one): not authorized
/// - a non-empty allow set needs at least one shared key
/// - an empty allow set accepts any grant for `app`
/// - a key in the deny set overrides an otherwise authorized match
///
/// Default lock resolution never fills the deny set.
pub fn evaluate(identity: &Identity, app: &str, policy: &AccessPolicy) -> Decision {
    let matching: BTreeSet<&str> = identity.keys_for(app).iter().map(String::as_str).collect();

    if matching.is_empty() {
        return Decision::NotAuthorized;
    }

    let allowed = policy.allow.is_empty()
        || policy.allow.iter().any(|key| matching.contains(key.as_str()));
    if !allowed {
        return Decision::NotAuthorized;
    }

    if policy.deny.iter().any(|key| matching.contains(key.as_str())) {
        return Decision::NotAuthorized;
    }

    Decision::Authorized
}
