//! Locks configured for the operation being authorized.
//!
//! The request arguments are `[app]` or `[app, lock]`. A second argument names a
//! single whitelist lock. Any other shape leaves the app unset, which the
//! orchestrator denies as a lock misconfiguration.
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockKind {
    Whitelist,
    Blacklist,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lock {
    pub name: String,
    pub kind: LockKind,
}

impl Lock {
    pub fn whitelist(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: LockKind::Whitelist,
        }
    }

    pub fn blacklist(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: LockKind::Blacklist,
        }
    }
}

/// App and locks derived from request arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LockResolution {
    pub app: Option<String>,
    pub locks: Vec<Lock>,
}

/// Allow/deny key sets in force for one evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    pub allow: BTreeSet<String>,
    pub deny: BTreeSet<String>,
}

impl AccessPolicy {
    pub fn from_locks(locks: &[Lock]) -> Self {
        let mut policy = Self::default();
        for lock in locks {
            match lock.kind {
                LockKind::Whitelist => policy.allow.insert(lock.name.clone()),
                LockKind::Blacklist => policy.deny.insert(lock.name.clone()),
            };
        }
        policy
    }
}

/// Derive the target app and its locks from `[app]` / `[app, lock]`.
///
/// Blank app names are treated like a missing argument.
pub fn resolve_locks<S: AsRef<str>>(args: &[S]) -> LockResolution {
    match args {
        [app] => LockResolution {
            app: non_blank(app.as_ref()),
            locks: Vec::new(),
        },
        [app, lock] => LockResolution {
            app: non_blank(app.as_ref()),
            locks: vec![Lock::whitelist(lock.as_ref())],
        },
        _ => LockResolution::default(),
    }
}

fn non_blank(s: &str) -> Option<String> {
    (!s.trim().is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_only() {
        let r = resolve_locks(&["orders"]);
        assert_eq!(r.app.as_deref(), Some("orders"));
        assert!(r.locks.is_empty());
    }

    #[test]
    fn app_and_lock_yields_one_whitelist_entry() {
        let r = resolve_locks(&["orders", "admin"]);
        assert_eq!(r.app.as_deref(), Some("orders"));
        assert_eq!(r.locks, vec![Lock::whitelist("admin")]);

        let policy = AccessPolicy::from_locks(&r.locks);
        assert_eq!(policy.allow.iter().collect::<Vec<_>>(), ["admin"]);
        assert!(policy.deny.is_empty());
    }

    #[test]
    fn unsupported_shapes_leave_app_unset() {
        assert_eq!(resolve_locks::<&str>(&[]), LockResolution::default());
        assert_eq!(
            resolve_locks(&["orders", "admin", "extra"]),
            LockResolution::default()
        );
        assert_eq!(resolve_locks(&[" "]).app, None);
    }

    #[test]
    fn blacklist_locks_populate_deny_set() {
        let policy =
            AccessPolicy::from_locks(&[Lock::whitelist("admin"), Lock::blacklist("suspended")]);
        assert!(policy.allow.contains("admin"));
        assert!(policy.deny.contains("suspended"));
    }
}
