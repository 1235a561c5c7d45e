//! One-shot cache-bust flag in session-scoped storage.
//!
//! Arming the flag writes a version token to a small file in the session
//! directory. The token survives a session-cycle restart but is consumed
//! exactly once: the first read in a cycle deletes it from storage and
//! memoizes the value, so every later read in the same cycle sees the same
//! answer and the *next* cycle sees the flag absent unless re-armed.
//!
//! Storage failures never propagate from here; the flag fails open toward
//! normal caching behavior with a logged warning.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// File name of the flag inside the session directory.
pub const BUST_FLAG_FILE: &str = "f1_data_cache_bust";

/// Read state of the flag within one session cycle.
#[derive(Debug)]
enum FlagState {
    /// Storage has not been consulted yet this cycle.
    Unread,
    /// A token was found and consumed; re-reads return it unchanged.
    Token(String),
    /// Storage was consulted and no token was present.
    Empty,
}

#[derive(Debug)]
struct FlagInner {
    state: FlagState,
    last_issued: i64,
}

/// One-shot cache-bust signal scoped to a session cycle.
///
/// One instance per cycle; constructing a fresh instance is what resets the
/// memoized read state while the backing file carries the token across the
/// restart.
#[derive(Debug)]
pub struct BustFlag {
    path: PathBuf,
    inner: Mutex<FlagInner>,
}

impl BustFlag {
    /// Create a flag backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            inner: Mutex::new(FlagInner { state: FlagState::Unread, last_issued: 0 }),
        }
    }

    /// Path of the backing flag file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Arm the flag with a freshly generated version token.
    ///
    /// The token is a decimal string of milliseconds since the Unix epoch;
    /// arming twice within one millisecond bumps the value so every
    /// invocation issues a distinct token. Write failures are logged and
    /// otherwise ignored.
    pub fn arm(&self) {
        let mut inner = self.lock();

        let mut millis = chrono::Utc::now().timestamp_millis();
        if millis <= inner.last_issued {
            millis = inner.last_issued + 1;
        }
        inner.last_issued = millis;

        let token = millis.to_string();
        if let Err(e) = fs::write(&self.path, &token) {
            tracing::warn!("failed to arm cache-bust flag at {}: {}", self.path.display(), e);
        }
    }

    /// Consume the flag, returning the pending token if one was armed.
    ///
    /// The first call this cycle reads the backing file and, when a token
    /// is present, deletes the file immediately; the result is memoized so
    /// later calls return the same answer without touching storage. Read
    /// failures are treated as absent.
    pub fn consume(&self) -> Option<String> {
        let mut inner = self.lock();

        match &inner.state {
            FlagState::Token(token) => Some(token.clone()),
            FlagState::Empty => None,
            FlagState::Unread => match self.read_pending() {
                Some(token) => {
                    if let Err(e) = fs::remove_file(&self.path) {
                        tracing::warn!("failed to delete consumed cache-bust flag at {}: {}", self.path.display(), e);
                    }
                    inner.state = FlagState::Token(token.clone());
                    Some(token)
                }
                None => {
                    inner.state = FlagState::Empty;
                    None
                }
            },
        }
    }

    fn read_pending(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() { None } else { Some(token.to_string()) }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("failed to read cache-bust flag at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlagInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag_in(dir: &tempfile::TempDir) -> BustFlag {
        BustFlag::new(dir.path().join(BUST_FLAG_FILE))
    }

    #[test]
    fn test_consume_unarmed_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let flag = flag_in(&dir);
        assert_eq!(flag.consume(), None);
    }

    #[test]
    fn test_arm_then_consume_returns_millis_token() {
        let dir = tempfile::tempdir().unwrap();
        let flag = flag_in(&dir);
        flag.arm();

        let token = flag.consume().expect("armed flag should yield a token");
        let millis: i64 = token.parse().unwrap();
        assert!(millis > 0);
    }

    #[test]
    fn test_consume_memoizes_and_deletes_backing_file() {
        let dir = tempfile::tempdir().unwrap();
        let flag = flag_in(&dir);
        flag.arm();

        let first = flag.consume().unwrap();
        assert!(!flag.path().exists());

        // A token written behind the flag's back is invisible for the rest
        // of this cycle; the memoized value stands.
        fs::write(flag.path(), "999").unwrap();
        assert_eq!(flag.consume().as_deref(), Some(first.as_str()));
    }

    #[test]
    fn test_consumed_flag_absent_in_next_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BUST_FLAG_FILE);

        let flag = BustFlag::new(&path);
        flag.arm();
        assert!(flag.consume().is_some());

        let next_cycle = BustFlag::new(&path);
        assert_eq!(next_cycle.consume(), None);
    }

    #[test]
    fn test_unconsumed_flag_survives_cycle_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BUST_FLAG_FILE);

        BustFlag::new(&path).arm();

        let next_cycle = BustFlag::new(&path);
        assert!(next_cycle.consume().is_some());
    }

    #[test]
    fn test_tokens_unique_per_arm() {
        let dir = tempfile::tempdir().unwrap();
        let flag = flag_in(&dir);

        flag.arm();
        let first: i64 = fs::read_to_string(flag.path()).unwrap().parse().unwrap();
        flag.arm();
        let second: i64 = fs::read_to_string(flag.path()).unwrap().parse().unwrap();

        assert!(second > first);
    }

    #[test]
    fn test_memoized_absence_fixed_for_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let flag = flag_in(&dir);

        assert_eq!(flag.consume(), None);
        flag.arm();
        assert_eq!(flag.consume(), None);

        let next_cycle = flag_in(&dir);
        assert!(next_cycle.consume().is_some());
    }

    #[test]
    fn test_empty_flag_file_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let flag = flag_in(&dir);
        fs::write(flag.path(), "").unwrap();
        assert_eq!(flag.consume(), None);
    }
}
