use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::ErpError;

/// Default lifetime of a cached ERP login.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Owns the single cached ERP user id.
///
/// The uid is obtained lazily on first use, reused until the TTL elapses,
/// and dropped early by `invalidate` when the ERP refuses it.
pub struct OdooSession {
    cached: Mutex<Option<(i64, Instant)>>,
    ttl: Duration,
}

impl OdooSession {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cached: Mutex::new(None),
            ttl,
        }
    }

    /// Return the cached uid, or run `authenticate` and cache its result.
    ///
    /// The lock is held across `authenticate` so concurrent callers log in once.
    pub fn uid_or_authenticate<F>(&self, authenticate: F) -> Result<i64, ErpError>
    where
        F: FnOnce() -> Result<i64, ErpError>,
    {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((uid, at)) = *cached {
            if at.elapsed() < self.ttl {
                return Ok(uid);
            }
            tracing::debug!("ERP session expired, re-authenticating");
        }

        let uid = authenticate()?;
        *cached = Some((uid, Instant::now()));
        Ok(uid)
    }

    pub fn invalidate(&self) {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        *cached = None;
    }

    pub fn is_cached(&self) -> bool {
        self.cached
            .lock()
            .map(|c| c.is_some_and(|(_, at)| at.elapsed() < self.ttl))
            .unwrap_or(false)
    }
}

impl Default for OdooSession {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}
