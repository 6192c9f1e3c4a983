use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const TOKEN_FILE: &str = "session_token";

/// Persists the single opaque session token across runs.
///
/// Three tiers, probed in order:
///   1. a file inside the state directory (survives restarts)
///   2. a file under the OS temp dir (usually cleared at boot)
///   3. an in-process slot (lost on exit)
///
/// No operation ever surfaces an error: a failing tier logs a warning and the
/// next tier takes over. Callers must treat a missing token as "no session",
/// never as a fault.
#[derive(Clone)]
pub struct TokenStore {
    durable: PathBuf,
    session: PathBuf,
    memory: Arc<Mutex<Option<String>>>,
}

impl TokenStore {
    /// Construct over an explicit state directory.
    pub fn new<P: AsRef<Path>>(state_dir: P) -> Self {
        let root = state_dir.as_ref();
        let durable = root.join(TOKEN_FILE);
        // The session tier is keyed by the state dir name so two campaigns on
        // the same machine do not clobber each other's fallback token.
        let tag = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "default".to_string());
        let session = std::env::temp_dir().join(format!("advent_campaign_{tag}.token"));
        Self {
            durable,
            session,
            memory: Arc::new(Mutex::new(None)),
        }
    }

    /// Construct using env var CAMPAIGN_STATE (default "campaign_state").
    pub fn new_from_env() -> Self {
        let root =
            std::env::var("CAMPAIGN_STATE").unwrap_or_else(|_| "campaign_state".to_string());
        Self::new(root)
    }

    /// Current token, if any tier holds one.
    pub fn get(&self) -> Option<String> {
        for path in [&self.durable, &self.session] {
            match fs::read_to_string(path) {
                Ok(raw) => {
                    let token = raw.trim();
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("token tier {} unreadable: {e}", path.display()),
            }
        }
        self.memory.lock().unwrap().clone()
    }

    /// Store the token, degrading through tiers on write failure.
    pub fn set(&self, token: &str) {
        if write_tier(&self.durable, token, true) {
            // A stale fallback copy must not shadow future reads after the
            // durable tier is cleared.
            let _ = fs::remove_file(&self.session);
            return;
        }
        tracing::warn!(
            "durable token tier {} unwritable, falling back",
            self.durable.display()
        );
        if write_tier(&self.session, token, false) {
            return;
        }
        tracing::warn!(
            "session token tier {} unwritable, keeping token in memory only",
            self.session.display()
        );
        *self.memory.lock().unwrap() = Some(token.to_string());
    }

    /// Best-effort wipe of every tier.
    pub fn clear(&self) {
        for path in [&self.durable, &self.session] {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("could not clear token tier {}: {e}", path.display());
                }
            }
        }
        *self.memory.lock().unwrap() = None;
    }
}

fn write_tier(path: &Path, token: &str, create_parent: bool) -> bool {
    if create_parent {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && fs::create_dir_all(parent).is_err() {
                return false;
            }
        }
    }
    fs::write(path, token).is_ok()
}
