use std::sync::Arc;
#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};
#[cfg(test)]
use tokio::sync::Mutex as TokioMutex;
use tracing::debug;
#[cfg(not(test))]
use tracing::warn;

use vpnhub_client::{CredentialStore, FileStore, MemoryStore, Slot, StoreError};

use crate::modules::system::{config_dir, CliContext, CredentialBackend};
use crate::CREDENTIAL_STORE_ENV;

const KEYRING_SERVICE: &str = "vpnhub-cli";

fn keyring_key(slot: Slot, context_name: &str) -> String {
    format!("{}::{}", slot.as_str(), context_name)
}

#[cfg(test)]
fn keyring_store() -> &'static Mutex<HashMap<String, String>> {
    static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
    STORE.get_or_init(|| Mutex::new(HashMap::new()))
}

#[cfg(test)]
static KEYRING_TEST_LOCK: OnceLock<TokioMutex<()>> = OnceLock::new();

#[cfg(test)]
pub(crate) fn lock_keyring_tests_sync() -> tokio::sync::MutexGuard<'static, ()> {
    KEYRING_TEST_LOCK
        .get_or_init(|| TokioMutex::new(()))
        .blocking_lock()
}

#[cfg(test)]
pub(crate) async fn lock_keyring_tests_async() -> tokio::sync::MutexGuard<'static, ()> {
    KEYRING_TEST_LOCK
        .get_or_init(|| TokioMutex::new(()))
        .lock()
        .await
}

#[cfg(test)]
pub(crate) fn clear_keyring_mock() {
    if let Ok(mut map) = keyring_store().lock() {
        map.clear();
    }
}

#[cfg(not(test))]
fn keyring_entry(slot: Slot, context_name: &str) -> Result<keyring::Entry, StoreError> {
    let key = keyring_key(slot, context_name);
    keyring::Entry::new(KEYRING_SERVICE, &key)
        .map_err(|err| StoreError::Backend(format!("failed to access keyring: {err}")))
}

#[cfg(not(test))]
fn keyring_set(slot: Slot, context_name: &str, value: &str) -> Result<(), StoreError> {
    let entry = keyring_entry(slot, context_name)?;
    entry.set_password(value).map_err(|err| {
        StoreError::Backend(format!("failed to store {}: {err}", slot.as_str()))
    })
}

#[cfg(not(test))]
fn keyring_get(slot: Slot, context_name: &str) -> Result<Option<String>, StoreError> {
    let entry = keyring_entry(slot, context_name)?;
    match entry.get_password() {
        Ok(value) => Ok(Some(value)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(StoreError::Backend(format!(
            "failed to load {} from keychain for context '{}': {err}",
            slot.as_str(),
            context_name
        ))),
    }
}

#[cfg(not(test))]
fn keyring_delete(slot: Slot, context_name: &str) -> Result<(), StoreError> {
    let entry = keyring_entry(slot, context_name)?;
    match entry.delete_password() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(err) => {
            warn!(context = %context_name, slot = slot.as_str(), "failed to delete credential: {err}");
            Ok(())
        }
    }
}

#[cfg(test)]
fn keyring_set(slot: Slot, context_name: &str, value: &str) -> Result<(), StoreError> {
    let key = keyring_key(slot, context_name);
    let mut store = keyring_store()
        .lock()
        .map_err(|_| StoreError::Backend("failed to lock keyring store".to_string()))?;
    store.insert(key, value.to_string());
    Ok(())
}

#[cfg(test)]
fn keyring_get(slot: Slot, context_name: &str) -> Result<Option<String>, StoreError> {
    let key = keyring_key(slot, context_name);
    let store = keyring_store()
        .lock()
        .map_err(|_| StoreError::Backend("failed to lock keyring store".to_string()))?;
    Ok(store.get(&key).cloned())
}

#[cfg(test)]
fn keyring_delete(slot: Slot, context_name: &str) -> Result<(), StoreError> {
    let key = keyring_key(slot, context_name);
    let mut store = keyring_store()
        .lock()
        .map_err(|_| StoreError::Backend("failed to lock keyring store".to_string()))?;
    store.remove(&key);
    Ok(())
}

/// Credentials of one context kept in the OS keychain.
pub(crate) struct KeyringStore {
    context_name: String,
}

impl KeyringStore {
    pub(crate) fn new(context_name: &str) -> Self {
        Self {
            context_name: context_name.to_string(),
        }
    }
}

impl CredentialStore for KeyringStore {
    fn load(&self, slot: Slot) -> Result<Option<String>, StoreError> {
        keyring_get(slot, &self.context_name)
    }

    fn save(&self, slot: Slot, value: &str) -> Result<(), StoreError> {
        keyring_set(slot, &self.context_name, value)?;
        debug!(context = %self.context_name, slot = slot.as_str(), "stored credential in keyring");
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<(), StoreError> {
        keyring_delete(slot, &self.context_name)
    }
}

fn credentials_path(context_name: &str) -> anyhow::Result<std::path::PathBuf> {
    let file_name: String = context_name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    Ok(config_dir()?
        .join("credentials")
        .join(format!("{file_name}.json")))
}

/// Backend for a context: `VPNHUB_CREDENTIAL_STORE` wins over the context
/// setting, which wins over the default.
pub(crate) fn resolve_backend(
    context: Option<&CliContext>,
) -> anyhow::Result<CredentialBackend> {
    if let Ok(value) = std::env::var(CREDENTIAL_STORE_ENV) {
        if !value.trim().is_empty() {
            return value.parse();
        }
    }
    Ok(context.map(|ctx| ctx.credential_store).unwrap_or_default())
}

fn persistent_store(
    context_name: &str,
    context: Option<&CliContext>,
) -> anyhow::Result<Arc<dyn CredentialStore>> {
    let store: Arc<dyn CredentialStore> = match resolve_backend(context)? {
        CredentialBackend::Keyring => Arc::new(KeyringStore::new(context_name)),
        CredentialBackend::File => Arc::new(FileStore::new(credentials_path(context_name)?)),
    };
    Ok(store)
}

/// Picks the credential store for this invocation: an explicit token and
/// mock mode stay in memory, everything else uses the context's backend.
pub(crate) fn open_credential_store(
    token: Option<&str>,
    mock: bool,
    context_name: &str,
    context: Option<&CliContext>,
) -> anyhow::Result<Arc<dyn CredentialStore>> {
    if let Some(token) = token {
        if token.trim().is_empty() {
            anyhow::bail!("token is empty");
        }
        return Ok(Arc::new(MemoryStore::seeded(token.trim(), None)));
    }
    if mock {
        return Ok(Arc::new(MemoryStore::new()));
    }
    persistent_store(context_name, context)
}

/// Removes both stored credentials of a context.
pub(crate) fn forget_credentials(
    context_name: &str,
    context: Option<&CliContext>,
) -> anyhow::Result<()> {
    let store = persistent_store(context_name, context)?;
    store.remove(Slot::AccessToken)?;
    store.remove(Slot::RefreshToken)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyring_store_roundtrip() -> anyhow::Result<()> {
        let _guard = lock_keyring_tests_sync();
        clear_keyring_mock();
        let store = KeyringStore::new("ctx");
        store.save(Slot::AccessToken, "access")?;
        store.save(Slot::RefreshToken, "refresh")?;
        assert_eq!(store.load(Slot::AccessToken)?, Some("access".to_string()));
        assert_eq!(
            KeyringStore::new("other").load(Slot::AccessToken)?,
            None
        );
        store.remove(Slot::AccessToken)?;
        store.remove(Slot::AccessToken)?;
        assert_eq!(store.load(Slot::AccessToken)?, None);
        assert_eq!(store.load(Slot::RefreshToken)?, Some("refresh".to_string()));
        Ok(())
    }

    #[test]
    fn explicit_token_stays_in_memory() -> anyhow::Result<()> {
        let store = open_credential_store(Some(" T1 "), false, "ctx", None)?;
        assert_eq!(store.load(Slot::AccessToken)?, Some("T1".to_string()));
        assert_eq!(store.load(Slot::RefreshToken)?, None);
        assert!(open_credential_store(Some(""), false, "ctx", None).is_err());
        Ok(())
    }

    #[test]
    fn credential_file_names_are_sanitized() -> anyhow::Result<()> {
        let path = credentials_path("team/prod eu")?;
        assert_eq!(
            path.file_name().and_then(|name| name.to_str()),
            Some("team_prod_eu.json")
        );
        Ok(())
    }
}
