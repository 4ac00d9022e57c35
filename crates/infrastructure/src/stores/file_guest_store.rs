use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use domain::{Cart, GuestCartStore, RecoveryRecord};

// Fixed slots in the browser-scoped key/value store.
const CART_KEY: &str = "cart.json";
const RECOVERY_KEY: &str = "cart.recovery.json";

/// Guest cart tier backed by JSON files under a fixed directory, the
/// analog of browser local storage: one fixed key for the guest cart and
/// one recovery key written only as a last resort during teardown.
///
/// Nothing here ever fails toward the caller. Unreadable or corrupt data
/// is logged and treated as an empty cart; write failures are logged and
/// dropped, matching the fire-and-forget nature of local storage.
pub struct FileGuestStore {
    dir: PathBuf,
}

impl FileGuestStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn read_slot(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.slot(key)) {
            Ok(contents) => Some(contents),
            Err(error) if error.kind() == ErrorKind::NotFound => None,
            Err(error) => {
                tracing::warn!(key, %error, "failed to read guest storage slot");
                None
            }
        }
    }

    fn write_slot(&self, key: &str, contents: &str) {
        if let Err(error) = fs::create_dir_all(&self.dir) {
            tracing::error!(%error, "failed to create guest storage directory");
            return;
        }
        if let Err(error) = fs::write(self.slot(key), contents) {
            tracing::error!(key, %error, "failed to write guest storage slot");
        }
    }

    fn remove_slot(&self, key: &str) {
        match fs::remove_file(self.slot(key)) {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => tracing::warn!(key, %error, "failed to clear guest storage slot"),
        }
    }
}

impl GuestCartStore for FileGuestStore {
    fn load(&self) -> Cart {
        let Some(contents) = self.read_slot(CART_KEY) else {
            return Cart::new();
        };

        match serde_json::from_str(&contents) {
            Ok(cart) => cart,
            Err(error) => {
                // Corrupt guest data is recovered from by starting empty,
                // never surfaced to the user as an error.
                tracing::warn!(%error, "corrupt guest cart data, treating as empty");
                self.remove_slot(CART_KEY);
                Cart::new()
            }
        }
    }

    fn save(&self, cart: &Cart) {
        match serde_json::to_string(cart) {
            Ok(json) => self.write_slot(CART_KEY, &json),
            Err(error) => tracing::error!(%error, "failed to serialize guest cart"),
        }
    }

    fn clear(&self) {
        self.remove_slot(CART_KEY);
    }

    fn save_recovery(&self, record: &RecoveryRecord) {
        match serde_json::to_string(record) {
            Ok(json) => self.write_slot(RECOVERY_KEY, &json),
            Err(error) => tracing::error!(%error, "failed to serialize recovery record"),
        }
    }

    fn take_recovery(&self) -> Option<RecoveryRecord> {
        let contents = self.read_slot(RECOVERY_KEY)?;
        self.remove_slot(RECOVERY_KEY);

        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::warn!(%error, "corrupt recovery record, discarding");
                None
            }
        }
    }
}
