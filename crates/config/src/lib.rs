use dotenv::dotenv;
use dotenv::from_path;
use std::env;

#[derive(Debug)]
pub struct Config {
    pub cart_api_url: String,
    pub catalog_api_url: String,
    pub guest_storage_dir: String,
    pub save_debounce_ms: u64,
    pub save_timeout_secs: u64,
}

impl Config {
    /// Load configuration from a specified `.env` file path or default to
    /// the root `.env` file. Every knob has a default, so a bare
    /// environment still produces a usable config.
    pub fn from_env(env_path: Option<&str>) -> Self {
        if let Some(path) = env_path {
            if from_path(path).is_err() {
                eprintln!("Failed to load .env file from path: {}", path);
            }
        } else {
            dotenv().ok();
        }

        Self {
            cart_api_url: env::var("CART_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3000/api".to_string()),
            catalog_api_url: env::var("CATALOG_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3000/api/catalog".to_string()),
            guest_storage_dir: env::var("GUEST_STORAGE_DIR")
                .unwrap_or_else(|_| ".cart-storage".to_string()),
            save_debounce_ms: read_u64("SAVE_DEBOUNCE_MS", 800),
            save_timeout_secs: read_u64("SAVE_TIMEOUT_SECS", 15),
        }
    }
}

fn read_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
