use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub upload_dir: PathBuf,
    pub public_dir: PathBuf,
    pub reminder_file: PathBuf,
    pub seed_categories: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8890,
            db_path: "./todos.db".to_string(),
            upload_dir: PathBuf::from("./uploads"),
            public_dir: PathBuf::from("./public"),
            reminder_file: PathBuf::from("./pending_reminders.json"),
            seed_categories: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("TODO_HOST").unwrap_or(defaults.host),
            port: parse_var("TODO_PORT", defaults.port),
            db_path: env::var("TODO_DB_PATH").unwrap_or(defaults.db_path),
            upload_dir: env::var("TODO_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            public_dir: env::var("TODO_PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            reminder_file: env::var("TODO_REMINDER_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.reminder_file),
            seed_categories: parse_var("TODO_SEED_CATEGORIES", defaults.seed_categories),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Invalid value for {}: {:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
