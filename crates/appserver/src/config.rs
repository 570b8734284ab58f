use anyhow::anyhow;
use clap::Parser;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::{Read, Write},
    path::PathBuf,
};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to Settings.toml file holding configuration options
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level to run with the service (default: info)
    #[arg(short, long)]
    pub level: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Settings {
    pub config: Option<String>,
    pub level: Option<String>,
    pub db_settings: DBSettings,
    pub api_settings: APISettings,
    pub services: ServicesSettings,
    pub firebase_settings: FirebaseSettings,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DBSettings {
    pub data_folder: String,
    pub read_max_connections: u32,
    pub read_min_connections: u32,
    pub write_max_connections: u32,
    pub write_min_connections: u32,
    pub idle_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
    pub sqlite_config: SqliteConfigSerde,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SqliteConfigSerde {
    pub mode: String,
    pub busy_timeout_ms: u32,
    pub journal_mode: String,
    pub synchronous: String,
    pub foreign_keys: bool,
}

impl Default for DBSettings {
    fn default() -> Self {
        DBSettings {
            data_folder: String::from("./data"),
            read_max_connections: 8,
            read_min_connections: 1,
            write_max_connections: 2,
            write_min_connections: 1,
            idle_timeout_secs: 600,   // 10 minutes
            acquire_timeout_secs: 15, // 15 seconds
            sqlite_config: SqliteConfigSerde::default(),
        }
    }
}

impl Default for SqliteConfigSerde {
    fn default() -> Self {
        Self {
            mode: "ReadWriteCreate".to_string(),
            busy_timeout_ms: 5000,
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
            foreign_keys: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct APISettings {
    pub domain: String,
    pub port: String,
    pub origins: Vec<String>,
}

impl Default for APISettings {
    fn default() -> Self {
        APISettings {
            domain: String::from("127.0.0.1"),
            port: String::from("8000"),
            origins: vec![String::from("http://localhost:19006")],
        }
    }
}

/// Address and credentials of one downstream service
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceSettings {
    pub base_url: String,
    /// Sent on every request in the `api_key` header
    pub api_key: String,
}

impl ServiceSettings {
    fn local(port: u16) -> Self {
        Self {
            base_url: format!("http://localhost:{}", port),
            api_key: String::from("changeme"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServicesSettings {
    /// Rooms, room bookings, ratings, reviews, comments and photos
    pub listing: ServiceSettings,
    /// Profiles, user feedback and favorite rooms
    pub users: ServiceSettings,
    /// Token validation, identity resolution and registration
    pub auth: ServiceSettings,
    /// Bookings, room prices and wallets
    pub payments: ServiceSettings,
}

impl Default for ServicesSettings {
    fn default() -> Self {
        Self {
            listing: ServiceSettings::local(8001),
            users: ServiceSettings::local(8002),
            auth: ServiceSettings::local(8003),
            payments: ServiceSettings::local(8004),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FirebaseSettings {
    /// When disabled photos, push notifications and chats are no-ops
    pub enabled: bool,
    /// Realtime database holding push tokens and chats
    pub database_url: String,
    pub database_secret: String,
    pub notifications_path: String,
    pub chats_path: String,
    pub messages_path: String,
    /// Cloud storage JSON API holding room and profile photos
    pub storage_url: String,
    pub storage_bucket: String,
    pub storage_token: String,
    /// Cloud messaging endpoint used to deliver push notifications
    pub messaging_url: String,
    pub messaging_key: String,
}

impl Default for FirebaseSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            database_url: String::from("https://bookbnb.firebaseio.com"),
            database_secret: String::new(),
            notifications_path: String::from("notifications"),
            chats_path: String::from("chats"),
            messages_path: String::from("messages"),
            storage_url: String::from("https://storage.googleapis.com"),
            storage_bucket: String::from("bookbnb.appspot.com"),
            storage_token: String::new(),
            messaging_url: String::from("https://fcm.googleapis.com/fcm/send"),
            messaging_key: String::new(),
        }
    }
}

pub fn get_settings() -> Result<Settings, anyhow::Error> {
    get_settings_with_cli(Cli::parse().into())
}

pub struct CliSettings {
    pub config: Option<String>,
    pub level: Option<String>,
}

impl From<Cli> for CliSettings {
    fn from(cli: Cli) -> Self {
        Self {
            config: cli.config,
            level: cli.level,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("./config/local.toml")
}

pub fn get_settings_with_cli(cli_settings: CliSettings) -> Result<Settings, anyhow::Error> {
    let mut settings: Settings = if let Some(config_path) = cli_settings.config.clone() {
        let path = PathBuf::from(config_path);

        let absolute_path = if path.is_absolute() {
            path
        } else {
            env::current_dir()?.join(path)
        };

        let mut file =
            File::open(absolute_path).map_err(|e| anyhow!("Failed to find file: {}", e))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| anyhow!("Failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| anyhow!("Failed to map config to settings: {}", e))?
    } else {
        let default_path = default_config_path();
        match File::open(&default_path) {
            Ok(mut file) => {
                let mut content = String::new();
                file.read_to_string(&mut content)
                    .map_err(|e| anyhow!("Failed to read default config: {}", e))?;
                toml::from_str(&content)
                    .map_err(|e| anyhow!("Failed to parse default config: {}", e))?
            }
            Err(_) => write_default_settings(&default_path)?,
        }
    };

    if let Some(level) = &cli_settings.level {
        settings.level = Some(level.clone());
    }

    Ok(settings)
}

fn write_default_settings(path: &PathBuf) -> Result<Settings, anyhow::Error> {
    let default_settings = Settings::default();

    if let Some(directory) = path.parent() {
        fs::create_dir_all(directory)
            .map_err(|e| anyhow!("Failed to create config directory: {}", e))?;
    }

    let toml_content = toml::to_string(&default_settings)
        .map_err(|e| anyhow!("Failed to serialize default settings: {}", e))?;

    let mut file =
        File::create(path).map_err(|e| anyhow!("Failed to create config file: {}", e))?;
    file.write_all(toml_content.as_bytes())
        .map_err(|e| anyhow!("Failed to write default config: {}", e))?;

    Ok(default_settings)
}

pub fn setup_logger(
    level: Option<String>,
    filter_targets: Vec<String>,
) -> Result<(), fern::InitError> {
    let rust_log = get_log_level(level);
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let timestamp = OffsetDateTime::now_utc()
                .format(&Iso8601::DEFAULT)
                .unwrap_or_default();
            out.finish(format_args!(
                "[{} {}] {}: {}",
                timestamp,
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .level(rust_log)
        .filter(move |metadata| {
            !filter_targets
                .iter()
                .any(|filter| metadata.target().starts_with(filter))
        })
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

pub fn get_log_level(level: Option<String>) -> LevelFilter {
    let level = level.unwrap_or_else(|| env::var("RUST_LOG").unwrap_or_default());
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}
