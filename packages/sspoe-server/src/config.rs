use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// Where learner preferences are persisted.
    pub data_dir: PathBuf,
    /// Catalog override; the built-in catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// Daily rolling log files are written here when set.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let data_dir = std::env::var("SSPOE_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let catalog_path = std::env::var("SSPOE_CATALOG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let log_dir = file_log_dir(
            std::env::var("ENABLE_FILE_LOGS").ok().as_deref(),
            std::env::var("LOG_DIR").ok().as_deref(),
        );

        Self {
            host,
            port,
            log_level,
            data_dir,
            catalog_path,
            log_dir,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("sspoe"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// `ENABLE_FILE_LOGS=true|1` turns file logs on, in `LOG_DIR` or `./logs`.
fn file_log_dir(enabled: Option<&str>, dir: Option<&str>) -> Option<PathBuf> {
    let enabled = matches!(enabled.map(str::trim), Some("true" | "1"));
    enabled.then(|| {
        dir.map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./logs"))
    })
}
