use std::path::PathBuf;

/// Server settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub tracks_dir: PathBuf,
    pub dist_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: 3000,
            tracks_dir: PathBuf::from("tracks"),
            dist_dir: PathBuf::from("dist"),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset or empty variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = ServerConfig::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|e| format!("Invalid PORT {port:?}: {e}"))?;
        }
        if let Some(dir) = get("TRACKS_DIR") {
            config.tracks_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("DIST_DIR") {
            config.dist_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn dist_assets_dir(&self) -> PathBuf {
        self.dist_dir.join("assets")
    }

    pub fn index_path(&self) -> PathBuf {
        self.dist_dir.join("index.html")
    }
}
