use serde::Deserialize;

#[derive(Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Scan settings loaded from `.lfsauto.toml`.
#[derive(Deserialize, Clone)]
pub struct ScanConfig {
    /// Size threshold in MiB; files strictly larger are registered (default: 100)
    #[serde(default = "default_threshold_mib")]
    pub threshold_mib: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threshold_mib: default_threshold_mib(),
        }
    }
}

fn default_threshold_mib() -> u64 {
    100
}

/// Load `.lfsauto.toml` from the current directory, falling back to defaults.
pub fn load() -> Config {
    let path = std::path::Path::new(".lfsauto.toml");
    if path.exists() {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(cfg) => {
                    eprintln!("ℹ️  Loaded config from .lfsauto.toml");
                    return cfg;
                }
                Err(e) => eprintln!("⚠️  Failed to parse .lfsauto.toml: {}", e),
            },
            Err(e) => eprintln!("⚠️  Failed to read .lfsauto.toml: {}", e),
        }
    }
    Config::default()
}
