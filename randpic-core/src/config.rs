use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const DOMAIN_ENV: &str = "DOMAIN";
pub const CONFIG_FILE: &str = "config.json";

/// Where the effective domain came from, for the build log.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DomainSource {
    Override,
    Environment,
    ConfigFile,
    Default,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteConfig {
    /// Public URL prefix, never ending in `/`. Empty means relative URLs.
    pub domain: String,
    pub source: DomainSource,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    domain: Option<String>,
}

impl SiteConfig {
    /// Resolves the domain in priority order: explicit override, `DOMAIN`
    /// environment variable, `config.json` under `root`, empty.
    pub fn load(root: &Path, domain_override: Option<&str>) -> SiteConfig {
        let env_domain = std::env::var(DOMAIN_ENV).ok();
        let file_contents = {
            let path = root.join(CONFIG_FILE);
            if path.exists() {
                match fs::read_to_string(&path) {
                    Ok(data) => Some(data),
                    Err(e) => {
                        warn!("Failed to read {}: {e}", path.display());
                        None
                    }
                }
            } else {
                None
            }
        };
        Self::resolve(domain_override, env_domain.as_deref(), file_contents.as_deref())
    }

    fn resolve(
        domain_override: Option<&str>,
        env_domain: Option<&str>,
        file_contents: Option<&str>,
    ) -> SiteConfig {
        if let Some(domain) = domain_override.filter(|d| !d.is_empty()) {
            return SiteConfig::new(domain, DomainSource::Override);
        }

        if let Some(domain) = env_domain.filter(|d| !d.is_empty()) {
            info!("Loaded domain from environment variable.");
            return SiteConfig::new(domain, DomainSource::Environment);
        }

        if let Some(data) = file_contents {
            match serde_json::from_str::<ConfigFile>(data) {
                Ok(parsed) => {
                    info!("Loaded domain from {CONFIG_FILE}.");
                    if let Some(domain) = parsed.domain.filter(|d| !d.is_empty()) {
                        return SiteConfig::new(&domain, DomainSource::ConfigFile);
                    }
                }
                Err(e) => warn!("Failed to parse {CONFIG_FILE}, using default settings: {e}"),
            }
        }

        SiteConfig::new("", DomainSource::Default)
    }

    fn new(domain: &str, source: DomainSource) -> SiteConfig {
        SiteConfig {
            domain: normalize_domain(domain),
            source,
        }
    }
}

/// Strips trailing slashes so `{domain}/ri/...` never doubles it.
pub fn normalize_domain(domain: &str) -> String {
    domain.trim_end_matches('/').to_string()
}
