use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::assets::OUTPUT_EXTENSION;
use crate::category::{Category, Counts};
use crate::config::normalize_domain;
use crate::{BuildError, Result};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Folder under the domain that holds the category folders.
pub const ASSET_PREFIX: &str = "ri";

/// Values baked into the runtime script: how many images each category has
/// and the URL prefix they are served from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub counts: Counts,
    pub domain: String,
}

impl RuntimeConfig {
    pub fn new(counts: Counts, domain: &str) -> Self {
        Self {
            counts,
            domain: normalize_domain(domain),
        }
    }

    pub fn count(&self, category: Category) -> usize {
        self.counts.get(category)
    }

    /// `{domain}/ri/{category}/{index}.webp`. With an empty domain the URL is
    /// root-relative.
    pub fn url_for(&self, category: Category, index: usize) -> String {
        format!(
            "{}/{ASSET_PREFIX}/{}/{index}.{OUTPUT_EXTENSION}",
            self.domain,
            category.tag()
        )
    }

    /// Like [`url_for`](Self::url_for) but relative to the output folder when
    /// no domain is configured. Used by the gallery page.
    pub fn gallery_url_for(&self, category: Category, index: usize) -> String {
        if self.domain.is_empty() {
            format!("./{ASSET_PREFIX}/{}/{index}.{OUTPUT_EXTENSION}", category.tag())
        } else {
            self.url_for(category, index)
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn write(&self, dist: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(dist.join(MANIFEST_FILE), data)?;
        Ok(())
    }

    pub fn read(dist: &Path) -> Result<RuntimeConfig> {
        let path = dist.join(MANIFEST_FILE);
        let data = fs::read_to_string(&path).map_err(|e| {
            BuildError::Config(format!("Could not read {}: {e}", path.display()))
        })?;
        let mut config: RuntimeConfig = serde_json::from_str(&data)?;
        config.domain = normalize_domain(&config.domain);
        Ok(config)
    }
}
