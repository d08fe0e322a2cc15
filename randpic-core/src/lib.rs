use rand::{rngs::StdRng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub mod assets;
pub mod category;
pub mod config;
pub mod manifest;
pub mod pages;
pub mod runtime;
pub mod script;

pub use category::{Category, Counts};
pub use config::SiteConfig;
pub use manifest::RuntimeConfig;

/// Folder under the project root holding one sub-folder per category.
pub const SOURCE_DIR: &str = "ri";
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to scan directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub root: PathBuf,
    /// Defaults to `{root}/dist`. Wiped on every build.
    pub output: Option<PathBuf>,
    /// Takes precedence over `DOMAIN` and `config.json`.
    pub domain: Option<String>,
    /// Fixes the shuffle; entropy when absent.
    pub seed: Option<u64>,
    pub gallery: bool,
}

impl BuildSettings {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: None,
            domain: None,
            seed: None,
            gallery: true,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.root.join(DEFAULT_OUTPUT_DIR))
    }

    pub fn sources(&self) -> Vec<(Category, PathBuf)> {
        Category::ALL
            .iter()
            .map(|c| (*c, self.root.join(SOURCE_DIR).join(c.tag())))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub config: RuntimeConfig,
    pub output: PathBuf,
    pub written: Vec<PathBuf>,
}

/// Removes `dir` with everything in it and creates it again, empty.
pub fn recreate_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Best-effort absolute form of a path that may not exist yet.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(p) = path.canonicalize() {
        return p;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            resolve(parent).join(name)
        }
        _ => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// The output folder is deleted wholesale, so it must not contain the
/// project root or any source folder.
fn check_output_dir(output: &Path, root: &Path, sources: &[(Category, PathBuf)]) -> Result<()> {
    let output = resolve(output);
    let guarded = std::iter::once(root).chain(sources.iter().map(|(_, p)| p.as_path()));
    for path in guarded {
        if resolve(path).starts_with(&output) {
            return Err(BuildError::Config(format!(
                "Output directory {} would delete {}",
                output.display(),
                path.display()
            )));
        }
    }
    Ok(())
}

pub fn run(settings: &BuildSettings) -> Result<BuildSummary> {
    info!("Starting build...");

    if !settings.root.is_dir() {
        return Err(BuildError::Config(format!(
            "Project root does not exist: {}",
            settings.root.display()
        )));
    }

    let site = SiteConfig::load(&settings.root, settings.domain.as_deref());
    info!("Using domain prefix: \"{}\"", site.domain);

    let dist = settings.output_dir();
    let sources = settings.sources();
    check_output_dir(&dist, &settings.root, &sources)?;
    recreate_dir(&dist)?;

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let counts = assets::randomize_assets(&sources, &dist.join(manifest::ASSET_PREFIX), &mut rng)?;
    let config = RuntimeConfig::new(counts, &site.domain);

    let mut written = vec![script::write_script(&dist, &config)?];
    config.write(&dist)?;
    written.push(dist.join(manifest::MANIFEST_FILE));
    written.push(pages::write_index(&settings.root, &dist)?);
    if settings.gallery {
        written.extend(pages::write_gallery(&settings.root, &dist, &config)?);
    }

    for (category, count) in config.counts.iter() {
        info!("{category}: {count} images");
    }
    info!("Build complete. Output is in {}", dist.display());

    Ok(BuildSummary {
        config,
        output: dist,
        written,
    })
}
