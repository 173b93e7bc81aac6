//! Publishable resources: a declaration registry plus the copy routine the
//! CLI `publish` action runs.
//!
//! Registration only records source -> target mappings under a tag; nothing
//! touches the filesystem until a tag is explicitly published.

use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Tag for the package's static assets.
pub const ASSETS_TAG: &str = "wink-assets";
/// Tag for the default configuration file.
pub const CONFIG_TAG: &str = "wink-config";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishMapping {
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Host directories publish targets resolve against.
#[derive(Debug, Clone)]
pub struct HostPaths {
    pub public_dir: PathBuf,
    pub config_dir: PathBuf,
}

#[derive(Debug, Default)]
pub struct PublishRegistry {
    groups: BTreeMap<String, Vec<PublishMapping>>,
}

impl PublishRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a source -> target mapping under a tag.
    pub fn publishes(&mut self, tag: &str, source: PathBuf, target: PathBuf) {
        self.groups
            .entry(tag.to_string())
            .or_default()
            .push(PublishMapping { source, target });
    }

    #[must_use]
    pub fn group(&self, tag: &str) -> Option<&[PublishMapping]> {
        self.groups.get(tag).map(Vec::as_slice)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Declare the package's publish groups.
///
/// Declarations are only made in a command-line context; during request
/// handling the registry stays empty.
pub fn register_publishing(registry: &mut PublishRegistry, running_in_console: bool, paths: &HostPaths) {
    if !running_in_console {
        return;
    }

    let package_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    registry.publishes(
        ASSETS_TAG,
        package_root.join("assets"),
        paths.public_dir.join("vendor/wink"),
    );
    registry.publishes(
        CONFIG_TAG,
        package_root.join("config/wink.toml"),
        paths.config_dir.join("wink.toml"),
    );
}

/// Copy one publish group to its targets, returning the number of files
/// copied. Existing files are kept unless `force` is set.
///
/// # Errors
/// Returns an error for unknown tags or failed filesystem operations.
pub fn publish(registry: &PublishRegistry, tag: &str, force: bool) -> Result<usize> {
    let group = registry
        .group(tag)
        .ok_or_else(|| anyhow!("unknown publish tag: {tag}"))?;

    let mut copied = 0;
    for mapping in group {
        copied += copy_path(&mapping.source, &mapping.target, force)?;
    }

    Ok(copied)
}

fn copy_path(source: &Path, target: &Path, force: bool) -> Result<usize> {
    if source.is_dir() {
        fs::create_dir_all(target)
            .with_context(|| format!("Failed to create {}", target.display()))?;

        let entries = fs::read_dir(source)
            .with_context(|| format!("Failed to read {}", source.display()))?;

        let mut copied = 0;
        for entry in entries {
            let entry = entry?;
            copied += copy_path(&entry.path(), &target.join(entry.file_name()), force)?;
        }

        return Ok(copied);
    }

    if target.exists() && !force {
        debug!("Skipping existing {}", target.display());

        return Ok(0);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::copy(source, target).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            source.display(),
            target.display()
        )
    })?;

    info!("Copied {} to {}", source.display(), target.display());

    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_paths() -> HostPaths {
        HostPaths {
            public_dir: PathBuf::from("/srv/app/public"),
            config_dir: PathBuf::from("/srv/app/config"),
        }
    }

    #[test]
    fn nothing_declared_outside_console() {
        let mut registry = PublishRegistry::new();

        register_publishing(&mut registry, false, &host_paths());

        assert!(registry.is_empty());
    }

    #[test]
    fn console_declares_both_groups() {
        let mut registry = PublishRegistry::new();

        register_publishing(&mut registry, true, &host_paths());

        let tags: Vec<&str> = registry.tags().collect();
        assert_eq!(tags, vec![ASSETS_TAG, CONFIG_TAG]);

        let assets = registry.group(ASSETS_TAG).unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(
            assets[0].target,
            PathBuf::from("/srv/app/public/vendor/wink")
        );
        assert!(assets[0].source.ends_with("assets"));

        let config = registry.group(CONFIG_TAG).unwrap();
        assert_eq!(config.len(), 1);
        assert_eq!(config[0].target, PathBuf::from("/srv/app/config/wink.toml"));
    }

    #[test]
    fn publish_copies_config_into_host() {
        let host_root =
            std::env::temp_dir().join(format!("wink-publish-{}", std::process::id()));
        let paths = HostPaths {
            public_dir: host_root.join("public"),
            config_dir: host_root.join("config"),
        };

        let mut registry = PublishRegistry::new();
        register_publishing(&mut registry, true, &paths);

        let copied = publish(&registry, CONFIG_TAG, false).unwrap();
        assert_eq!(copied, 1);
        assert!(paths.config_dir.join("wink.toml").is_file());

        // A second run keeps the existing file.
        let copied = publish(&registry, CONFIG_TAG, false).unwrap();
        assert_eq!(copied, 0);

        // Unless forced.
        let copied = publish(&registry, CONFIG_TAG, true).unwrap();
        assert_eq!(copied, 1);

        fs::remove_dir_all(&host_root).ok();
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let registry = PublishRegistry::new();

        assert!(publish(&registry, "wink-views", false).is_err());
    }
}
