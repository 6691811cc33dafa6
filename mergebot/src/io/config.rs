//! Repository configuration stored as TOML.
//!
//! ```toml
//! max_priority = 3
//! builders = ["mac-rel", "linux-wpt-1"]
//!
//! [[try_choosers]]
//! name = "mac"
//! builders = ["mac-rel"]
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::repo::RepoConfig;

impl RepoConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_priority < 0 {
            return Err(anyhow!("max_priority must be >= 0"));
        }
        let known: HashSet<&str> = self.builders.iter().map(String::as_str).collect();
        let mut names = HashSet::new();
        for chooser in self.try_choosers.iter().flatten() {
            if chooser.name.trim().is_empty() {
                return Err(anyhow!("try_choosers entries need a name"));
            }
            if !names.insert(chooser.name.as_str()) {
                return Err(anyhow!("duplicate try chooser '{}'", chooser.name));
            }
            if chooser.builders.is_empty() {
                return Err(anyhow!("try chooser '{}' has no builders", chooser.name));
            }
            if let Some(unknown) = chooser
                .builders
                .iter()
                .find(|builder| !known.contains(builder.as_str()))
            {
                return Err(anyhow!(
                    "try chooser '{}' names unknown builder '{}'",
                    chooser.name,
                    unknown
                ));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RepoConfig::default()`.
pub fn load_config(path: &Path) -> Result<RepoConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = RepoConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RepoConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &RepoConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::TryChooser;
    use crate::test_support::chooser_config;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, RepoConfig::default());
        assert!(cfg.try_choosers.is_none());
    }

    #[test]
    fn write_then_load_keeps_chooser_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("repo.toml");
        let cfg = chooser_config();
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.chooser_names(), vec!["mac", "wpt"]);
    }

    #[test]
    fn parses_array_of_tables() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("repo.toml");
        fs::write(
            &path,
            r#"
max_priority = 5
builders = ["a", "b", "c"]

[[try_choosers]]
name = "zeta"
builders = ["c"]

[[try_choosers]]
name = "alpha"
builders = ["a", "b"]
"#,
        )
        .expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.max_priority, 5);
        assert_eq!(cfg.chooser_names(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn rejects_chooser_with_unknown_builder() {
        let mut cfg = chooser_config();
        cfg.try_choosers = Some(vec![TryChooser {
            name: "mac".to_string(),
            builders: vec!["freebsd".to_string()],
        }]);
        let err = cfg.validate().expect_err("unknown builder");
        assert!(err.to_string().contains("freebsd"));
    }

    #[test]
    fn rejects_duplicate_chooser_names() {
        let mut cfg = chooser_config();
        if let Some(choosers) = cfg.try_choosers.as_mut() {
            let first = choosers[0].clone();
            choosers.push(first);
        }
        let err = cfg.validate().expect_err("duplicate chooser");
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn rejects_negative_max_priority() {
        let cfg = RepoConfig {
            max_priority: -1,
            ..RepoConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
