use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AstVaultConfig {
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    pub crypto_only: Option<bool>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("astvault.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("astvault.db")
}

/// Resolve the store path: explicit flag, then config, then the default
pub fn resolve_database(flag: Option<&Path>, config: Option<&AstVaultConfig>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| config.and_then(|c| c.database.as_ref()).map(PathBuf::from))
        .unwrap_or_else(default_database_path)
}

pub fn load_config(path: Option<&Path>) -> crate::Result<Option<AstVaultConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: AstVaultConfig = toml::from_str(&contents)
        .map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &AstVaultConfig, force: bool) -> crate::Result<()> {
    if path.exists() && !force {
        return Err(crate::Error::Config(format!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    let contents = toml::to_string_pretty(config)
        .map_err(|e| crate::Error::Config(e.to_string()))?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> crate::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("nope.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("astvault.toml");
        let config = AstVaultConfig {
            database: Some("data/store.db".into()),
            exclude: vec!["fixtures/".into()],
            crypto_only: Some(true),
        };

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        write_config(&path, &config, true).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.database.as_deref(), Some("data/store.db"));
        assert_eq!(loaded.exclude, vec!["fixtures/"]);
        assert_eq!(loaded.crypto_only, Some(true));
    }

    #[test]
    fn test_resolve_database_precedence() {
        let config = AstVaultConfig { database: Some("from-config.db".into()), ..Default::default() };

        assert_eq!(resolve_database(Some(Path::new("flag.db")), Some(&config)), PathBuf::from("flag.db"));
        assert_eq!(resolve_database(None, Some(&config)), PathBuf::from("from-config.db"));
        assert_eq!(resolve_database(None, None), default_database_path());
    }

    #[test]
    fn test_ensure_db_dir_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested/deeper/store.db");
        ensure_db_dir(&db).unwrap();
        assert!(db.parent().unwrap().is_dir());
    }
}
