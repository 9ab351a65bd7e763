use anyhow::{anyhow, Result};
use config::{Config, File, FileFormat};
use std::path::{Path, PathBuf};

use crate::MonitorConfig;

/// 配置加载器
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// 创建配置加载器
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self {
            config_dir: config_dir.as_ref().to_path_buf(),
        }
    }

    /// 加载监控配置
    ///
    /// 配置文件不存在时返回默认配置。
    pub fn load_monitor(&self) -> Result<MonitorConfig> {
        let config_path = self.config_dir.join("monitor.toml");

        if !config_path.exists() {
            return Ok(MonitorConfig::default());
        }

        let config = Config::builder()
            .add_source(File::new(
                config_path
                    .to_str()
                    .ok_or_else(|| anyhow!("Invalid config path"))?,
                FileFormat::Toml,
            ))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::new(dir.path());

        let config = loader.load_monitor().unwrap();
        assert_eq!(config.cooldown_seconds, 300);
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("monitor.toml"),
            r#"
            cooldown_seconds = 120
            max_history = 50

            [[thresholds]]
            metric = "cpu_usage"
            warning = 75.0
            critical = 90.0
            unit = "%"

            [[channels]]
            kind = "email"
            min_severity = "warning"
            recipients = ["ops@example.com"]
            "#,
        )
        .unwrap();

        let loader = ConfigLoader::new(dir.path());
        let config = loader.load_monitor().unwrap();

        assert_eq!(config.cooldown_seconds, 120);
        assert_eq!(config.max_history, 50);
        assert_eq!(config.thresholds[0].metric, "cpu_usage");
        assert_eq!(config.channels.len(), 1);
        assert_eq!(config.channels[0].recipients, vec!["ops@example.com"]);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("monitor.toml"), "cooldown_seconds = [not toml").unwrap();

        let loader = ConfigLoader::new(dir.path());
        assert!(loader.load_monitor().is_err());
    }
}
