//! 配置管理
//!
//! 从 TOML 文件和 `TRIAGE_` 前缀的环境变量加载配置，缺省字段使用默认值

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use triage_workflow::TieBreakPolicy;

/// 配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    /// 配置数据
    config: TriageConfig,
    /// 配置文件路径
    config_path: Option<PathBuf>,
    /// 配置验证器
    validator: ConfigValidator,
}

/// 分诊系统完整配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// 工作流配置
    pub workflow: WorkflowConfig,
    /// 快照存储配置
    pub storage: StorageConfig,
    /// 监控配置
    pub monitoring: MonitoringConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 工作流配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// 急诊层内的排序策略
    pub tie_break: TieBreakPolicy,
}

/// 快照存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 启用快照持久化
    pub enabled: bool,
    /// 快照文件路径
    pub snapshot_path: String,
    /// 每次状态变更后自动保存
    pub autosave: bool,
}

/// 监控配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// 启用指标收集
    pub enabled: bool,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（EnvFilter 语法）
    pub level: String,
    /// 彩色输出
    pub ansi: bool,
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    /// 验证规则
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: &'static str,
    /// 验证函数
    validator: fn(&TriageConfig) -> Result<()>,
}

impl ConfigManager {
    /// 加载配置
    ///
    /// 给定路径时配置文件必须存在；不给路径时只使用默认值和环境变量。
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Self::load_config(config_path)?;
        let validator = ConfigValidator::new();
        validator.validate(&config)?;

        Ok(Self {
            config,
            config_path: config_path.map(Path::to_path_buf),
            validator,
        })
    }

    /// 直接使用给定配置
    pub fn from_config(config: TriageConfig) -> Result<Self> {
        let validator = ConfigValidator::new();
        validator.validate(&config)?;

        Ok(Self {
            config,
            config_path: None,
            validator,
        })
    }

    fn load_config(config_path: Option<&Path>) -> Result<TriageConfig> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("TRIAGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: TriageConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        match config_path {
            Some(path) => info!("Configuration loaded from: {}", path.display()),
            None => info!("Configuration loaded from defaults and environment"),
        }
        Ok(config)
    }

    /// 获取配置
    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// 修改配置（修改后重新验证，失败时保持原配置）
    pub fn update<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut TriageConfig),
    {
        let mut candidate = self.config.clone();
        change(&mut candidate);
        self.validator.validate(&candidate)?;
        self.config = candidate;
        Ok(())
    }

    /// 把当前配置写到指定文件
    pub async fn save_config(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(&self.config)
            .context("Failed to serialize configuration")?;

        tokio::fs::write(path, config_str)
            .await
            .context("Failed to write configuration file")?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }
}

impl ConfigValidator {
    /// 创建新的配置验证器
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "storage.snapshot_path",
                validator: |config| {
                    if config.storage.enabled && config.storage.snapshot_path.trim().is_empty() {
                        Err(anyhow::anyhow!("Snapshot path cannot be empty when storage is enabled"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "logging.level",
                validator: |config| {
                    EnvFilter::try_new(&config.logging.level)
                        .map(|_| ())
                        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", config.logging.level, e))
                },
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    pub fn validate(&self, config: &TriageConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(e.context(format!("Invalid configuration value: {}", rule.field_path)));
            }
        }
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            snapshot_path: "./data/triage-snapshot.json".to_string(),
            autosave: true,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let manager = ConfigManager::from_config(TriageConfig::default()).unwrap();
        let config = manager.config();
        assert_eq!(config.workflow.tie_break, TieBreakPolicy::Lifo);
        assert!(config.storage.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.toml");
        std::fs::write(
            &path,
            "[workflow]\ntie_break = \"fifo\"\n\n[storage]\nsnapshot_path = \"/tmp/desk.json\"\n",
        )
        .unwrap();

        let manager = ConfigManager::new(Some(path.as_path())).unwrap();
        let config = manager.config();
        assert_eq!(config.workflow.tie_break, TieBreakPolicy::Fifo);
        assert_eq!(config.storage.snapshot_path, "/tmp/desk.json");
        // 未出现的字段保持默认值
        assert!(config.storage.autosave);
        assert!(config.monitoring.enabled);
        assert_eq!(manager.config_path(), Some(path.as_path()));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(ConfigManager::new(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_validation_rejects_empty_snapshot_path() {
        let mut config = TriageConfig::default();
        config.storage.snapshot_path = "  ".to_string();
        assert!(ConfigManager::from_config(config.clone()).is_err());

        // 关闭存储时允许为空
        config.storage.enabled = false;
        assert!(ConfigManager::from_config(config).is_ok());
    }

    #[test]
    fn test_update_keeps_old_config_on_failure() {
        let mut manager = ConfigManager::from_config(TriageConfig::default()).unwrap();
        assert!(manager
            .update(|config| config.logging.level = "triage=loud".to_string())
            .is_err());
        assert_eq!(manager.config().logging.level, "info");

        manager
            .update(|config| config.workflow.tie_break = TieBreakPolicy::Fifo)
            .unwrap();
        assert_eq!(manager.config().workflow.tie_break, TieBreakPolicy::Fifo);
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");

        let mut manager = ConfigManager::from_config(TriageConfig::default()).unwrap();
        manager
            .update(|config| {
                config.workflow.tie_break = TieBreakPolicy::Fifo;
                config.logging.ansi = false;
            })
            .unwrap();
        manager.save_config(&path).await.unwrap();

        let reloaded = ConfigManager::new(Some(path.as_path())).unwrap();
        assert_eq!(reloaded.config(), manager.config());
    }
}
