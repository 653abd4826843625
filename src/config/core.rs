//! # 配置管理模块 - 核心配置类型

use crate::error::{TierCacheError, TierCacheResult};
use crate::security::IdentifierValidator;
use crate::table::TableSchema;
use crate::types::*;
use rat_logger::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// 双层缓存的完整配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierCacheConfig {
    /// 持久化存储配置
    pub database: DatabaseConfig,
    /// 快速缓存配置
    pub cache: CacheConfig,
    /// `write_chunked` 每个分块的记录数
    pub write_batch_size: usize,
    /// 启动时创建的业务表
    pub tables: Vec<TableSchema>,
    /// 是否把每次操作的性能日志写入持久化存储
    pub performance_log_enabled: bool,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,
    /// 是否输出到控制台
    pub console: bool,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// 错误级别
    Error,
    /// 警告级别
    Warn,
    /// 信息级别
    Info,
    /// 调试级别
    Debug,
    /// 跟踪级别
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> rat_logger::LevelFilter {
        match self {
            LogLevel::Error => rat_logger::LevelFilter::Error,
            LogLevel::Warn => rat_logger::LevelFilter::Warn,
            LogLevel::Info => rat_logger::LevelFilter::Info,
            LogLevel::Debug => rat_logger::LevelFilter::Debug,
            LogLevel::Trace => rat_logger::LevelFilter::Trace,
        }
    }
}

/// 按配置初始化终端日志
///
/// 本库不会自行初始化日志，由调用者决定是否调用
pub fn init_logging(config: &LoggingConfig) -> TierCacheResult<()> {
    use rat_logger::{handler::term::TermConfig, LoggerBuilder};

    if !config.console {
        return Ok(());
    }

    LoggerBuilder::new()
        .add_terminal_with_config(TermConfig::default())
        .with_level(config.level.to_level_filter())
        .init_global_logger()
        .map_err(|e| crate::tier_error!(config, format!("日志初始化失败: {}", e)))
}

impl TierCacheConfig {
    /// 创建配置构建器
    pub fn builder() -> super::builders::TierCacheConfigBuilder {
        super::builders::TierCacheConfigBuilder::new()
    }

    /// 从 TOML 文本解析配置
    pub fn from_toml_str(content: &str) -> TierCacheResult<Self> {
        let config: TierCacheConfig = toml::from_str(content)
            .map_err(|e| crate::tier_error!(config, format!("解析TOML配置失败: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 从配置文件加载配置，按扩展名区分 TOML 与 JSON
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> TierCacheResult<Self> {
        let content = std::fs::read_to_string(config_path.as_ref())?;

        let config = if config_path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            Self::from_toml_str(&content)?
        } else {
            let config: TierCacheConfig = serde_json::from_str(&content)
                .map_err(|e| crate::tier_error!(config, format!("解析JSON配置文件失败: {}", e)))?;
            config.validate()?;
            config
        };

        info!("从文件加载配置: {:?}", config_path.as_ref());
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, config_path: P) -> TierCacheResult<()> {
        let content = if config_path.as_ref().extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::to_string_pretty(self)
                .map_err(|e| crate::tier_error!(config, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::tier_error!(config, format!("序列化JSON配置失败: {}", e)))?
        };

        std::fs::write(config_path.as_ref(), content)?;

        info!("保存配置到文件: {:?}", config_path.as_ref());
        Ok(())
    }

    /// 校验配置的一致性
    pub fn validate(&self) -> TierCacheResult<()> {
        if self.cache.ttl_secs == 0 {
            return Err(crate::tier_error!(config, "缓存TTL不能为零"));
        }
        if self.cache.max_capacity == 0 {
            return Err(crate::tier_error!(config, "缓存容量不能为零"));
        }
        if self.write_batch_size == 0 {
            return Err(crate::tier_error!(config, "批量写入大小不能为零"));
        }
        if self.database.pool.max_connections == 0 {
            return Err(crate::tier_error!(config, "最大连接数不能为零"));
        }
        if self.database.pool.acquire_timeout_secs == 0 {
            return Err(crate::tier_error!(config, "连接获取超时不能为零"));
        }

        let mut names = HashSet::new();
        for table in &self.tables {
            table.validate()?;
            if table.name == PERFORMANCE_LOG_TABLE {
                return Err(crate::tier_error!(
                    config,
                    format!("表名 '{}' 为性能日志保留", table.name)
                ));
            }
            if !names.insert(table.name.as_str()) {
                return Err(crate::tier_error!(config, format!("表 '{}' 重复定义", table.name)));
            }
        }

        for prefix in &self.cache.key_prefixes {
            if prefix.is_empty() {
                return Err(TierCacheError::ConfigError {
                    message: "缓存键前缀不能为空字符串，否则会清空整个缓存".to_string(),
                });
            }
        }

        Ok(())
    }

    /// 按名称查找表结构
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// 校验表名是否为安全标识符
    pub(crate) fn validate_table_name(table: &str) -> TierCacheResult<()> {
        IdentifierValidator::new().validate_table_name(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TOML: &str = r#"
write_batch_size = 50
performance_log_enabled = true

[database.connection]
type = "sqlite"
path = ":memory:"
create_if_missing = true

[database.pool]
max_connections = 4
acquire_timeout_secs = 5
busy_timeout_secs = 20

[cache]
enabled = true
backend = "memory"
ttl_secs = 600
max_capacity = 10000
max_memory_mb = 64
cleanup_interval_secs = 60
key_prefixes = ["demo:"]

[logging]
level = "info"
console = true

[[tables]]
name = "users"

[[tables.columns]]
name = "username"
column_type = "text"
nullable = false
unique = true

[[tables.columns]]
name = "email"
column_type = "text"
nullable = false
"#;

    #[test]
    fn test_parse_toml_config() {
        let config = TierCacheConfig::from_toml_str(SAMPLE_TOML).unwrap();
        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.write_batch_size, 50);
        assert!(config.database.connection.is_memory());
        assert_eq!(config.cache.key_prefixes, vec!["demo:".to_string()]);

        let users = config.table("users").unwrap();
        assert_eq!(users.columns.len(), 2);
        assert!(users.get_column("username").unwrap().unique);
        assert!(!users.get_column("email").unwrap().unique);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let toml = SAMPLE_TOML.replace("ttl_secs = 600", "ttl_secs = 0");
        let err = TierCacheConfig::from_toml_str(&toml).unwrap_err();
        assert!(matches!(err, TierCacheError::ConfigError { .. }));
    }

    #[test]
    fn test_reserved_table_rejected() {
        let toml = SAMPLE_TOML.replace(
            "name = \"users\"",
            &format!("name = \"{}\"", PERFORMANCE_LOG_TABLE),
        );
        let err = TierCacheConfig::from_toml_str(&toml).unwrap_err();
        assert!(matches!(err, TierCacheError::ConfigError { .. }));
        assert!(err.to_string().contains(PERFORMANCE_LOG_TABLE));
    }

    #[test]
    fn test_init_logging_is_repeatable() {
        let quiet = LoggingConfig {
            level: LogLevel::Warn,
            console: false,
        };
        assert!(init_logging(&quiet).is_ok());

        let console = LoggingConfig {
            level: LogLevel::Warn,
            console: true,
        };
        // 重复初始化沿用已安装的全局日志器
        assert!(init_logging(&console).is_ok());
        assert!(init_logging(&console).is_ok());
    }

    #[test]
    fn test_save_and_reload_toml() {
        let config = TierCacheConfig::from_toml_str(SAMPLE_TOML).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiercache.toml");

        config.save_to_file(&path).unwrap();
        let reloaded = TierCacheConfig::from_file(&path).unwrap();
        assert_eq!(reloaded.cache.ttl_secs, config.cache.ttl_secs);
        assert_eq!(reloaded.tables, config.tables);
    }
}
