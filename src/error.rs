//! 错误处理模块
//!
//! 定义双层缓存的统一错误类型。读写接口对瞬时故障只记录日志并吸收，
//! 带 `try_` 前缀的接口则返回这里定义的具体错误类别。

use thiserror::Error;

/// rat_tiercache 错误类型
#[derive(Error, Debug)]
pub enum TierCacheError {
    /// 缓存或持久化存储无法连接（启动阶段为致命错误）
    #[error("连接失败: {message}")]
    ConnectionError { message: String },

    /// 违反表级唯一性约束
    #[error("唯一性约束冲突: {table}.{column} = {value}")]
    ConstraintViolation {
        table: String,
        column: String,
        value: String,
    },

    /// 持久化存储执行失败
    #[error("查询执行失败: {message}")]
    QueryError { message: String },

    /// 缓存操作失败
    #[error("缓存操作失败: {message}")]
    CacheError { message: String },

    /// 数据序列化失败
    #[error("数据序列化失败: {message}")]
    SerializationError { message: String },

    /// 输入校验失败
    #[error("验证失败: {field} - {message}")]
    ValidationError { field: String, message: String },

    /// 配置错误
    #[error("配置错误: {message}")]
    ConfigError { message: String },

    /// IO 错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),
}

/// rat_tiercache 结果类型
pub type TierCacheResult<T> = Result<T, TierCacheError>;

impl TierCacheError {
    /// 是否为可吸收的瞬时故障
    ///
    /// 约束冲突、校验失败和配置错误不属于瞬时故障
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TierCacheError::QueryError { .. }
                | TierCacheError::CacheError { .. }
                | TierCacheError::SerializationError { .. }
                | TierCacheError::IoError(_)
        )
    }

    /// 是否为唯一性约束冲突
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, TierCacheError::ConstraintViolation { .. })
    }
}

impl From<serde_json::Error> for TierCacheError {
    fn from(err: serde_json::Error) -> Self {
        TierCacheError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<sqlx::Error> for TierCacheError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => TierCacheError::ConnectionError {
                message: err.to_string(),
            },
            sqlx::Error::Io(io) => TierCacheError::IoError(io),
            other => TierCacheError::QueryError {
                message: other.to_string(),
            },
        }
    }
}

/// 快速构造错误的便捷宏
#[macro_export]
macro_rules! tier_error {
    (connection, $msg:expr) => {
        $crate::error::TierCacheError::ConnectionError {
            message: $msg.to_string(),
        }
    };
    (query, $msg:expr) => {
        $crate::error::TierCacheError::QueryError {
            message: $msg.to_string(),
        }
    };
    (cache, $msg:expr) => {
        $crate::error::TierCacheError::CacheError {
            message: $msg.to_string(),
        }
    };
    (serialization, $msg:expr) => {
        $crate::error::TierCacheError::SerializationError {
            message: $msg.to_string(),
        }
    };
    (validation, $field:expr, $msg:expr) => {
        $crate::error::TierCacheError::ValidationError {
            field: $field.to_string(),
            message: $msg.to_string(),
        }
    };
    (config, $msg:expr) => {
        $crate::error::TierCacheError::ConfigError {
            message: $msg.to_string(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = tier_error!(query, "database is locked");
        assert!(err.is_transient());
        assert!(!err.is_constraint_violation());

        let err = TierCacheError::ConstraintViolation {
            table: "users".to_string(),
            column: "username".to_string(),
            value: "alice".to_string(),
        };
        assert!(err.is_constraint_violation());
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "唯一性约束冲突: users.username = alice");
    }

    #[test]
    fn test_sqlx_pool_timeout_maps_to_connection() {
        let err: TierCacheError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, TierCacheError::ConnectionError { .. }));
    }
}
