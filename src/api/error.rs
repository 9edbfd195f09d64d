// ==========================================
// 货运运力撮合系统 - API层错误类型
// ==========================================
// 职责: 定义业务错误分类,转换Repository错误为用户可解释的错误
// 约定: 所有错误信息必须包含显式原因 (哪个ID、哪条限额)
// ==========================================

use crate::engine::status_validator::InvalidTransition;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
///
/// 分类:
/// - NotFound: 引用的货载/竞价/预订/承运商不存在
/// - InvalidStatusTransition: 状态机规则违反 (含"每货载至多一个被接受竞价")
/// - InsufficientCapacity: 请求车辆数超出可用运力 (货载层或台账层)
/// - VersionConflict: 货载 version 过期,唯一建议调用方重试的错误
/// - ValidationError: 输入不合法
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效的状态流转: {0}")]
    InvalidStatusTransition(String),

    #[error("运力不足: {context} (请求: {requested}, 可用: {available})")]
    InsufficientCapacity {
        context: String,
        requested: i32,
        available: i32,
    },

    #[error("无效输入: {0}")]
    ValidationError(String),

    // ==========================================
    // 并发控制错误
    // ==========================================
    #[error("版本冲突: {0}")]
    VersionConflict(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户可解释的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 并发控制错误: 调用方应重试整个操作
            RepositoryError::OptimisticLockFailure {
                load_id,
                expected,
                actual,
            } => ApiError::VersionConflict(format!(
                "货载{}已被其他事务修改(期望version={},实际version={}),请重试",
                load_id, expected, actual
            )),

            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ValidationError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ValidationError(format!("外键约束违反: {}", msg))
            }

            // 通用错误
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// 状态机守卫错误直接映射为状态流转错误
impl From<InvalidTransition> for ApiError {
    fn from(err: InvalidTransition) -> Self {
        ApiError::InvalidStatusTransition(err.0)
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        // NotFound错误转换
        let repo_err = RepositoryError::NotFound {
            entity: "Load".to_string(),
            id: "L001".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Load"));
                assert!(msg.contains("L001"));
            }
            _ => panic!("Expected NotFound"),
        }

        // OptimisticLockFailure转换为版本冲突
        let repo_err = RepositoryError::OptimisticLockFailure {
            load_id: "L001".to_string(),
            expected: 1,
            actual: 2,
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::VersionConflict(msg) => {
                assert!(msg.contains("L001"));
                assert!(msg.contains("请重试"));
            }
            _ => panic!("Expected VersionConflict"),
        }
    }

    #[test]
    fn test_invalid_transition_conversion() {
        let err = InvalidTransition("货载状态为 BOOKED 时禁止竞价".to_string());
        let api_err: ApiError = err.into();
        match api_err {
            ApiError::InvalidStatusTransition(msg) => assert!(msg.contains("BOOKED")),
            _ => panic!("Expected InvalidStatusTransition"),
        }
    }
}
