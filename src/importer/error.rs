// ==========================================
// 商品目录导入系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 任一错误都终止整批导入，不做自动重试
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件读取失败 ({path}): {message}")]
    LoadFailure { path: String, message: String },

    #[error("JSON 解析失败: {0}")]
    ParseFailure(String),

    // ===== 结构校验错误 =====
    #[error("记录格式错误 (第 {position} 条): {message}")]
    MalformedRecord { position: usize, message: String },

    // ===== 对账错误 =====
    #[error("外部标识重复: eId={external_id}")]
    DuplicateExternalId { external_id: i64 },

    // ===== 字段约束错误 =====
    // 原样输出首个违规
    #[error("{field}: {message}")]
    ValidationFailed { field: String, message: String },

    // ===== 存储错误 =====
    #[error("持久化失败: {0}")]
    Persistence(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::ParseFailure(err.to_string())
    }
}

impl ImportError {
    /// 是否为输入数据问题（而非存储/内部问题）
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ImportError::LoadFailure { .. }
                | ImportError::ParseFailure(_)
                | ImportError::MalformedRecord { .. }
                | ImportError::DuplicateExternalId { .. }
                | ImportError::ValidationFailed { .. }
        )
    }
}
