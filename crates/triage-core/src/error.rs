//! 错误定义模块

use thiserror::Error;

/// 分诊系统统一错误类型
#[derive(Error, Debug)]
pub enum TriageError {
    /// 候诊队列中没有患者，调用方应提示后不做任何状态变更
    #[error("候诊队列为空: no patients waiting")]
    EmptyQueue,

    /// 治疗记录为空，没有可撤销的治疗
    #[error("治疗记录为空: nothing to undo")]
    EmptyHistory,

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("快照不一致: {0}")]
    InvalidSnapshot(String),
}

/// 分诊系统统一结果类型
pub type Result<T> = std::result::Result<T, TriageError>;
