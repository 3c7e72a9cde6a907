//! 错误类型定义
//!
//! 按故障语义分层：
//! - `ConfigError`：配置无效，启动时即失败，不会发出任何请求
//! - `ClassifyFailure`：单条请求的失败分类（可重试 / 响应格式错误 / 致命）
//! - `StoreError`：结果存储的目录级故障（单个结果文件损坏不在此列，
//!   加载时记录日志并视为未处理）

use thiserror::Error;

/// 配置错误（启动校验阶段产生，任何请求发出之前）
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 批次大小必须为正整数
    #[error("无效的批次大小: {value}（必须 >= 1）")]
    InvalidBatchSize { value: usize },

    /// 请求间隔必须为非负有限数
    #[error("无效的请求间隔: {value} 秒（必须 >= 0）")]
    InvalidRequestDelay { value: f64 },

    /// 分类类别列表为空
    #[error("分类类别列表不能为空")]
    EmptyCategories,

    /// 提示词文件缺失
    #[error("提示词文件不存在: {path}")]
    PromptFileMissing { path: String },

    /// API 密钥缺失（环境变量和密钥文件均未提供）
    #[error("未找到 API 密钥（请设置 LLM_API_KEY 或提供密钥文件 {key_file}）")]
    MissingApiKey { key_file: String },

    /// 密钥文件解析失败
    #[error("密钥文件 {path} 解析失败: {reason}")]
    KeyFileInvalid { path: String, reason: String },
}

/// 单条分类请求的失败类型
///
/// 批处理器根据该类型决定：重试（Transient / Malformed）、
/// 还是中止整个运行（Fatal）。
#[derive(Debug, Error)]
pub enum ClassifyFailure {
    /// 临时故障（网络抖动、限流、5xx），可在同一次运行内重试
    #[error("临时故障（可重试）: {message}")]
    Transient { message: String },

    /// 响应不符合分类结果约定（缺类别、非数值、概率和超出容差），
    /// 重试策略同 Transient，但单独记录日志
    #[error("响应格式错误: {reason}")]
    Malformed { reason: String, raw: String },

    /// 致命故障（认证被拒、配额耗尽），中止整个运行，已保存结果不受影响
    #[error("致命故障（中止运行）: {message}")]
    Fatal { message: String },
}

impl ClassifyFailure {
    pub fn transient(message: impl Into<String>) -> Self {
        ClassifyFailure::Transient {
            message: message.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        ClassifyFailure::Malformed {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        ClassifyFailure::Fatal {
            message: message.into(),
        }
    }

    /// 是否允许在本次运行内重试
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ClassifyFailure::Fatal { .. })
    }
}

/// 结果存储错误（目录级；单文件损坏在加载时降级为警告）
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("无法创建结果目录 {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    #[error("无法读取结果目录 {path}: {source}")]
    ReadDir {
        path: String,
        source: std::io::Error,
    },

    #[error("写入结果临时文件失败 ({dir}): {source}")]
    WriteTemp {
        dir: String,
        source: std::io::Error,
    },

    #[error("结果序列化失败 ({record_id}): {source}")]
    Serialize {
        record_id: String,
        source: serde_json::Error,
    },

    #[error("结果落盘失败 ({path}): {source}")]
    Persist {
        path: String,
        source: tempfile::PersistError,
    },
}

/// 应用程序顶层错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("结果存储错误: {0}")]
    Store(#[from] StoreError),

    #[error("分类中止: {0}")]
    Classify(#[from] ClassifyFailure),
}

/// 应用程序结果类型
pub type AppResult<T> = std::result::Result<T, AppError>;
