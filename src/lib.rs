//! # LSR Classify
//!
//! 一个可断点续传、遵守请求频率限制的 LSR（Local Storm Report）
//! 批量分类管线：把 LSR 的 remark 文本逐条提交给外部分类服务，
//! 得到 FFSI（Flash Flood Severity Index）各严重度类别的概率分布。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据层（Models）
//! - `models/record` - LSR 记录与内容寻址标识（blake3）
//! - `models/result` - 分类结果、有效性校验、FFSI 分值
//! - `models/batch` - 批次划分（保序、不重不漏）
//! - `models/loaders` - CSV / 提示词加载
//!
//! ### ② 业务能力层（Services）
//! - `services/llm_service` - 带请求节流的分类能力（Paced Client）
//! - `services/result_store` - 单条结果的原子持久化与加载
//! - `services/report_writer` - 结果汇总 CSV
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_runner` - 批处理驱动，逐批推进 + 故障决策
//! - `orchestrator/resume` - 断点续传：计算仍需分类的记录
//!
//! ### 单发路径
//! - `oneshot` - 交互用的立即分类，刻意不带重试 / 续传保护
//!
//! ## 中断与恢复
//!
//! 进程可以在任意时刻被终止（Ctrl-C / 崩溃），这是设计内的正常
//! 场景：每条结果在下一次请求发出前就已原子落盘，重跑时按内容
//! 标识对账，已有有效结果的记录不会再次请求。

pub mod config;
pub mod error;
pub mod models;
pub mod oneshot;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ClassifyFailure, ConfigError, StoreError};
pub use models::{
    identify, split_batches, Batch, ClassificationResult, JobState, LsrRecord, LsrReport, RecordId,
};
pub use orchestrator::{App, BatchRunner, RunStats};
pub use services::{Classifier, ClassifyOutcome, LlmService, ResultStore};
