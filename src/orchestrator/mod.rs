//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次推进、断点续传和故障决策，是整个管线的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_runner` - 批处理驱动
//! - 管理应用生命周期（初始化、运行、汇总）
//! - 划分批次并逐批推进
//! - 每条结果立即落盘（崩溃最多丢失一条在途记录）
//! - 有界重试 / 致命中止的故障决策
//! - 输出全局统计信息
//!
//! ### `resume` - 断点续传协调
//! - 对照作业状态计算仍需分类的记录子集
//! - 保持原始相对顺序
//!
//! ## 层次关系
//!
//! ```text
//! batch_runner (处理 Vec<Batch>)
//!     ↓
//! resume (过滤已完成记录)
//!     ↓
//! services (能力层：llm_service / result_store / report_writer)
//! ```

pub mod batch_runner;
pub mod resume;

pub use batch_runner::{App, BatchRunner, RunStats};
pub use resume::outstanding;
