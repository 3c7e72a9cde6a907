//! 断点续传协调
//!
//! 给定一组记录和当前作业状态，计算仍需分类的子集。
//! 这是中断后重跑不重复请求的全部机制：崩溃后重跑会重新推导出
//! 同样的"未处理集合"，已有有效结果的记录绝不会再次提交。

use crate::models::record::LsrRecord;
use crate::models::result::JobState;

/// 计算仍需分类的记录（保持原始相对顺序）
///
/// 结果存储在加载时已过滤无效条目，因此"在 `job_state` 中存在"
/// 等价于"已有有效结果"；无效或损坏的历史结果自然落在返回集合里。
pub fn outstanding<'a>(records: &'a [LsrRecord], job_state: &JobState) -> Vec<&'a LsrRecord> {
    records
        .iter()
        .filter(|record| !job_state.contains_key(&record.id))
        .collect()
}
