//! 分类结果与作业状态
//!
//! [`ClassificationResult`] 写入结果存储后不再改写；一条记录一旦
//! 拥有有效结果即视为最终结果，重跑管线不得再次请求。

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::record::RecordId;

/// 概率和相对 100 的容差（百分点）
///
/// LLM 返回的各类别百分比之和允许的偏差，超出即视为响应格式错误。
pub const PROB_SUM_TOLERANCE: f64 = 1.0;

/// 一条 LSR 的分类结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub record_id: RecordId,
    /// 类别 → 百分比（0..=100）
    pub probabilities: BTreeMap<String, f64>,
    /// FFSI 分值（1..=5 的加权期望）
    pub ffsi_score: f64,
    /// 服务在 JSON 对象之外附带的自由文本
    pub extra: String,
    /// 服务返回的原始文本，便于人工排查
    pub raw_response: String,
    pub timestamp: DateTime<Utc>,
}

impl ClassificationResult {
    /// 结果是否有效：各类别百分比之和在 100 ± 容差之内
    ///
    /// 无效结果在加载时视为不存在，对应记录保持未处理状态。
    pub fn is_valid(&self) -> bool {
        if self.probabilities.is_empty() {
            return false;
        }
        let sum: f64 = self.probabilities.values().sum();
        (sum - 100.0).abs() <= PROB_SUM_TOLERANCE
    }
}

/// 作业状态：当前已持久化的全部有效结果
///
/// 运行开始时从结果存储加载，每保存一条结果即同步更新，
/// 批处理器据此在每个批次前计算仍需分类的记录。
pub type JobState = HashMap<RecordId, ClassificationResult>;

/// 由类别概率计算 FFSI 分值
///
/// 类别按档位顺序传入（MINOR=1 … CATASTROPHIC=5），
/// 分值为 Σ pᵢ/100 · (i+1)，落在 1..=5 区间。
pub fn ffsi_score(probabilities: &BTreeMap<String, f64>, categories: &[String]) -> f64 {
    categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            probabilities.get(category).copied().unwrap_or(0.0) / 100.0 * (i + 1) as f64
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FFSI_CATEGORIES;
    use crate::models::record::identify;

    fn categories() -> Vec<String> {
        FFSI_CATEGORIES.iter().map(|c| c.to_string()).collect()
    }

    fn result_with_probs(pairs: &[(&str, f64)]) -> ClassificationResult {
        ClassificationResult {
            record_id: identify("test remark"),
            probabilities: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ffsi_score: 0.0,
            extra: String::new(),
            raw_response: String::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_sum_99_within_tolerance_is_valid() {
        let result = result_with_probs(&[
            ("MINOR", 20.0),
            ("MODERATE", 30.0),
            ("SERIOUS", 25.0),
            ("SEVERE", 15.0),
            ("CATASTROPHIC", 9.0),
        ]);
        assert!(result.is_valid());
    }

    #[test]
    fn test_sum_70_is_invalid() {
        let result = result_with_probs(&[
            ("MINOR", 20.0),
            ("MODERATE", 30.0),
            ("SERIOUS", 20.0),
            ("SEVERE", 0.0),
            ("CATASTROPHIC", 0.0),
        ]);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_empty_probabilities_invalid() {
        let result = result_with_probs(&[]);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_ffsi_score_all_minor_is_one() {
        let result = result_with_probs(&[("MINOR", 100.0)]);
        let score = ffsi_score(&result.probabilities, &categories());
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ffsi_score_weighted() {
        // 50% MINOR + 50% CATASTROPHIC → (0.5·1 + 0.5·5) = 3.0
        let result = result_with_probs(&[("MINOR", 50.0), ("CATASTROPHIC", 50.0)]);
        let score = ffsi_score(&result.probabilities, &categories());
        assert!((score - 3.0).abs() < 1e-9);
    }
}
