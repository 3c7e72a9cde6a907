//! LSR 记录与内容寻址标识
//!
//! 一条 LSR（Local Storm Report）在加载时计算一次 [`RecordId`]，
//! 此后不再变化。标识只依赖 remark 文本本身，与行号等元数据无关，
//! 因此同一条 remark 在任何一次运行中都会得到同一个标识——
//! 断点续传的正确性建立在这一点上。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 记录的内容寻址标识（remark 文本的 blake3 十六进制摘要）
///
/// 哈希算法固定为 blake3：跨进程、跨平台稳定，空文本映射到
/// 空串的固定摘要。该标识是不透明字符串，结果存储恰好用它做
/// 文件名，但这只是实现细节。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 计算记录标识（纯函数，无错误路径）
pub fn identify(text: &str) -> RecordId {
    RecordId(blake3::hash(text.as_bytes()).to_hex().to_string())
}

/// IBW 格式 LSR CSV 的一行原始数据
///
/// `magnitude` 字段对应专家标注的 IBW 类别
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LsrReport {
    pub time: String,
    pub office: String,
    pub local_time: String,
    pub county: String,
    pub location: String,
    pub state: String,
    pub event_type: String,
    pub magnitude: String,
    pub source: String,
    pub lat: String,
    pub lon: String,
    pub remark: String,
}

impl LsrReport {
    /// 仅带 remark 的临时报告（单发分类等场景）
    pub fn from_remark(remark: impl Into<String>) -> Self {
        Self {
            time: String::new(),
            office: String::new(),
            local_time: String::new(),
            county: String::new(),
            location: String::new(),
            state: String::new(),
            event_type: String::new(),
            magnitude: String::new(),
            source: String::new(),
            lat: String::new(),
            lon: String::new(),
            remark: remark.into(),
        }
    }
}

/// 一条待分类的 LSR 记录：原始行 + 来源行号 + 缓存的标识
#[derive(Debug, Clone)]
pub struct LsrRecord {
    /// 来源行号（从 0 开始，不含表头行）
    pub row: usize,
    /// 内容寻址标识（加载时计算一次）
    pub id: RecordId,
    pub report: LsrReport,
}

impl LsrRecord {
    pub fn new(row: usize, report: LsrReport) -> Self {
        let id = identify(&report.remark);
        Self { row, id, report }
    }

    pub fn remark(&self) -> &str {
        &self.report.remark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_is_deterministic() {
        let text = "FLASH FLOODING CLOSED HIGHWAY 12 NEAR TOWN CENTER.";
        assert_eq!(identify(text), identify(text));
    }

    #[test]
    fn test_identify_distinguishes_texts() {
        assert_ne!(identify("water over road"), identify("water over bridge"));
    }

    #[test]
    fn test_identify_empty_text_is_fixed() {
        // blake3 空输入的已知摘要
        assert_eq!(
            identify("").as_str(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_identify_ignores_metadata() {
        let report_a = LsrReport {
            office: "OUN".to_string(),
            ..LsrReport::from_remark("creek out of banks")
        };
        let report_b = LsrReport {
            office: "FWD".to_string(),
            ..LsrReport::from_remark("creek out of banks")
        };
        // 元数据不同、文本相同 → 标识相同
        assert_eq!(
            LsrRecord::new(0, report_a).id,
            LsrRecord::new(42, report_b).id
        );
    }
}
