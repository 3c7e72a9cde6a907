//! 汇总报告写入 - 业务能力层
//!
//! 把零散的单条结果文件与完整记录集合并成一张 CSV：原始列 +
//! 各类别概率（换算到 0..1）+ FFSI 分值 + 服务附带的额外文本。
//! 未分类的行保留原始数据，结果列留空。

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::record::LsrRecord;
use crate::models::result::JobState;

/// 写出汇总 CSV
pub fn write_report(
    records: &[LsrRecord],
    state: &JobState,
    categories: &[String],
    out_path: impl AsRef<Path>,
) -> Result<()> {
    let out_path = out_path.as_ref();
    let mut writer = csv::Writer::from_path(out_path)
        .with_context(|| format!("无法创建汇总文件: {}", out_path.display()))?;

    let mut header = vec![
        "time",
        "office",
        "local_time",
        "county",
        "location",
        "state",
        "event_type",
        "magnitude",
        "source",
        "lat",
        "lon",
        "remark",
    ]
    .into_iter()
    .map(|c| c.to_string())
    .collect::<Vec<_>>();
    header.extend(categories.iter().cloned());
    header.push("FFSI".to_string());
    header.push("EXTRA".to_string());
    writer.write_record(&header)?;

    let mut classified = 0usize;
    for record in records {
        let report = &record.report;
        let mut row = vec![
            report.time.clone(),
            report.office.clone(),
            report.local_time.clone(),
            report.county.clone(),
            report.location.clone(),
            report.state.clone(),
            report.event_type.clone(),
            report.magnitude.clone(),
            report.source.clone(),
            report.lat.clone(),
            report.lon.clone(),
            report.remark.clone(),
        ];

        match state.get(&record.id) {
            Some(result) => {
                for category in categories {
                    let percent = result.probabilities.get(category).copied().unwrap_or(0.0);
                    row.push(format!("{:.4}", percent / 100.0));
                }
                row.push(format!("{:.4}", result.ffsi_score));
                row.push(result.extra.clone());
                classified += 1;
            }
            None => {
                // 未分类：结果列留空
                row.extend(std::iter::repeat(String::new()).take(categories.len() + 2));
            }
        }
        writer.write_record(&row)?;
    }

    writer
        .flush()
        .with_context(|| format!("写入汇总文件失败: {}", out_path.display()))?;

    info!(
        "📄 汇总报告已写出: {}（{}/{} 条已分类）",
        out_path.display(),
        classified,
        records.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::Utc;
    use tempfile::TempDir;

    use crate::config::FFSI_CATEGORIES;
    use crate::models::record::LsrReport;
    use crate::models::result::ClassificationResult;

    fn categories() -> Vec<String> {
        FFSI_CATEGORIES.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_report_mixes_classified_and_unclassified_rows() {
        let dir = TempDir::new().unwrap();
        let out_path = dir.path().join("classified.csv");

        let records = vec![
            LsrRecord::new(0, LsrReport::from_remark("street flooding downtown")),
            LsrRecord::new(1, LsrReport::from_remark("river rescue in progress")),
        ];

        let mut probabilities = BTreeMap::new();
        probabilities.insert("MINOR".to_string(), 80.0);
        probabilities.insert("MODERATE".to_string(), 20.0);
        probabilities.insert("SERIOUS".to_string(), 0.0);
        probabilities.insert("SEVERE".to_string(), 0.0);
        probabilities.insert("CATASTROPHIC".to_string(), 0.0);

        let mut state = JobState::new();
        state.insert(
            records[0].id.clone(),
            ClassificationResult {
                record_id: records[0].id.clone(),
                probabilities,
                ffsi_score: 1.2,
                extra: "nuisance flooding".to_string(),
                raw_response: String::new(),
                timestamp: Utc::now(),
            },
        );

        write_report(&records, &state, &categories(), &out_path).unwrap();

        let content = std::fs::read_to_string(&out_path).unwrap();
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("MINOR"));
        assert!(header.ends_with("FFSI,EXTRA"));

        let first = lines.next().unwrap();
        assert!(first.contains("0.8000"));
        assert!(first.contains("1.2000"));
        assert!(first.contains("nuisance flooding"));

        // 第二行未分类，结果列为空
        let second = lines.next().unwrap();
        assert!(second.contains("river rescue in progress"));
        assert!(second.ends_with(",,,,,,,"));
    }
}
