//! 从 CSV 文件加载 LSR 记录
//!
//! 读取 IBW 格式的 LSR CSV（12 列，带表头行，按列位置取值），
//! 每行转换为一条 [`LsrRecord`] 并在此时计算好内容标识。

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::record::{LsrRecord, LsrReport};

/// IBW 格式的列顺序（表头行被跳过，按位置解析）
const COLUMNS: usize = 12;

/// 加载 IBW 格式的 LSR CSV 文件
pub fn load_ibw_lsrs(path: impl AsRef<Path>) -> Result<Vec<LsrRecord>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("无法读取 LSR 文件: {}", path.display()))?;

    let mut records = Vec::new();
    for (row, entry) in reader.records().enumerate() {
        let entry = entry.with_context(|| format!("LSR 文件第 {} 行解析失败", row + 2))?;

        let field = |i: usize| entry.get(i).unwrap_or("").trim().to_string();
        if entry.len() < COLUMNS {
            debug!("第 {} 行只有 {} 列（期望 {}），缺失列按空值处理", row + 2, entry.len(), COLUMNS);
        }

        let report = LsrReport {
            time: field(0),
            office: field(1),
            local_time: field(2),
            county: field(3),
            location: field(4),
            state: field(5),
            event_type: field(6),
            magnitude: field(7),
            source: field(8),
            lat: field(9),
            lon: field(10),
            remark: field(11),
        };
        records.push(LsrRecord::new(row, report));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
time,office,local_time,county,location,state,event_type,magnitude,source,lat,lon,remark
2023-06-01 18:30,OUN,2023-06-01 13:30,Cleveland,Norman,OK,Flash Flood,MODERATE,Trained Spotter,35.22,-97.44,WATER OVER ROADWAY AT MAIN AND PORTER.
2023-06-01 19:05,OUN,2023-06-01 14:05,McClain,Blanchard,OK,Flash Flood,SERIOUS,Emergency Mngr,35.14,-97.65,SEVERAL VEHICLES STRANDED IN HIGH WATER.
";

    #[test]
    fn test_load_ibw_csv() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lsrs.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let records = load_ibw_lsrs(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row, 0);
        assert_eq!(records[0].report.office, "OUN");
        assert_eq!(
            records[0].remark(),
            "WATER OVER ROADWAY AT MAIN AND PORTER."
        );
        assert_eq!(records[1].row, 1);
        // 标识在加载时已缓存
        assert_eq!(records[1].id, crate::models::record::identify(records[1].remark()));
    }

    #[test]
    fn test_missing_trailing_columns_become_empty_remark() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("short.csv");
        std::fs::write(
            &path,
            "time,office,local_time,county,location,state,event_type,magnitude,source,lat,lon,remark\n\
             2023-06-01 18:30,OUN,2023-06-01 13:30,Cleveland,Norman,OK,Flash Flood,MINOR,Public,35.2,-97.4\n",
        )
        .unwrap();

        let records = load_ibw_lsrs(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].remark(), "");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_ibw_lsrs("/nonexistent/lsrs.csv").is_err());
    }
}
