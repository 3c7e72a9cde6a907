//! 批次划分
//!
//! 把有序的记录序列切成固定大小的批次，保持原始顺序，
//! 每条记录恰好出现在一个批次中，最后一批允许不满。

use crate::error::ConfigError;
use crate::models::record::LsrRecord;

/// 一个批次：批次编号 + 本批记录（原始顺序）
#[derive(Debug, Clone)]
pub struct Batch {
    /// 批次编号（从 0 开始）
    pub index: usize,
    pub records: Vec<LsrRecord>,
}

/// 按固定大小划分批次
///
/// `size == 0` 视为无效配置。划分不改变记录顺序，
/// 所有批次拼接起来等于输入本身。
pub fn split_batches(records: Vec<LsrRecord>, size: usize) -> Result<Vec<Batch>, ConfigError> {
    if size == 0 {
        return Err(ConfigError::InvalidBatchSize { value: size });
    }

    let mut batches = Vec::with_capacity(records.len().div_ceil(size));
    let mut current = Vec::with_capacity(size);

    for record in records {
        current.push(record);
        if current.len() == size {
            batches.push(Batch {
                index: batches.len(),
                records: std::mem::take(&mut current),
            });
        }
    }
    if !current.is_empty() {
        batches.push(Batch {
            index: batches.len(),
            records: current,
        });
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::LsrReport;

    fn records(remarks: &[&str]) -> Vec<LsrRecord> {
        remarks
            .iter()
            .enumerate()
            .map(|(row, remark)| LsrRecord::new(row, LsrReport::from_remark(*remark)))
            .collect()
    }

    #[test]
    fn test_three_records_batch_size_two() {
        let batches = split_batches(records(&["r1", "r2", "r3"]), 2).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].index, 0);
        assert_eq!(batches[0].records.len(), 2);
        assert_eq!(batches[1].index, 1);
        assert_eq!(batches[1].records.len(), 1);
        assert_eq!(batches[1].records[0].remark(), "r3");
    }

    #[test]
    fn test_partition_preserves_order_and_covers_all() {
        let input = records(&["a", "b", "c", "d", "e", "f", "g"]);
        let rows: Vec<usize> = input.iter().map(|r| r.row).collect();

        let batches = split_batches(input, 3).unwrap();
        let flattened: Vec<usize> = batches
            .iter()
            .flat_map(|b| b.records.iter().map(|r| r.row))
            .collect();

        // 拼接结果与输入完全一致：不重复、不丢失、不乱序
        assert_eq!(flattened, rows);
    }

    #[test]
    fn test_exact_multiple_has_no_partial_batch() {
        let batches = split_batches(records(&["a", "b", "c", "d"]), 2).unwrap();
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.records.len() == 2));
    }

    #[test]
    fn test_empty_input_yields_no_batches() {
        let batches = split_batches(Vec::new(), 5).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn test_zero_size_is_invalid_configuration() {
        let result = split_batches(records(&["a"]), 0);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidBatchSize { value: 0 })
        ));
    }
}
