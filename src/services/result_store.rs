//! 结果存储 - 业务能力层
//!
//! 每条分类结果以 `<record_id>.json` 的形式持久化在结果目录下，
//! 人类可直接查看。写入按单条结果原子化：先写同目录下的临时文件，
//! 再原子替换到最终路径，崩溃时磁盘上不会出现"看起来已保存、
//! 内容却不完整"的最终文件。
//!
//! 加载时单个文件损坏（JSON 不完整、概率和超出容差）只记录警告
//! 并视为不存在——对应记录保持未处理状态，不会拖垮整次加载。

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::result::{ClassificationResult, JobState};

/// 结果存储
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    /// 打开（必要时创建）结果目录
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::CreateDir {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 加载全部已持久化的有效结果
    ///
    /// 首次运行（目录为空）返回空状态。只有通过有效性校验的结果
    /// 才进入 [`JobState`]，因此"存在即有效"。
    pub fn load(&self) -> Result<JobState, StoreError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| StoreError::ReadDir {
            path: self.dir.display().to_string(),
            source,
        })?;

        let mut state = JobState::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::ReadDir {
                path: self.dir.display().to_string(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("⚠️ 无法读取结果文件 {}，视为未处理: {}", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_str::<ClassificationResult>(&content) {
                Ok(result) if result.is_valid() => {
                    state.insert(result.record_id.clone(), result);
                }
                Ok(result) => {
                    warn!(
                        "⚠️ 结果文件 {} 概率和超出容差，视为未处理",
                        path.display()
                    );
                    debug!("无效结果: {:?}", result.probabilities);
                }
                Err(e) => {
                    warn!("⚠️ 结果文件 {} 损坏，视为未处理: {}", path.display(), e);
                }
            }
        }

        debug!("从 {} 加载了 {} 条有效结果", self.dir.display(), state.len());
        Ok(state)
    }

    /// 原子化保存一条结果（按 record_id 覆盖）
    pub fn save(&self, result: &ClassificationResult) -> Result<(), StoreError> {
        let final_path = self.dir.join(format!("{}.json", result.record_id));

        let json = serde_json::to_string_pretty(result).map_err(|source| {
            StoreError::Serialize {
                record_id: result.record_id.to_string(),
                source,
            }
        })?;

        // 临时文件必须与最终路径同目录，替换才是原子操作
        let mut temp = NamedTempFile::new_in(&self.dir).map_err(|source| StoreError::WriteTemp {
            dir: self.dir.display().to_string(),
            source,
        })?;
        temp.write_all(json.as_bytes())
            .and_then(|_| temp.flush())
            .map_err(|source| StoreError::WriteTemp {
                dir: self.dir.display().to_string(),
                source,
            })?;
        temp.persist(&final_path).map_err(|source| StoreError::Persist {
            path: final_path.display().to_string(),
            source,
        })?;

        debug!("结果已保存: {}", final_path.display());
        Ok(())
    }
}
