//! 提示词加载
//!
//! FFSI 定义以纯文本形式存放，整体作为系统消息发送给分类服务。

use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs;

/// 读取 FFSI 定义提示词文件
pub async fn load_prompt(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取提示词文件: {}", path.display()))?;

    if content.trim().is_empty() {
        anyhow::bail!("提示词文件为空: {}", path.display());
    }

    Ok(content)
}
