//! 单发分类路径
//!
//! 面向交互 / 小规模验证场景：对一条 remark 立即发起一次分类请求，
//! 直接返回结果。
//!
//! **已知且有意保留的限制**：本路径没有批处理管线的任何保护——
//! 不重试、不落盘、不支持断点续传。任何失败（包括响应格式错误）
//! 都会立即、大声地返回错误，而不是静默降级。需要这些保护时
//! 请走 [`crate::orchestrator::App`] 的批处理管线。

use anyhow::{Context, Result};

use crate::config::Config;
use crate::models::record::identify;
use crate::models::result::ClassificationResult;
use crate::services::llm_service::{Classifier, ClassifyOutcome, LlmService};

/// 对单条 remark 立即分类（无重试 / 无持久化）
pub async fn classify_once(remark: &str, prompt: &str, config: &Config) -> Result<ClassificationResult> {
    if remark.trim().is_empty() {
        anyhow::bail!("remark 为空，无法分类");
    }

    let api_key = config.resolve_api_key()?;
    let mut service = LlmService::new(config, api_key);

    let outcome = service
        .classify(&identify(remark), remark, prompt)
        .await
        .context("单发分类失败")?;

    match outcome {
        ClassifyOutcome::Classified(result) => Ok(result),
        // 空 remark 已在入口拒绝，到这里属于逻辑矛盾
        ClassifyOutcome::EmptyRemark => anyhow::bail!("remark 为空，无法分类"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_remark_fails_loudly() {
        let config = Config::default();
        assert!(classify_once("   ", "prompt", &config).await.is_err());
    }

    /// 真实服务的单发分类（需要有效密钥）
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=sk-... cargo test test_live_classify_once -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_classify_once() {
        let config = Config::from_env();
        let prompt = "You classify flash flood reports into MINOR, MODERATE, SERIOUS, SEVERE, \
                      CATASTROPHIC. Reply with a JSON object mapping each category to a \
                      percentage; the percentages must sum to 100.";

        let result = classify_once("TWO FEET OF WATER IN HOMES NEAR THE CREEK.", prompt, &config)
            .await
            .expect("单发分类失败");

        println!("概率: {:?}", result.probabilities);
        assert!(result.is_valid());
    }
}
