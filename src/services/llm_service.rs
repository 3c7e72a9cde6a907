//! LLM 分类服务 - 业务能力层
//!
//! 只负责"把一条 remark 发给分类服务并解析结果"这一件事，
//! 不关心批次、重试和断点续传（那些是编排层的职责）。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型（兼容 OpenAI API 的服务）
//!
//! ## 请求节流
//! 每次请求发出之前，强制等待距上一次请求**完成**至少
//! `request_delay_secs` 秒——同一时刻最多一个在途请求，
//! 以遵守服务端的请求频率限制。

use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use regex::Regex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ClassifyFailure;
use crate::models::record::RecordId;
use crate::models::result::{ffsi_score, ClassificationResult, PROB_SUM_TOLERANCE};
use crate::utils::logging::truncate_text;

/// 单条分类的结果
#[derive(Debug)]
pub enum ClassifyOutcome {
    /// 成功得到有效分类
    Classified(ClassificationResult),
    /// remark 为空，未发出请求，也不产生可持久化的结果
    EmptyRemark,
}

/// 分类能力的抽象：批处理器只依赖这一个接口
///
/// 生产实现是 [`LlmService`]；管线测试用脚本化实现替代，
/// 以便在无网络环境下验证重试与断点续传语义。
#[allow(async_fn_in_trait)]
pub trait Classifier {
    async fn classify(
        &mut self,
        id: &RecordId,
        remark: &str,
        prompt: &str,
    ) -> Result<ClassifyOutcome, ClassifyFailure>;
}

/// LLM 分类服务
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    categories: Vec<String>,
    request_delay: Duration,
    /// 上一次请求完成的时刻（成功或失败均计入）
    last_request: Option<Instant>,
}

impl LlmService {
    /// 创建新的 LLM 分类服务
    pub fn new(config: &Config, api_key: String) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            categories: config.categories.clone(),
            request_delay: Duration::from_secs_f64(config.request_delay_secs),
            last_request: None,
        }
    }

    /// 若距上一次请求完成不足最小间隔，补足等待
    async fn enforce_pacing(&self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.request_delay {
                let wait = self.request_delay - elapsed;
                info!("⏳ 等待 {:.1} 秒以遵守请求频率限制...", wait.as_secs_f64());
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// 解析服务响应为分类结果
    ///
    /// 响应中第一个 `{...}` 块按 JSON 解析为各类别的百分比；
    /// 块之外的文本保留为 `extra`。类别键不完全匹配、数值缺失、
    /// 或概率和超出 100 ± 容差，均视为响应格式错误。
    fn parse_classification(
        &self,
        id: &RecordId,
        raw: &str,
    ) -> Result<ClassificationResult, ClassifyFailure> {
        let matched = json_block_regex()
            .find(raw)
            .ok_or_else(|| ClassifyFailure::malformed("响应中未找到 JSON 对象", raw))?;

        let probabilities: BTreeMap<String, f64> = serde_json::from_str(matched.as_str())
            .map_err(|e| ClassifyFailure::malformed(format!("JSON 解析失败: {}", e), raw))?;

        // 类别键必须与配置的类别完全一致（不多不少）
        for category in &self.categories {
            if !probabilities.contains_key(category) {
                return Err(ClassifyFailure::malformed(
                    format!("缺少类别 {}", category),
                    raw,
                ));
            }
        }
        for key in probabilities.keys() {
            if !self.categories.iter().any(|c| c == key) {
                return Err(ClassifyFailure::malformed(
                    format!("出现未知类别 {}", key),
                    raw,
                ));
            }
        }

        let sum: f64 = probabilities.values().sum();
        if (sum - 100.0).abs() > PROB_SUM_TOLERANCE {
            return Err(ClassifyFailure::malformed(
                format!("概率和为 {:.1}，超出 100 ± {} 容差", sum, PROB_SUM_TOLERANCE),
                raw,
            ));
        }

        let extra = raw[matched.end()..].trim().to_string();
        let score = ffsi_score(&probabilities, &self.categories);

        Ok(ClassificationResult {
            record_id: id.clone(),
            probabilities,
            ffsi_score: score,
            extra,
            raw_response: raw.to_string(),
            timestamp: chrono::Utc::now(),
        })
    }
}

impl Classifier for LlmService {
    async fn classify(
        &mut self,
        id: &RecordId,
        remark: &str,
        prompt: &str,
    ) -> Result<ClassifyOutcome, ClassifyFailure> {
        // 空 remark：不请求、不节流、不产生结果
        if remark.trim().is_empty() {
            debug!("remark 为空，跳过请求: {}", id);
            return Ok(ClassifyOutcome::EmptyRemark);
        }

        self.enforce_pacing().await;

        debug!(
            "发送分类请求，模型: {}，remark: {}",
            self.model_name,
            truncate_text(remark, 80)
        );

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(classify_openai_error)?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(remark)
            .build()
            .map_err(classify_openai_error)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            // 分类任务要求确定性输出
            .temperature(0.0)
            .build()
            .map_err(classify_openai_error)?;

        let response = self.client.chat().create(request).await;
        self.last_request = Some(Instant::now());
        let response = response.map_err(classify_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| ClassifyFailure::malformed("服务返回内容为空", ""))?;

        debug!("收到响应: {}", truncate_text(&content, 120));

        let result = self.parse_classification(id, &content)?;
        Ok(ClassifyOutcome::Classified(result))
    }
}

/// 匹配响应中第一个 `{...}` 块的正则，全局只编译一次
fn json_block_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*?\}").expect("正则模式为常量，编译不会失败"))
}

/// 把 `async-openai` 的错误映射到失败分类
///
/// 认证被拒和配额耗尽无法通过重试恢复，视为致命；
/// 其余（网络抖动、限流、5xx）视为临时故障。
fn classify_openai_error(err: OpenAIError) -> ClassifyFailure {
    match err {
        OpenAIError::ApiError(api) => {
            let code = api.code.clone().unwrap_or_default();
            let kind = api.r#type.clone().unwrap_or_default();
            if code.contains("invalid_api_key")
                || code.contains("insufficient_quota")
                || kind.contains("authentication")
                || kind.contains("permission")
            {
                ClassifyFailure::fatal(format!("服务拒绝请求: {}", api.message))
            } else {
                ClassifyFailure::transient(format!("服务返回错误: {}", api.message))
            }
        }
        other => ClassifyFailure::transient(other.to_string()),
    }
}
