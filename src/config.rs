//! 程序配置
//!
//! 所有运行参数集中在 [`Config`] 中，在启动时一次性校验
//! （原版脚本使用模块级常量，这里改为显式传入批处理器的配置对象）。
//!
//! 加载顺序：内置默认值 → `config.toml`（可选）→ 环境变量覆盖。

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// FFSI（Flash Flood Severity Index）默认严重度类别，
/// 顺序即档位顺序（MINOR=1 … CATASTROPHIC=5），用于计算 FFSI 分值
pub const FFSI_CATEGORIES: [&str; 5] = ["MINOR", "MODERATE", "SERIOUS", "SEVERE", "CATASTROPHIC"];

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 每批处理的 LSR 数量
    pub batch_size: usize,
    /// 两次请求之间的最小间隔（秒）
    ///
    /// 免费 API 密钥约 3 RPM（20 秒），付费密钥约 60 RPM（1 秒）
    pub request_delay_secs: f64,
    /// 单条记录的最大重试次数（临时故障 / 响应格式错误时）
    pub max_retries: u32,
    /// 最多处理的批次数量，0 表示不限制
    pub max_batches: usize,
    /// 结果目录（每条结果一个 JSON 文件，汇总 CSV 也写在这里）
    pub results_dir: String,
    /// FFSI 定义提示词文件
    pub prompt_file: String,
    /// 待分类的 LSR CSV 文件（IBW 格式）
    pub lsr_file: String,
    /// API 密钥文件（`{"secret_key": "..."}`，LLM_API_KEY 未设置时读取）
    pub key_file: String,
    /// 严重度类别（顺序即档位顺序）
    pub categories: Vec<String>,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: 10,
            request_delay_secs: 20.0,
            max_retries: 1,
            max_batches: 0,
            results_dir: "./results".to_string(),
            prompt_file: "./docs/ffsi_v1-original.txt".to_string(),
            lsr_file: "./data/test_flashflood_LSRs.csv".to_string(),
            key_file: "./secrets/key.json".to_string(),
            categories: FFSI_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-3.5-turbo".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：`config.toml` 存在则先读取，再应用环境变量覆盖
    pub fn load() -> anyhow::Result<Self> {
        let base = if Path::new("config.toml").exists() {
            let content = std::fs::read_to_string("config.toml")?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        Ok(Self::from_env_with(base))
    }

    /// 仅从环境变量加载（默认值兜底）
    pub fn from_env() -> Self {
        Self::from_env_with(Self::default())
    }

    fn from_env_with(default: Self) -> Self {
        Self {
            batch_size: std::env::var("BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.batch_size),
            request_delay_secs: std::env::var("REQUEST_DELAY_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_delay_secs),
            max_retries: std::env::var("MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_retries),
            max_batches: std::env::var("MAX_BATCHES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_batches),
            results_dir: std::env::var("RESULTS_DIR").unwrap_or(default.results_dir),
            prompt_file: std::env::var("PROMPT_FILE").unwrap_or(default.prompt_file),
            lsr_file: std::env::var("LSR_FILE").unwrap_or(default.lsr_file),
            key_file: std::env::var("KEY_FILE").unwrap_or(default.key_file),
            categories: default.categories,
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
        }
    }

    /// 启动校验：在发出任何请求之前拒绝无效配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize {
                value: self.batch_size,
            });
        }
        if !self.request_delay_secs.is_finite() || self.request_delay_secs < 0.0 {
            return Err(ConfigError::InvalidRequestDelay {
                value: self.request_delay_secs,
            });
        }
        if self.categories.is_empty() {
            return Err(ConfigError::EmptyCategories);
        }
        if !Path::new(&self.prompt_file).exists() {
            return Err(ConfigError::PromptFileMissing {
                path: self.prompt_file.clone(),
            });
        }
        Ok(())
    }

    /// 解析 API 密钥：优先环境变量 / 配置值，否则读取密钥文件
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        if !self.llm_api_key.is_empty() {
            return Ok(self.llm_api_key.clone());
        }

        let content =
            std::fs::read_to_string(&self.key_file).map_err(|_| ConfigError::MissingApiKey {
                key_file: self.key_file.clone(),
            })?;
        let parsed: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::KeyFileInvalid {
                path: self.key_file.clone(),
                reason: e.to_string(),
            })?;
        parsed
            .get("secret_key")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ConfigError::KeyFileInvalid {
                path: self.key_file.clone(),
                reason: "缺少 secret_key 字段".to_string(),
            })
    }
}
