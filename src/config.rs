use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认配置文件路径（可通过 `QUIZ_CONFIG` 覆盖）
pub const DEFAULT_CONFIG_PATH: &str = "quiz.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 监听地址
    pub bind_addr: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 生成温度（偏高以获得更多样的题目）
    pub temperature: f32,
    /// 单次生成的最大 token 数
    pub max_tokens: u32,
    /// 每次测验生成的题目数量
    pub question_count: usize,
    /// 生成请求超时（秒）
    pub generation_timeout_secs: u64,
    // --- 会话配置 ---
    /// 会话空闲多久后过期（分钟）
    pub session_ttl_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            temperature: 0.8,
            max_tokens: 2000,
            question_count: 5,
            generation_timeout_secs: 30,
            session_ttl_minutes: 30,
        }
    }
}

impl Config {
    /// 加载配置：先读 TOML 文件（不存在则使用默认值），再用环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("QUIZ_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let base = if Path::new(&path).exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };
        base.apply_env()
    }

    /// 仅从环境变量加载
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// 从 TOML 文件加载，缺失的字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::TomlParseFailed { source, .. } => ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// 解析 TOML 文本
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: String::new(),
            source,
        })
    }

    /// 用环境变量覆盖已有配置
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(self.bind_addr),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            temperature: env_parse("LLM_TEMPERATURE", "f32")?.unwrap_or(self.temperature),
            max_tokens: env_parse("LLM_MAX_TOKENS", "u32")?.unwrap_or(self.max_tokens),
            question_count: env_parse("QUESTION_COUNT", "usize")?.unwrap_or(self.question_count),
            generation_timeout_secs: env_parse("GENERATION_TIMEOUT_SECS", "u64")?
                .unwrap_or(self.generation_timeout_secs),
            session_ttl_minutes: env_parse("SESSION_TTL_MINUTES", "i64")?
                .unwrap_or(self.session_ttl_minutes),
        })
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes)
    }
}

/// 读取并解析环境变量；未设置时返回 `None`
fn env_parse<T: FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
