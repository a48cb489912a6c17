//! LLM 服务 - 业务能力层
//!
//! 只负责"生成题目"能力，不关心测验流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppResult, QuizError};
use crate::services::generator::QuestionGenerator;
use crate::services::prompt::build_generation_prompt;
use crate::utils::logging::truncate_text;

/// LLM 服务
///
/// 职责：
/// - 构建题目生成提示词
/// - 调用 LLM API 并限制等待时间
/// - 原样返回回复文本
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    question_count: usize,
    timeout: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            question_count: config.question_count,
            timeout: config.generation_timeout(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）；超时或调用失败时返回 `GenerationUnavailable`
    pub async fn send_to_llm(&self, user_message: &str) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| QuizError::generation_unavailable(&self.model_name, e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| QuizError::generation_unavailable(&self.model_name, e))?;

        // 调用 API（带超时）
        let response = match tokio::time::timeout(self.timeout, self.client.chat().create(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("LLM API 调用失败: {}", e);
                return Err(QuizError::generation_unavailable(&self.model_name, e));
            }
            Err(_) => {
                warn!("LLM API 调用超时 ({} 秒)", self.timeout.as_secs());
                return Err(QuizError::generation_unavailable(
                    &self.model_name,
                    format!("请求超时 ({} 秒)", self.timeout.as_secs()),
                ));
            }
        };

        debug!("LLM API 调用成功");

        // 提取响应内容
        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| QuizError::generation_unavailable(&self.model_name, "LLM 返回内容为空"))?;

        debug!("LLM 响应: {}", truncate_text(&content, 200));

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl QuestionGenerator for LlmService {
    async fn generate(&self, topic: &str, difficulty: &str) -> AppResult<String> {
        let prompt = build_generation_prompt(topic, difficulty, self.question_count);
        self.send_to_llm(&prompt).await
    }
}
