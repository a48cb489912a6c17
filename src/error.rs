use thiserror::Error;

/// 测验错误
///
/// 生成阶段的错误（`GenerationUnavailable` / `MalformedGenerationOutput` /
/// `InvalidQuestionRecord`）都会中止本次测验，会话保持在未开始状态。
#[derive(Debug, Error)]
pub enum QuizError {
    /// 生成服务调用失败或超时
    #[error("题目生成服务不可用 (模型: {model}): {reason}")]
    GenerationUnavailable { model: String, reason: String },

    /// 生成结果中没有可用的题目数组
    #[error("LLM 返回内容格式错误: {reason}")]
    MalformedGenerationOutput { reason: String },

    /// 单条题目记录不合法
    #[error("第 {index} 道题目记录不合法: {reason}")]
    InvalidQuestionRecord { index: usize, reason: String },

    /// 题目数量为 0，无法计算得分百分比
    #[error("题目数量为 0，无法计算得分")]
    DivisionUndefined,

    /// 开始测验时没有提供主题
    #[error("未提供测验主题")]
    MissingTopic,

    /// 同一会话已有请求在处理中
    #[error("会话正在处理另一个请求")]
    SessionBusy,
}

impl QuizError {
    /// 生成服务错误的便捷构造
    pub fn generation_unavailable(model: impl Into<String>, reason: impl ToString) -> Self {
        QuizError::GenerationUnavailable {
            model: model.into(),
            reason: reason.to_string(),
        }
    }

    /// 格式错误的便捷构造
    pub fn malformed(reason: impl Into<String>) -> Self {
        QuizError::MalformedGenerationOutput {
            reason: reason.into(),
        }
    }

    /// 题目记录错误的便捷构造（index 从 1 开始）
    pub fn invalid_record(index: usize, reason: impl Into<String>) -> Self {
        QuizError::InvalidQuestionRecord {
            index,
            reason: reason.into(),
        }
    }

    /// 展示给用户的提示信息
    pub fn user_message(&self) -> &'static str {
        match self {
            QuizError::GenerationUnavailable { .. } => {
                "The question generator is unavailable right now. Please try again."
            }
            QuizError::MalformedGenerationOutput { .. } | QuizError::InvalidQuestionRecord { .. } => {
                "The generated quiz could not be read. Please try again."
            }
            QuizError::DivisionUndefined => "The quiz had no questions. Please start a new quiz.",
            QuizError::MissingTopic => "Please enter a topic to start the quiz.",
            QuizError::SessionBusy => "Your previous answer is still being processed. Please wait.",
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, QuizError>;
