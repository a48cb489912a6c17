use async_trait::async_trait;

use crate::error::AppResult;

/// 题目生成能力
///
/// 只负责拿到 LLM 的原始回复，不做任何解析或校验。
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// 按主题和难度生成题目，返回原始文本
    async fn generate(&self, topic: &str, difficulty: &str) -> AppResult<String>;
}
