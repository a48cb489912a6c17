//! 生成结果解析
//!
//! LLM 的回复不一定是纯 JSON，前后可能夹杂说明文字，
//! 这里截取第一个 `[` 到最后一个 `]` 之间的内容再做结构校验。

use tracing::debug;

use crate::error::{AppResult, QuizError};
use crate::models::{Question, QuestionSet, RawQuestion};

/// 从原始回复中截取题目数组（包含两端括号）
pub fn extract_question_array(raw_text: &str) -> AppResult<&str> {
    let start = raw_text
        .find('[')
        .ok_or_else(|| QuizError::malformed("回复中没有找到 '['"))?;
    let end = raw_text
        .rfind(']')
        .filter(|&end| end > start)
        .ok_or_else(|| QuizError::malformed("'[' 之后没有找到 ']'"))?;

    Ok(&raw_text[start..=end])
}

/// 解析并校验题目集合
pub fn parse_question_set(raw_text: &str) -> AppResult<QuestionSet> {
    let array = extract_question_array(raw_text)?;

    let records: Vec<RawQuestion> = serde_json::from_str(array)
        .map_err(|e| QuizError::malformed(format!("题目数组无法解析: {}", e)))?;

    debug!("解析到 {} 条题目记录", records.len());

    let questions = records
        .into_iter()
        .enumerate()
        .map(|(i, raw)| Question::from_raw(i + 1, raw))
        .collect::<AppResult<Vec<_>>>()?;

    QuestionSet::new(questions)
}
