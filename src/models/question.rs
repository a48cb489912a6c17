use serde::{Deserialize, Serialize};

use crate::error::{AppResult, QuizError};

/// 每道题展示的选项数量
pub const OPTION_COUNT: usize = 4;

/// LLM 返回的原始题目记录（未经校验）
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// 校验后的题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub text: String,
    pub options: [String; OPTION_COUNT],
    pub answer: String,
}

impl Question {
    /// 从原始记录构建题目
    ///
    /// `index` 从 1 开始，仅用于错误信息。超过 4 个的选项会被丢弃，
    /// 答案必须逐字出现在保留的选项中。
    pub fn from_raw(index: usize, raw: RawQuestion) -> AppResult<Self> {
        let text = raw.question.trim().to_string();
        if text.is_empty() {
            return Err(QuizError::invalid_record(index, "题干为空"));
        }

        if raw.options.len() < OPTION_COUNT {
            return Err(QuizError::invalid_record(
                index,
                format!("选项数量不足: {} < {}", raw.options.len(), OPTION_COUNT),
            ));
        }

        let mut kept = raw.options.into_iter().take(OPTION_COUNT);
        let options: [String; OPTION_COUNT] = std::array::from_fn(|_| kept.next().unwrap_or_default());

        if !options.iter().any(|option| option == &raw.answer) {
            return Err(QuizError::invalid_record(
                index,
                format!("答案 '{}' 不在选项中", raw.answer),
            ));
        }

        Ok(Self {
            text,
            options,
            answer: raw.answer,
        })
    }

    /// 选项是否属于本题
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// 一次测验的题目集合，生成后不可变，且至少包含一道题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> AppResult<Self> {
        if questions.is_empty() {
            return Err(QuizError::malformed("题目数组为空"));
        }
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 按位置获取题目（从 1 开始）
    pub fn get(&self, position: usize) -> Option<&Question> {
        position.checked_sub(1).and_then(|i| self.questions.get(i))
    }
}
