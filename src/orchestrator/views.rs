//! 返回给前端的视图数据
//!
//! 页面渲染不在本服务内，这里只输出以 `view` 字段区分的 JSON。

use serde::Serialize;

use crate::error::QuizError;
use crate::models::Difficulty;
use crate::workflow::{QuestionView, QuizResult, StepOutcome};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum QuizView {
    /// 首页：选择主题和难度
    Home {
        difficulties: Vec<Difficulty>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// 答题页
    Question(QuestionView),
    /// 结果页
    Result(QuizResult),
}

impl QuizView {
    pub fn home() -> Self {
        QuizView::Home {
            difficulties: Difficulty::ALL.to_vec(),
            message: None,
        }
    }

    pub fn home_with_message(message: impl Into<String>) -> Self {
        QuizView::Home {
            difficulties: Difficulty::ALL.to_vec(),
            message: Some(message.into()),
        }
    }
}

impl From<StepOutcome> for QuizView {
    fn from(outcome: StepOutcome) -> Self {
        match outcome {
            StepOutcome::Question(view) => QuizView::Question(view),
            StepOutcome::Finished(result) => QuizView::Result(result),
        }
    }
}

impl From<&QuizError> for QuizView {
    fn from(err: &QuizError) -> Self {
        QuizView::home_with_message(err.user_message())
    }
}
