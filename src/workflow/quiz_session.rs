//! 测验会话状态机
//!
//! 会话是一个普通的值：每次提交都把会话交给状态机，状态机返回新的会话和本次的输出。
//!
//! 状态流转：
//! `NotStarted` → (生成题目) → `InProgress` → ... → `Complete`
//!
//! 判分采用"延后一步"的方式：每次提交携带的是上一道题的选择，
//! 与 `previous_answer` 比较后再记录当前题目的答案。
//! 因此 N 道题需要 N+1 次提交，最后一道题在完成提交时判分。

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppResult, QuizError};
use crate::models::{QuestionSet, OPTION_COUNT};
use crate::workflow::scoring::{answers_match, compute_result, QuizResult};

/// 测验阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    NotStarted,
    /// 正在等待 LLM 生成题目（会话此时由请求独占，不在存储中）
    AwaitingFirstGeneration,
    InProgress,
    Complete,
}

/// 一次进行中的测验
#[derive(Debug, Clone)]
pub struct Attempt {
    topic: String,
    difficulty: String,
    questions: QuestionSet,
    /// 下一次要展示的题目位置（从 1 开始），等于 N+1 表示答题结束
    question_index: usize,
    /// 最近一次展示的题目的正确答案
    previous_answer: Option<String>,
    score: usize,
}

impl Attempt {
    fn new(topic: String, difficulty: String, questions: QuestionSet) -> Self {
        Self {
            topic,
            difficulty,
            questions,
            question_index: 1,
            previous_answer: None,
            score: 0,
        }
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn previous_answer(&self) -> Option<&str> {
        self.previous_answer.as_deref()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    /// 前进一步：先给上一题判分，再展示当前题目或结束
    fn step(&mut self, selected: Option<&str>) -> Option<QuestionView> {
        let count = self.questions.len();

        if self.question_index > 1 {
            if let (Some(previous), Some(selected)) = (self.previous_answer.as_deref(), selected) {
                if answers_match(selected, previous) {
                    self.score += 1;
                } else if let Some(shown) = self.questions.get(self.question_index - 1) {
                    if !shown.has_option(selected.trim()) {
                        debug!("提交的选项 '{}' 不属于第 {} 题", selected, self.question_index - 1);
                    }
                }
            }
        }

        let question = self.questions.get(self.question_index)?;
        self.previous_answer = Some(question.answer.clone());

        let view = QuestionView {
            topic: self.topic.clone(),
            difficulty: self.difficulty.clone(),
            question_index: self.question_index,
            question_count: count,
            text: question.text.clone(),
            options: question.options.clone(),
            score: self.score,
        };
        self.question_index += 1;

        Some(view)
    }
}

/// 会话状态
#[derive(Debug, Clone)]
pub enum QuizState {
    NotStarted,
    InProgress(Attempt),
    Complete(QuizResult),
}

/// 展示给用户的题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub topic: String,
    pub difficulty: String,
    /// 当前题目位置（从 1 开始）
    pub question_index: usize,
    pub question_count: usize,
    pub text: String,
    pub options: [String; OPTION_COUNT],
    /// 截至目前的得分
    pub score: usize,
}

/// 单次提交的输出
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Question(QuestionView),
    Finished(QuizResult),
}

/// 浏览器会话
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    last_active: DateTime<Utc>,
    state: QuizState,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    /// 创建新的会话
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    /// 使用指定 ID 创建会话
    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            last_active: Utc::now(),
            state: QuizState::NotStarted,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn phase(&self) -> QuizPhase {
        match self.state {
            QuizState::NotStarted => QuizPhase::NotStarted,
            QuizState::InProgress(_) => QuizPhase::InProgress,
            QuizState::Complete(_) => QuizPhase::Complete,
        }
    }

    /// 已结束测验的结果
    pub fn result(&self) -> Option<&QuizResult> {
        match &self.state {
            QuizState::Complete(result) => Some(result),
            _ => None,
        }
    }

    /// 刷新活跃时间
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
    }

    /// 会话是否已过期
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.last_active > ttl
    }

    /// 放弃当前测验，回到未开始状态
    pub fn reset(mut self) -> Self {
        self.state = QuizState::NotStarted;
        self
    }

    /// 用生成好的题目开始一次测验
    pub fn begin(mut self, topic: impl Into<String>, difficulty: impl Into<String>, questions: QuestionSet) -> Self {
        self.state = QuizState::InProgress(Attempt::new(topic.into(), difficulty.into(), questions));
        self
    }

    /// 处理一次提交
    ///
    /// 返回新的会话以及本次提交的输出。未开始的会话无法直接提交，
    /// 已结束的会话总是返回同一个结果。
    pub fn submit(self, selected: Option<&str>) -> (Self, AppResult<StepOutcome>) {
        let Self { id, last_active, state } = self;

        let (state, outcome) = match state {
            QuizState::NotStarted => (QuizState::NotStarted, Err(QuizError::MissingTopic)),
            QuizState::Complete(result) => (QuizState::Complete(result.clone()), Ok(StepOutcome::Finished(result))),
            QuizState::InProgress(mut attempt) => match attempt.step(selected) {
                Some(view) => (QuizState::InProgress(attempt), Ok(StepOutcome::Question(view))),
                None => match compute_result(attempt.score, attempt.question_count()) {
                    Ok(result) => (QuizState::Complete(result.clone()), Ok(StepOutcome::Finished(result))),
                    Err(e) => (QuizState::NotStarted, Err(e)),
                },
            },
        };

        (Self { id, last_active, state }, outcome)
    }
}
