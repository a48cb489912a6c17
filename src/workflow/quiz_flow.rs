//! 测验处理流程 - 流程层
//!
//! 核心职责：定义"一次提交"的完整处理流程
//!
//! 流程顺序：
//! 1. 未开始 → 调用 LLM 生成 → 解析校验 → 开始测验并展示第一题
//! 2. 答题中 → 给上一题判分 → 展示下一题或给出结果
//! 3. 已结束 → 原样返回结果

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{AppResult, QuizError};
use crate::models::QuestionSet;
use crate::services::{parse_question_set, QuestionGenerator};
use crate::workflow::quiz_session::{QuizPhase, QuizSession, StepOutcome};

/// 一次表单提交
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub selected_option: Option<String>,
}

/// 测验处理流程
///
/// - 决定何时生成题目、何时推进状态机
/// - 不持有会话，会话由调用方传入并取回
pub struct QuizFlow {
    generator: Arc<dyn QuestionGenerator>,
}

impl QuizFlow {
    /// 创建新的测验处理流程
    pub fn new(generator: Arc<dyn QuestionGenerator>) -> Self {
        Self { generator }
    }

    /// 生成并校验一套题目
    ///
    /// 生成和解析合并为一个可失败的操作，状态机只会拿到校验过的题目。
    pub async fn load_question_set(&self, topic: &str, difficulty: &str) -> AppResult<QuestionSet> {
        let raw = self.generator.generate(topic, difficulty).await?;
        let questions = parse_question_set(&raw)?;
        info!("✓ 题目生成完成，共 {} 道题", questions.len());
        Ok(questions)
    }

    /// 处理一次提交
    pub async fn run(&self, session: QuizSession, submission: &Submission) -> (QuizSession, AppResult<StepOutcome>) {
        let session_id = session.id();

        if session.phase() != QuizPhase::NotStarted {
            let (session, outcome) = session.submit(submission.selected_option.as_deref());
            log_outcome(&session, &outcome);
            return (session, outcome);
        }

        let topic = submission.topic.as_deref().map(str::trim).unwrap_or_default();
        if topic.is_empty() {
            return (session, Err(QuizError::MissingTopic));
        }
        let difficulty = submission.difficulty.as_deref().map(str::trim).unwrap_or_default();

        info!(
            "[会话 {}] 阶段: {:?}，主题: {}，难度: {}",
            session_id,
            QuizPhase::AwaitingFirstGeneration,
            topic,
            difficulty
        );

        let questions = match self.load_question_set(topic, difficulty).await {
            Ok(questions) => questions,
            Err(e) => {
                warn!("[会话 {}] ⚠️ 题目生成失败，本次测验中止: {}", session_id, e);
                return (session, Err(e));
            }
        };

        let (session, outcome) = session.begin(topic, difficulty, questions).submit(None);
        log_outcome(&session, &outcome);
        (session, outcome)
    }
}

fn log_outcome(session: &QuizSession, outcome: &AppResult<StepOutcome>) {
    match outcome {
        Ok(StepOutcome::Question(view)) => debug!(
            "[会话 {}] 展示第 {}/{} 题，当前得分 {}",
            session.id(),
            view.question_index,
            view.question_count,
            view.score
        ),
        Ok(StepOutcome::Finished(result)) => info!(
            "[会话 {}] 🏁 测验结束: {}/{} ({}%)",
            session.id(),
            result.score,
            result.question_count,
            result.percent
        ),
        Err(e) => warn!("[会话 {}] 提交处理失败: {}", session.id(), e),
    }
}
