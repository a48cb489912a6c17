//! # Quiz Manager
//!
//! 一个由 LLM 出题的在线测验服务
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（会话），只暴露能力
//! - `SessionStore` - 会话的唯一持有者，提供取出 / 放回能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `LlmService` - 按主题和难度生成题目
//! - `extraction` - 从 LLM 回复中截取并校验题目数组
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次提交"的完整处理流程
//! - `QuizSession` - 测验状态机（未开始 → 答题中 → 已结束）
//! - `QuizFlow` - 流程编排（生成 → 解析 → 开始 → 判分 → 结果）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用生命周期
//! - `orchestrator/routes` - HTTP 路由
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppResult, ConfigError, QuizError};
pub use infrastructure::SessionStore;
pub use models::{Difficulty, Question, QuestionSet};
pub use orchestrator::{App, QuizView};
pub use services::{LlmService, QuestionGenerator};
pub use workflow::{QuizFlow, QuizPhase, QuizResult, QuizSession, StepOutcome, Submission};
