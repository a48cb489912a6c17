//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责应用生命周期和 HTTP 接入，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用生命周期
//! - 初始化 LLM 服务、测验流程和会话存储
//! - 启动 HTTP 服务和过期会话清理任务
//!
//! ### `routes` - HTTP 路由
//! - 从 cookie 找到会话，取出 → 交给流程层 → 放回
//! - 把错误映射为状态码和首页提示
//!
//! ### `views` - 视图数据
//! - 首页 / 答题页 / 结果页的 JSON 结构
//!
//! ## 层次关系
//!
//! ```text
//! routes (处理 HTTP 请求)
//!     ↓
//! workflow::QuizFlow (处理单次提交)
//!     ↓
//! services (能力层：生成 / 解析)
//!     ↓
//! infrastructure (基础设施：SessionStore)
//! ```

pub mod app;
pub mod routes;
pub mod views;

// 重新导出主要类型
pub use app::App;
pub use routes::{router, AppState, SESSION_COOKIE};
pub use views::QuizView;
