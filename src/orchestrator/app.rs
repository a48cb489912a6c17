//! 应用生命周期 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：输出启动信息、创建 LLM 服务、流程和会话存储
//! 2. **资源管理**：唯一持有会话存储和后台清理任务
//! 3. **服务运行**：监听端口、处理请求、Ctrl+C 时优雅退出

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::SessionStore;
use crate::orchestrator::routes::{self, AppState};
use crate::services::{LlmService, QuestionGenerator};
use crate::utils::logging::log_startup;
use crate::workflow::QuizFlow;

/// 过期会话清理间隔
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// 应用主结构
pub struct App {
    config: Config,
    state: AppState,
}

impl App {
    /// 初始化应用（使用配置中的 LLM 服务）
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        if config.llm_api_key.is_empty() {
            warn!("⚠️ 未配置 LLM_API_KEY，题目生成请求可能会失败");
        }

        let generator = Arc::new(LlmService::new(&config));
        Ok(Self::with_generator(config, generator))
    }

    /// 使用指定的题目生成器创建应用
    pub fn with_generator(config: Config, generator: Arc<dyn QuestionGenerator>) -> Self {
        let state = AppState {
            flow: Arc::new(QuizFlow::new(generator)),
            store: SessionStore::new(config.session_ttl()),
        };
        Self { config, state }
    }

    /// 构建路由
    pub fn router(&self) -> Router {
        routes::router(self.state.clone())
    }

    /// 运行应用主逻辑
    pub async fn run(self) -> Result<()> {
        let sweeper = self.state.store.spawn_sweeper(SWEEP_INTERVAL);

        let listener = TcpListener::bind(&self.config.bind_addr)
            .await
            .with_context(|| format!("无法监听地址: {}", self.config.bind_addr))?;
        info!("✓ 服务已启动: http://{}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP 服务异常退出")?;

        sweeper.abort();
        info!("👋 服务已停止");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("无法监听 Ctrl+C 信号: {}", e);
        std::future::pending::<()>().await;
    }
    info!("收到退出信号，正在关闭...");
}
