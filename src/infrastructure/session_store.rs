//! 会话存储 - 基础设施层
//!
//! 持有所有浏览器会话，只暴露"取出 / 放回"的能力

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppResult, QuizError};
use crate::workflow::QuizSession;

/// 存储槽位
#[derive(Debug)]
enum Slot {
    /// 空闲，可被请求取出
    Idle(QuizSession),
    /// 已被某个请求取出（记录取出时间）
    Busy(DateTime<Utc>),
}

/// 会话存储
///
/// 职责：
/// - 按 cookie 中的会话 ID 保存会话
/// - 保证同一会话同一时间只被一个请求持有
/// - 清理过期会话
/// - 不认识题目，不处理测验流程
///
/// 锁只在读写 map 时持有，不跨越 `.await`。
#[derive(Clone)]
pub struct SessionStore {
    slots: Arc<Mutex<HashMap<Uuid, Slot>>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    /// 创建新的会话存储
    pub fn new(ttl: chrono::Duration) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 取出会话
    ///
    /// 没有 ID、ID 未知或会话已过期时返回一个新会话。
    /// 会话已被其他请求取出时返回 `SessionBusy`。
    pub fn checkout(&self, id: Option<Uuid>) -> AppResult<SessionLease> {
        let now = Utc::now();
        let mut slots = self.lock();

        if let Some(id) = id {
            match slots.insert(id, Slot::Busy(now)) {
                Some(Slot::Idle(session)) if !session.is_expired(now, self.ttl) => {
                    return Ok(self.lease(session));
                }
                Some(Slot::Busy(since)) => {
                    slots.insert(id, Slot::Busy(since));
                    return Err(QuizError::SessionBusy);
                }
                Some(Slot::Idle(_)) => {
                    debug!("[会话 {}] 已过期，重新开始", id);
                    return Ok(self.lease(QuizSession::with_id(id)));
                }
                None => {
                    slots.remove(&id);
                }
            }
        }

        let session = QuizSession::new();
        slots.insert(session.id(), Slot::Busy(now));
        debug!("[会话 {}] 新建会话", session.id());
        Ok(self.lease(session))
    }

    fn lease(&self, session: QuizSession) -> SessionLease {
        SessionLease {
            store: self.clone(),
            id: session.id(),
            original: Some(session),
        }
    }

    fn put_idle(&self, session: QuizSession) {
        self.lock().insert(session.id(), Slot::Idle(session));
    }

    /// 清理过期会话，返回清理数量
    ///
    /// 取出超过有效期仍未放回的槽位也会被清理。
    pub fn sweep_expired(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut slots = self.lock();
        let before = slots.len();
        slots.retain(|_, slot| match slot {
            Slot::Idle(session) => !session.is_expired(now, self.ttl),
            Slot::Busy(since) => now - *since <= self.ttl,
        });
        before - slots.len()
    }

    /// 当前会话数量
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 启动后台清理任务
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let removed = store.sweep_expired();
                if removed > 0 {
                    info!("🧹 已清理 {} 个过期会话", removed);
                }
            }
        })
    }
}

/// 一次取出的凭据
///
/// 正常情况下用 [`SessionLease::checkin`] 放回处理后的会话。
/// 凭据在放回前被丢弃（例如客户端断开、请求被取消）时，取出时的会话原样放回，
/// 槽位不会一直处于占用状态。
#[derive(Debug)]
pub struct SessionLease {
    store: SessionStore,
    id: Uuid,
    original: Option<QuizSession>,
}

impl SessionLease {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// 取出时的会话副本，交给流程层处理
    pub fn session(&self) -> QuizSession {
        self.original.clone().unwrap_or_else(|| QuizSession::with_id(self.id))
    }

    /// 放回会话并刷新活跃时间
    pub fn checkin(mut self, mut session: QuizSession) {
        self.original = None;
        session.touch(Utc::now());
        self.store.put_idle(session);
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        if let Some(session) = self.original.take() {
            debug!("[会话 {}] 请求未完成，恢复取出前的会话", self.id);
            self.store.put_idle(session);
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}
