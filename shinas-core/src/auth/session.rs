//! SessionManager - 当前会话管理
//!
//! 持有唯一的"当前用户"值并在页面重载后恢复。
//!
//! 对外有两种观察方式：
//! - `subscribe()`：`watch` 通道，新订阅者立即拿到最新值
//!   （replay-latest），随后接收后续变更；
//! - `on_change()`：同步观察者注册表。会话变更在控制权返回
//!   调用者之前同步通知所有观察者，保证订单索引等派生状态
//!   先于任何依赖它的渲染完成重算。
//!
//! 会话快照与令牌分开持久化：快照随标签页生命周期，令牌
//! 寿命更长，用于重载后向后端恢复会话。

use parking_lot::Mutex;
use tokio::sync::watch;

use shared::client::TokenPair;
use shared::models::User;

use crate::error::CoreResult;
use crate::storage::{self, StoragePaths};

type SessionObserver = Box<dyn Fn(Option<&User>) + Send + Sync>;

/// 当前会话管理器
pub struct SessionManager {
    paths: StoragePaths,
    tx: watch::Sender<Option<User>>,
    tokens: Mutex<Option<TokenPair>>,
    observers: Mutex<Vec<SessionObserver>>,
}

impl SessionManager {
    /// 从磁盘加载持久化的会话状态
    ///
    /// 已过期的 access 令牌直接丢弃，重载后按未登录处理。
    pub fn load(paths: &StoragePaths) -> CoreResult<Self> {
        let snapshot: Option<User> = storage::load_json_opt(&paths.current_session_file())?;
        let tokens: Option<TokenPair> = storage::load_json_opt(&paths.tokens_file())?;

        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let tokens = match tokens {
            Some(pair) if pair.is_access_expired(now) => {
                tracing::info!("Persisted access token expired, discarding");
                storage::remove_file(&paths.tokens_file())?;
                None
            }
            other => other,
        };

        if let Some(user) = &snapshot {
            tracing::info!(username = %user.username, "Restored session snapshot");
        }

        let (tx, _) = watch::channel(snapshot);
        Ok(Self {
            paths: paths.clone(),
            tx,
            tokens: Mutex::new(tokens),
            observers: Mutex::new(Vec::new()),
        })
    }

    // ============ 读取 ============

    /// 当前用户快照
    pub fn current(&self) -> Option<User> {
        self.tx.borrow().clone()
    }

    /// 是否已登录
    pub fn is_logged_in(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// 当前用户是否管理员（大小写不敏感）
    pub fn is_admin(&self) -> bool {
        self.tx.borrow().as_ref().is_some_and(User::is_admin)
    }

    /// 订阅当前用户流；订阅时立即可读最新值
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.tx.subscribe()
    }

    /// 注册同步观察者并立即回放最新值
    pub fn on_change(&self, observer: impl Fn(Option<&User>) + Send + Sync + 'static) {
        let current = self.current();
        observer(current.as_ref());
        self.observers.lock().push(Box::new(observer));
    }

    // ============ 写入 ============

    /// 设置当前用户
    ///
    /// 顺序：脱敏 → 落盘 → 更新通道 → 同步通知观察者。
    /// 返回时所有观察者都已看到新值。
    pub fn set_current(&self, user: Option<User>) -> CoreResult<()> {
        let snapshot = user.as_ref().map(User::sanitized);

        match &snapshot {
            Some(u) => storage::save_json(&self.paths.current_session_file(), u)?,
            None => storage::remove_file(&self.paths.current_session_file())?,
        }

        self.tx.send_replace(snapshot.clone());

        let observers = self.observers.lock();
        for observer in observers.iter() {
            observer(snapshot.as_ref());
        }

        Ok(())
    }

    /// 当前令牌对
    pub fn tokens(&self) -> Option<TokenPair> {
        self.tokens.lock().clone()
    }

    /// 设置或清除令牌对（独立持久化）
    pub fn set_tokens(&self, tokens: Option<TokenPair>) -> CoreResult<()> {
        match &tokens {
            Some(pair) => storage::save_json(&self.paths.tokens_file(), pair)?,
            None => storage::remove_file(&self.paths.tokens_file())?,
        }
        *self.tokens.lock() = tokens;
        Ok(())
    }

    /// 登出：清除会话快照与令牌
    pub fn logout(&self) -> CoreResult<()> {
        if let Some(user) = self.current() {
            tracing::info!(username = %user.username, "Logged out");
        }
        self.set_tokens(None)?;
        self.set_current(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn manager(dir: &TempDir) -> SessionManager {
        let paths = StoragePaths::new(dir.path());
        paths.ensure_dirs().unwrap();
        SessionManager::load(&paths).unwrap()
    }

    fn user(id: &str, role: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@x.com", id),
            username: id.to_string(),
            display_name: id.to_string(),
            password_hash: Some("hash".to_string()),
            avatar_url: None,
            role: role.to_string(),
            email_verified: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_subscriber_sees_latest_value_immediately() {
        let dir = TempDir::new().unwrap();
        let session = manager(&dir);
        session.set_current(Some(user("u1", "user"))).unwrap();

        // Subscribed after the change, still sees it
        let rx = session.subscribe();
        assert_eq!(rx.borrow().as_ref().map(|u| u.id.clone()), Some("u1".to_string()));
    }

    #[test]
    fn test_observers_run_before_set_returns() {
        let dir = TempDir::new().unwrap();
        let session = manager(&dir);

        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = seen.clone();
        session.on_change(move |u| {
            if u.is_some() {
                seen2.fetch_add(1, Ordering::SeqCst);
            }
        });

        session.set_current(Some(user("u1", "user"))).unwrap();
        // Synchronous fan-out: already counted when set_current returned
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_on_change_replays_current_value() {
        let dir = TempDir::new().unwrap();
        let session = manager(&dir);
        session.set_current(Some(user("u1", "user"))).unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = seen.clone();
        session.on_change(move |u| {
            if u.is_some() {
                seen2.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_snapshot_is_sanitized_and_persisted() {
        let dir = TempDir::new().unwrap();
        {
            let session = manager(&dir);
            session.set_current(Some(user("u1", "user"))).unwrap();
            assert!(session.current().unwrap().password_hash.is_none());
        }

        // Fresh manager over the same directory restores the snapshot
        let session = manager(&dir);
        let restored = session.current().unwrap();
        assert_eq!(restored.id, "u1");
        assert!(restored.password_hash.is_none());
    }

    #[test]
    fn test_is_admin_ignores_role_case() {
        let dir = TempDir::new().unwrap();
        let session = manager(&dir);
        session.set_current(Some(user("u1", "ADMIN"))).unwrap();
        assert!(session.is_admin());
        session.set_current(Some(user("u2", "user"))).unwrap();
        assert!(!session.is_admin());
    }

    #[test]
    fn test_logout_clears_session_and_tokens() {
        let dir = TempDir::new().unwrap();
        let session = manager(&dir);
        session.set_current(Some(user("u1", "user"))).unwrap();
        session
            .set_tokens(Some(TokenPair {
                access: "a".to_string(),
                refresh: "r".to_string(),
            }))
            .unwrap();

        session.logout().unwrap();
        assert!(session.current().is_none());
        assert!(session.tokens().is_none());

        // Nothing survives a reload
        let session = manager(&dir);
        assert!(session.current().is_none());
        assert!(session.tokens().is_none());
    }

    #[test]
    fn test_expired_tokens_dropped_on_load() {
        use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
        let dir = TempDir::new().unwrap();
        let paths = StoragePaths::new(dir.path());
        paths.ensure_dirs().unwrap();

        let payload = URL_SAFE_NO_PAD.encode(br#"{"exp":1000}"#);
        let expired = TokenPair {
            access: format!("h.{}.s", payload),
            refresh: "r".to_string(),
        };
        storage::save_json(&paths.tokens_file(), &expired).unwrap();

        let session = SessionManager::load(&paths).unwrap();
        assert!(session.tokens().is_none());
    }
}
