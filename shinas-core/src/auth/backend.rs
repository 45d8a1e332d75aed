//! 认证后端抽象
//!
//! 同一个服务接口，两个可互换的后端，在组装时选择：
//! - `LocalBackend`：本地账户存储（演示/离线模式），带人为延迟；
//! - `RemoteBackend`：托管 API 的 HTTP 客户端。
//!
//! `AuthService` 组合一个后端与会话管理器，是会话状态的唯一
//! 写入方。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use shared::client::{RegisterRequest, TokenPair, UpdateUserRequest};
use shared::models::User;
use shinas_client::HttpClient;

use crate::auth::session::SessionManager;
use crate::auth::store::AccountStore;
use crate::error::{CoreError, CoreResult};

/// 登录结果：用户记录，远端模式下附带令牌对
pub struct LoginOutcome {
    pub user: User,
    pub tokens: Option<TokenPair>,
}

/// 认证后端能力接口
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// 注册新账户
    async fn register(&self, req: &RegisterRequest) -> CoreResult<User>;

    /// 校验邮箱验证码
    async fn verify_email(&self, email: &str, code: &str) -> CoreResult<User>;

    /// 重发验证码
    async fn resend_code(&self, email: &str) -> CoreResult<()>;

    /// 用户名或邮箱登录
    async fn login(&self, username_or_email: &str, password: &str) -> CoreResult<LoginOutcome>;

    /// 用令牌取回权威用户记录（会话恢复）
    async fn fetch_me(&self, tokens: &TokenPair) -> CoreResult<User>;

    /// 更新用户
    async fn update_user(&self, id: &str, req: &UpdateUserRequest) -> CoreResult<User>;

    /// 删除用户
    async fn delete_user(&self, id: &str) -> CoreResult<()>;

    /// 用户列表
    async fn list_users(&self) -> CoreResult<Vec<User>>;
}

// ============================================================================
// LocalBackend - 本地存储后端
// ============================================================================

/// 本地账户存储后端
///
/// 每个操作前挂起一段模拟延迟（存储操作本身在临界区内同步
/// 完成），向 UI 模拟网络往返。
pub struct LocalBackend {
    store: Arc<AccountStore>,
    latency: Duration,
}

impl LocalBackend {
    /// 创建本地后端
    pub fn new(store: Arc<AccountStore>, latency: Duration) -> Self {
        Self { store, latency }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl AuthBackend for LocalBackend {
    async fn register(&self, req: &RegisterRequest) -> CoreResult<User> {
        self.simulate_latency().await;
        let pending = self.store.register(req)?;
        self.store
            .list_users()
            .into_iter()
            .find(|u| u.email == pending.email)
            .ok_or_else(|| CoreError::NotFound(pending.email.clone()))
    }

    async fn verify_email(&self, email: &str, code: &str) -> CoreResult<User> {
        self.simulate_latency().await;
        self.store.verify_email(email, code)
    }

    async fn resend_code(&self, email: &str) -> CoreResult<()> {
        self.simulate_latency().await;
        self.store.resend_code(email).map(|_| ())
    }

    async fn login(&self, username_or_email: &str, password: &str) -> CoreResult<LoginOutcome> {
        self.simulate_latency().await;
        let user = self.store.login(username_or_email, password)?;
        Ok(LoginOutcome { user, tokens: None })
    }

    async fn fetch_me(&self, _tokens: &TokenPair) -> CoreResult<User> {
        // 本地模式没有令牌，恢复依赖持久化的会话快照
        Err(CoreError::Unsupported("token-based session restore"))
    }

    async fn update_user(&self, id: &str, req: &UpdateUserRequest) -> CoreResult<User> {
        self.simulate_latency().await;
        self.store.update_user(id, req)
    }

    async fn delete_user(&self, id: &str) -> CoreResult<()> {
        self.simulate_latency().await;
        self.store.delete_user(id).map(|_| ())
    }

    async fn list_users(&self) -> CoreResult<Vec<User>> {
        self.simulate_latency().await;
        Ok(self.store.list_users())
    }
}

// ============================================================================
// RemoteBackend - 托管 API 后端
// ============================================================================

/// 托管 API 后端
///
/// 登录/恢复成功后把 access 令牌存入内部客户端，后续请求自动
/// 携带 Bearer 头。
pub struct RemoteBackend {
    http: RwLock<HttpClient>,
}

impl RemoteBackend {
    /// 创建远端后端
    pub fn new(http: HttpClient) -> Self {
        Self {
            http: RwLock::new(http),
        }
    }

    fn client(&self) -> HttpClient {
        self.http.read().clone()
    }
}

#[async_trait]
impl AuthBackend for RemoteBackend {
    async fn register(&self, req: &RegisterRequest) -> CoreResult<User> {
        Ok(self.client().register(req).await?)
    }

    async fn verify_email(&self, _email: &str, _code: &str) -> CoreResult<User> {
        // 托管后端自己负责验证邮件流程，没有对应端点
        Err(CoreError::Unsupported("email verification"))
    }

    async fn resend_code(&self, _email: &str) -> CoreResult<()> {
        Err(CoreError::Unsupported("email verification"))
    }

    async fn login(&self, username_or_email: &str, password: &str) -> CoreResult<LoginOutcome> {
        let response = self.client().login(username_or_email, password).await?;
        self.http.write().set_token(&response.access);
        Ok(LoginOutcome {
            user: response.user,
            tokens: Some(TokenPair {
                access: response.access,
                refresh: response.refresh,
            }),
        })
    }

    async fn fetch_me(&self, tokens: &TokenPair) -> CoreResult<User> {
        let mut client = self.client();
        client.set_token(&tokens.access);
        let user = client.me().await?;
        // 恢复成功，采用这组令牌
        self.http.write().set_token(&tokens.access);
        Ok(user)
    }

    async fn update_user(&self, id: &str, req: &UpdateUserRequest) -> CoreResult<User> {
        Ok(self.client().update_user(id, req).await?)
    }

    async fn delete_user(&self, id: &str) -> CoreResult<()> {
        Ok(self.client().delete_user(id).await?)
    }

    async fn list_users(&self) -> CoreResult<Vec<User>> {
        Ok(self.client().list_users().await?)
    }
}

// ============================================================================
// AuthService - 后端 + 会话编排
// ============================================================================

/// 认证服务：唯一的会话状态写入方
pub struct AuthService {
    backend: Box<dyn AuthBackend>,
    session: Arc<SessionManager>,
}

impl AuthService {
    /// 组装认证服务
    pub fn new(backend: Box<dyn AuthBackend>, session: Arc<SessionManager>) -> Self {
        Self { backend, session }
    }

    /// 注册；成功后等待邮箱验证，不建立会话
    pub async fn register(&self, req: &RegisterRequest) -> CoreResult<User> {
        self.backend.register(req).await
    }

    /// 校验验证码并建立会话
    pub async fn verify_email(&self, email: &str, code: &str) -> CoreResult<User> {
        let user = self.backend.verify_email(email, code).await?;
        self.session.set_current(Some(user.clone()))?;
        Ok(user)
    }

    /// 重发验证码
    pub async fn resend_code(&self, email: &str) -> CoreResult<()> {
        self.backend.resend_code(email).await
    }

    /// 登录并建立会话
    pub async fn login(&self, username_or_email: &str, password: &str) -> CoreResult<User> {
        let outcome = self.backend.login(username_or_email, password).await?;
        self.session.set_tokens(outcome.tokens)?;
        self.session.set_current(Some(outcome.user.clone()))?;
        tracing::info!(username = %outcome.user.username, "Logged in");
        Ok(outcome.user)
    }

    /// 登出
    pub fn logout(&self) -> CoreResult<()> {
        self.session.logout()
    }

    /// 重载后恢复会话
    ///
    /// 快照还在则无事可做；只剩令牌时向后端取回权威用户记录。
    /// 任何失败（过期/无效令牌、后端拒绝）都降级为未登录状态，
    /// 不向调用者抛出。
    pub async fn restore_session(&self) -> CoreResult<()> {
        if self.session.current().is_some() {
            return Ok(());
        }

        let Some(tokens) = self.session.tokens() else {
            return Ok(());
        };

        match self.backend.fetch_me(&tokens).await {
            Ok(user) => {
                tracing::info!(username = %user.username, "Session restored from tokens");
                self.session.set_current(Some(user))
            }
            Err(e) => {
                tracing::info!(error = %e, "Session restore failed, staying logged out");
                self.session.set_tokens(None)?;
                self.session.set_current(None)
            }
        }
    }

    /// 更新用户资料
    ///
    /// 更新对象是当前登录用户时，就地刷新会话快照，无需重新
    /// 登录。
    pub async fn update_user(&self, id: &str, req: &UpdateUserRequest) -> CoreResult<User> {
        let updated = self.backend.update_user(id, req).await?;
        if self.session.current().is_some_and(|u| u.id == id) {
            self.session.set_current(Some(updated.clone()))?;
        }
        Ok(updated)
    }

    /// 删除用户
    ///
    /// 删除的是当前登录用户时强制登出。
    pub async fn delete_user(&self, id: &str) -> CoreResult<()> {
        self.backend.delete_user(id).await?;
        if self.session.current().is_some_and(|u| u.id == id) {
            self.session.logout()?;
        }
        Ok(())
    }

    /// 用户列表
    pub async fn list_users(&self) -> CoreResult<Vec<User>> {
        self.backend.list_users().await
    }

    /// 会话管理器
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }
}
