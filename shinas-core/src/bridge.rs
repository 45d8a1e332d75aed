//! CoreBridge - 统一组装层
//!
//! 按配置把存储、会话、索引与服务装配成一个整体：
//! - Local 模式：本地账户存储模拟后端（演示/离线）；
//! - Remote 模式：托管 API。
//!
//! 两种模式共用同一个服务接口；订单提交始终指向远端 API，
//! 不可达时由提交管线降级为本地提交。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use shared::models::BookingRequest;
use shinas_client::{ClientConfig, ClientResult, HttpClient, SearchParams};

use crate::auth::{AccountStore, AuthService, LocalBackend, RemoteBackend, SessionManager};
use crate::booking::{BookingService, BookingTransport, UserBookingIndex};
use crate::config::{BackendMode, CoreConfig};
use crate::error::CoreResult;
use crate::storage::StoragePaths;

/// 订单 API 传输层：每次请求时从会话取当前令牌附加 Bearer 头，
/// 无令牌则匿名请求。
struct ApiTransport {
    http: HttpClient,
    session: Arc<SessionManager>,
}

impl ApiTransport {
    fn client(&self) -> HttpClient {
        let mut client = self.http.clone();
        match self.session.tokens() {
            Some(tokens) => client.set_token(&tokens.access),
            None => client.clear_token(),
        }
        client
    }
}

#[async_trait]
impl BookingTransport for ApiTransport {
    async fn create_booking(&self, booking: &BookingRequest) -> ClientResult<BookingRequest> {
        self.client().create_booking(booking).await
    }

    async fn search_bookings(&self, params: &SearchParams) -> ClientResult<Vec<BookingRequest>> {
        self.client().search_bookings(params).await
    }

    async fn get_booking(&self, reference: &str) -> ClientResult<BookingRequest> {
        self.client().get_booking(reference).await
    }
}

/// 核心数据层桥接器
pub struct CoreBridge {
    config: CoreConfig,
    session: Arc<SessionManager>,
    accounts: Option<Arc<AccountStore>>,
    index: Arc<UserBookingIndex>,
    auth: AuthService,
    bookings: BookingService,
}

impl CoreBridge {
    /// 装配并恢复持久化状态
    pub async fn init(config: CoreConfig) -> CoreResult<Self> {
        let paths = StoragePaths::new(&config.data_dir);
        paths.ensure_dirs()?;

        let session = Arc::new(SessionManager::load(&paths)?);
        let index = UserBookingIndex::load(&paths)?;
        index.attach(&session);

        let client_config = ClientConfig::new(&config.api_base_url);
        let http = client_config.build_http_client();

        let (accounts, auth) = match config.mode {
            BackendMode::Local => {
                let store = Arc::new(AccountStore::open(&paths, config.seed_admin)?);
                let backend = LocalBackend::new(
                    store.clone(),
                    Duration::from_millis(config.simulated_latency_ms),
                );
                (
                    Some(store),
                    AuthService::new(Box::new(backend), session.clone()),
                )
            }
            BackendMode::Remote => {
                let mut authed = http.clone();
                if let Some(tokens) = session.tokens() {
                    authed.set_token(&tokens.access);
                }
                let backend = RemoteBackend::new(authed);
                (None, AuthService::new(Box::new(backend), session.clone()))
            }
        };

        let transport = ApiTransport {
            http,
            session: session.clone(),
        };
        let bookings = BookingService::new(Box::new(transport), index.clone(), session.clone());

        // 重载后恢复会话；失败静默降级为未登录
        auth.restore_session().await?;

        tracing::info!(mode = ?config.mode, data_dir = %config.data_dir.display(), "Core bridge ready");

        Ok(Self {
            config,
            session,
            accounts,
            index,
            auth,
            bookings,
        })
    }

    /// 配置
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// 会话管理器
    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// 认证服务
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// 订单服务
    pub fn bookings(&self) -> &BookingService {
        &self.bookings
    }

    /// 订单索引
    pub fn index(&self) -> &Arc<UserBookingIndex> {
        &self.index
    }

    /// 本地账户存储（仅 Local 模式）
    pub fn accounts(&self) -> Option<&Arc<AccountStore>> {
        self.accounts.as_ref()
    }
}
