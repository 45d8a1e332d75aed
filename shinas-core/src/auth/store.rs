//! AccountStore - 本地账户存储
//!
//! 以 JSON 文件为后备的账户集合，模拟后端的用户 CRUD 与
//! 邮箱验证流程。密码使用 Argon2 哈希存储（每用户独立盐）。
//!
//! 所有读-改-写操作都在同一个互斥锁临界区内完成（包括落盘），
//! 保证单步原子性；人为延迟在临界区之外。

use std::collections::HashMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use shared::client::{RegisterRequest, UpdateUserRequest};
use shared::models::{PendingVerification, User, role};
use shared::util;

use crate::error::{CoreError, CoreResult};
use crate::storage::{self, StoragePaths};

/// 最短密码长度
pub const MIN_PASSWORD_LEN: usize = 6;

/// 引导管理员账号（仅本地演示模式；后端部署时由服务端开通账号）
const SEED_ADMIN_USERNAME: &str = "admin";
const SEED_ADMIN_EMAIL: &str = "admin@shinas.local";
const SEED_ADMIN_PASSWORD: &str = "admin123";

/// 账户文件结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AccountsFile {
    users: HashMap<String, User>,
}

/// 本地账户存储
pub struct AccountStore {
    paths: StoragePaths,
    state: Mutex<AccountsState>,
}

#[derive(Debug, Default)]
struct AccountsState {
    users: HashMap<String, User>,
    pending: Option<PendingVerification>,
}

impl AccountStore {
    /// 从数据目录加载账户存储
    ///
    /// 存储为空且 `seed_admin` 打开时，写入一个已验证的管理员
    /// 账号，避免全新安装无法进入管理台。
    pub fn open(paths: &StoragePaths, seed_admin: bool) -> CoreResult<Self> {
        let accounts: AccountsFile = storage::load_json(&paths.users_file())?;
        let pending: Option<PendingVerification> =
            storage::load_json_opt(&paths.pending_file())?;

        let store = Self {
            paths: paths.clone(),
            state: Mutex::new(AccountsState {
                users: accounts.users,
                pending,
            }),
        };

        if seed_admin {
            store.seed_admin_if_empty()?;
        }

        Ok(store)
    }

    fn seed_admin_if_empty(&self) -> CoreResult<()> {
        let mut state = self.state.lock();
        if !state.users.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let admin = User {
            id: "admin-1".to_string(),
            email: SEED_ADMIN_EMAIL.to_string(),
            username: SEED_ADMIN_USERNAME.to_string(),
            display_name: "Administrator".to_string(),
            password_hash: Some(hash_password(SEED_ADMIN_PASSWORD)?),
            avatar_url: None,
            role: role::ADMIN.to_string(),
            email_verified: true,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(admin.id.clone(), admin);
        self.save_users(&state)?;

        tracing::info!(username = SEED_ADMIN_USERNAME, "Seeded bootstrap administrator");
        Ok(())
    }

    fn save_users(&self, state: &AccountsState) -> CoreResult<()> {
        storage::save_json(
            &self.paths.users_file(),
            &AccountsFile {
                users: state.users.clone(),
            },
        )
    }

    fn save_pending(&self, state: &AccountsState) -> CoreResult<()> {
        match &state.pending {
            Some(pending) => storage::save_json(&self.paths.pending_file(), pending),
            None => storage::remove_file(&self.paths.pending_file()),
        }
    }

    // ============ 注册与验证 ============

    /// 注册新账户并签发验证码
    ///
    /// 新签发的验证码会替换此前任何待验证记录（全局唯一一条）。
    pub fn register(&self, req: &RegisterRequest) -> CoreResult<PendingVerification> {
        if req.password.len() < MIN_PASSWORD_LEN {
            return Err(CoreError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let mut state = self.state.lock();

        if state.users.values().any(|u| u.email == req.email) {
            return Err(CoreError::EmailTaken);
        }
        if state.users.values().any(|u| u.username == req.username) {
            return Err(CoreError::UsernameTaken);
        }

        let now = Utc::now();
        let display_name = if req.display_name.is_empty() {
            req.username.clone()
        } else {
            req.display_name.clone()
        };
        let user = User {
            id: util::new_user_id(),
            email: req.email.clone(),
            username: req.username.clone(),
            display_name,
            password_hash: Some(hash_password(&req.password)?),
            avatar_url: None,
            role: role::USER.to_string(),
            email_verified: false,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id.clone(), user);

        let pending = PendingVerification {
            email: req.email.clone(),
            code: util::verification_code(),
            created_at: now,
        };
        state.pending = Some(pending.clone());

        self.save_users(&state)?;
        self.save_pending(&state)?;

        // 演示模式没有真实邮件投递，验证码输出到日志
        tracing::info!(email = %pending.email, code = %pending.code, "Verification code issued");

        Ok(pending)
    }

    /// 为未验证账户重新签发验证码
    pub fn resend_code(&self, email: &str) -> CoreResult<PendingVerification> {
        let mut state = self.state.lock();

        let user = state.users.values().find(|u| u.email == email);
        match user {
            Some(u) if !u.email_verified => {}
            _ => {
                return Err(CoreError::validation(
                    "Email not found or already verified",
                ));
            }
        }

        let pending = PendingVerification {
            email: email.to_string(),
            code: util::verification_code(),
            created_at: Utc::now(),
        };
        state.pending = Some(pending.clone());
        self.save_pending(&state)?;

        tracing::info!(email = %pending.email, code = %pending.code, "Verification code re-issued");

        Ok(pending)
    }

    /// 校验邮箱验证码
    ///
    /// 必须与最近一次签发的验证码完全一致；被替换的旧码永久失效。
    pub fn verify_email(&self, email: &str, code: &str) -> CoreResult<User> {
        let mut state = self.state.lock();

        let pending = state
            .pending
            .as_ref()
            .ok_or(CoreError::NoPendingVerification)?;
        if pending.email != email || pending.code != code {
            return Err(CoreError::CodeMismatch);
        }

        let user = state
            .users
            .values_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| CoreError::NotFound(email.to_string()))?;
        user.email_verified = true;
        user.updated_at = Utc::now();
        let verified = user.sanitized();

        state.pending = None;
        self.save_users(&state)?;
        self.save_pending(&state)?;

        tracing::info!(email = %email, "Email verified");

        Ok(verified)
    }

    // ============ 登录 ============

    /// 用户名或邮箱登录
    ///
    /// 要求密码哈希匹配且邮箱已验证；所有失败路径返回同一个
    /// 错误，不泄露具体原因。
    pub fn login(&self, username_or_email: &str, password: &str) -> CoreResult<User> {
        let state = self.state.lock();

        let user = state
            .users
            .values()
            .find(|u| u.username == username_or_email || u.email == username_or_email)
            .ok_or(CoreError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(CoreError::InvalidCredentials)?;
        if !verify_password(password, hash)? {
            return Err(CoreError::InvalidCredentials);
        }
        if !user.email_verified {
            return Err(CoreError::InvalidCredentials);
        }

        Ok(user.sanitized())
    }

    // ============ 用户管理 ============

    /// 更新用户资料
    ///
    /// 用户名变更需保持唯一；密码低于最短长度时报错且不落盘。
    pub fn update_user(&self, id: &str, req: &UpdateUserRequest) -> CoreResult<User> {
        if let Some(password) = &req.password {
            if password.len() < MIN_PASSWORD_LEN {
                return Err(CoreError::validation(format!(
                    "Password must be at least {} characters",
                    MIN_PASSWORD_LEN
                )));
            }
        }

        let mut state = self.state.lock();

        if !state.users.contains_key(id) {
            return Err(CoreError::NotFound(id.to_string()));
        }
        if let Some(username) = &req.username {
            if state
                .users
                .values()
                .any(|u| u.id != id && &u.username == username)
            {
                return Err(CoreError::UsernameTaken);
            }
        }

        let new_hash = match &req.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let user = state
            .users
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        if let Some(display_name) = &req.display_name {
            user.display_name = display_name.clone();
        }
        if let Some(username) = &req.username {
            user.username = username.clone();
        }
        if let Some(avatar_url) = &req.avatar_url {
            user.avatar_url = Some(avatar_url.clone());
        }
        if let Some(hash) = new_hash {
            user.password_hash = Some(hash);
        }
        user.updated_at = Utc::now();
        let updated = user.sanitized();

        self.save_users(&state)?;

        Ok(updated)
    }

    /// 删除用户
    pub fn delete_user(&self, id: &str) -> CoreResult<User> {
        let mut state = self.state.lock();

        let removed = state
            .users
            .remove(id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        self.save_users(&state)?;

        tracing::info!(user_id = %id, username = %removed.username, "User deleted");

        Ok(removed.sanitized())
    }

    /// 用户列表快照（已脱敏，排序稳定）
    pub fn list_users(&self) -> Vec<User> {
        let state = self.state.lock();
        let mut users: Vec<User> = state.users.values().map(User::sanitized).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        users
    }

    /// 按 id 查询（脱敏快照）
    pub fn get(&self, id: &str) -> Option<User> {
        self.state.lock().users.get(id).map(User::sanitized)
    }

    /// 当前待验证记录（演示模式下 UI 展示验证码用）
    pub fn pending_verification(&self) -> Option<PendingVerification> {
        self.state.lock().pending.clone()
    }
}

/// Hash a password with Argon2 and a fresh per-user salt.
fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::PasswordHash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash.
fn verify_password(password: &str, hash: &str) -> CoreResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| CoreError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> AccountStore {
        let paths = StoragePaths::new(dir.path());
        paths.ensure_dirs().unwrap();
        AccountStore::open(&paths, true).unwrap()
    }

    fn register_req(email: &str, username: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            username: username.to_string(),
            password: "secret1".to_string(),
            display_name: String::new(),
        }
    }

    #[test]
    fn test_seed_admin_on_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let users = store.list_users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "admin");
        assert!(users[0].is_admin());
        assert!(users[0].email_verified);

        let admin = store.login("admin", "admin123").unwrap();
        assert_eq!(admin.id, "admin-1");
    }

    #[test]
    fn test_seed_admin_skipped_when_disabled() {
        let dir = TempDir::new().unwrap();
        let paths = StoragePaths::new(dir.path());
        paths.ensure_dirs().unwrap();
        let store = AccountStore::open(&paths, false).unwrap();
        assert!(store.list_users().is_empty());
    }

    #[test]
    fn test_duplicate_email_and_username_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store.register(&register_req("a@x.com", "alice")).unwrap();
        assert!(matches!(
            store.register(&register_req("a@x.com", "other")),
            Err(CoreError::EmailTaken)
        ));
        assert!(matches!(
            store.register(&register_req("b@x.com", "alice")),
            Err(CoreError::UsernameTaken)
        ));
        // Store unchanged by the failed attempts
        assert_eq!(store.list_users().len(), 2);
    }

    #[test]
    fn test_verify_email_flow() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let pending = store.register(&register_req("a@x.com", "alice")).unwrap();

        // Unverified account cannot log in
        assert!(matches!(
            store.login("alice", "secret1"),
            Err(CoreError::InvalidCredentials)
        ));

        assert!(matches!(
            store.verify_email("a@x.com", "000000"),
            Err(CoreError::CodeMismatch)
        ));

        let user = store.verify_email("a@x.com", &pending.code).unwrap();
        assert!(user.email_verified);
        assert!(store.pending_verification().is_none());

        // Verified account logs in by username or email
        store.login("alice", "secret1").unwrap();
        store.login("a@x.com", "secret1").unwrap();
    }

    #[test]
    fn test_superseded_code_is_permanently_invalid() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let first = store.register(&register_req("a@x.com", "alice")).unwrap();
        let second = store.resend_code("a@x.com").unwrap();

        if first.code != second.code {
            assert!(matches!(
                store.verify_email("a@x.com", &first.code),
                Err(CoreError::CodeMismatch)
            ));
        }
        store.verify_email("a@x.com", &second.code).unwrap();

        assert!(matches!(
            store.verify_email("a@x.com", &second.code),
            Err(CoreError::NoPendingVerification)
        ));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        assert!(matches!(
            store.login("admin", "wrong"),
            Err(CoreError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_update_user_refreshes_fields() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let before = store.get("admin-1").unwrap();
        let updated = store
            .update_user(
                "admin-1",
                &UpdateUserRequest {
                    display_name: Some("Root".to_string()),
                    avatar_url: Some("https://example.com/a.png".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.display_name, "Root");
        assert_eq!(updated.avatar_url.as_deref(), Some("https://example.com/a.png"));
        assert!(updated.updated_at >= before.updated_at);
    }

    #[test]
    fn test_update_rejects_short_password() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let result = store.update_user(
            "admin-1",
            &UpdateUserRequest {
                password: Some("123".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(CoreError::Validation(_))));
        // Old password still works
        store.login("admin", "admin123").unwrap();
    }

    #[test]
    fn test_update_password_changes_login() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        store
            .update_user(
                "admin-1",
                &UpdateUserRequest {
                    password: Some("newpass".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(store.login("admin", "admin123").is_err());
        store.login("admin", "newpass").unwrap();
    }

    #[test]
    fn test_delete_unknown_user() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        assert!(matches!(
            store.delete_user("nope"),
            Err(CoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_listing_never_exposes_hashes() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.register(&register_req("a@x.com", "alice")).unwrap();
        assert!(store.list_users().iter().all(|u| u.password_hash.is_none()));
    }

    #[test]
    fn test_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let paths = StoragePaths::new(dir.path());
        paths.ensure_dirs().unwrap();

        {
            let store = AccountStore::open(&paths, true).unwrap();
            store.register(&register_req("a@x.com", "alice")).unwrap();
        }

        let store = AccountStore::open(&paths, true).unwrap();
        assert_eq!(store.list_users().len(), 2);
        assert!(store.pending_verification().is_some());
    }
}
