//! 本地持久化
//!
//! 所有客户端状态以 JSON 文件形式保存在数据目录下，
//! 每类数据一个固定命名的文件，与其他应用数据隔离：
//!
//! ```text
//! {data_dir}/
//!   auth/
//!     users.json            账户集合
//!     pending_verify.json   待验证邮箱记录
//!     current_session.json  当前会话快照
//!     tokens.json           access/refresh 令牌
//!   bookings/
//!     user_bookings.json    用户-订单关联账本
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CoreResult;

/// 数据目录路径管理器
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    /// 创建路径管理器
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 数据根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn auth_dir(&self) -> PathBuf {
        self.root.join("auth")
    }

    fn bookings_dir(&self) -> PathBuf {
        self.root.join("bookings")
    }

    /// 账户集合文件
    pub fn users_file(&self) -> PathBuf {
        self.auth_dir().join("users.json")
    }

    /// 待验证记录文件
    pub fn pending_file(&self) -> PathBuf {
        self.auth_dir().join("pending_verify.json")
    }

    /// 当前会话快照文件
    pub fn current_session_file(&self) -> PathBuf {
        self.auth_dir().join("current_session.json")
    }

    /// 令牌文件
    pub fn tokens_file(&self) -> PathBuf {
        self.auth_dir().join("tokens.json")
    }

    /// 用户订单账本文件
    pub fn user_bookings_file(&self) -> PathBuf {
        self.bookings_dir().join("user_bookings.json")
    }

    /// 确保所有目录存在
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.auth_dir())?;
        std::fs::create_dir_all(self.bookings_dir())?;
        Ok(())
    }
}

/// 读取 JSON 文件；文件不存在时返回默认值
pub fn load_json<T: DeserializeOwned + Default>(path: &Path) -> CoreResult<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// 读取可选的 JSON 文件；文件不存在时返回 None
pub fn load_json_opt<T: DeserializeOwned>(path: &Path) -> CoreResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// 写入 JSON 文件（pretty 格式，便于排查）
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// 删除文件（不存在时忽略）
pub fn remove_file(path: &Path) -> CoreResult<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
