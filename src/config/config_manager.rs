// ==========================================
// 商品目录导入系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::notify_config_trait::NotifyConfigReader;
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// 全局作用域
const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（需已初始化 schema）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 从 config_kv 表读取配置值，带默认值
    pub fn get_config_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入配置值（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 全部 global 配置（按 key 排序）
    pub fn list_config(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;

        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }
        Ok(config_map)
    }
}

impl NotifyConfigReader for ConfigManager {
    fn is_notification_enabled(&self) -> RepositoryResult<bool> {
        let value = self.get_config_or_default(config_keys::NOTIFY_ENABLED, "false")?;
        Ok(matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ))
    }

    fn get_admin_email(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::ADMIN_EMAIL, "admin@localhost")
    }

    fn get_notification_email(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::NOTIFICATION_EMAIL, "catalog@localhost")
    }

    fn get_smtp_host(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::SMTP_HOST, "localhost")
    }

    fn get_smtp_port(&self) -> RepositoryResult<u16> {
        let value = self.get_config_or_default(config_keys::SMTP_PORT, "1025")?;
        Ok(value.trim().parse::<u16>().unwrap_or(1025))
    }

    fn get_smtp_user(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::SMTP_USER, "")
    }

    fn get_smtp_password(&self) -> RepositoryResult<String> {
        self.get_config_or_default(config_keys::SMTP_PASSWORD, "")
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 变更通知
    pub const NOTIFY_ENABLED: &str = "notify_enabled";
    pub const ADMIN_EMAIL: &str = "email_admin";
    pub const NOTIFICATION_EMAIL: &str = "email_for_notifications";

    // SMTP
    pub const SMTP_HOST: &str = "smtp_host";
    pub const SMTP_PORT: &str = "smtp_port";
    pub const SMTP_USER: &str = "smtp_user";
    pub const SMTP_PASSWORD: &str = "smtp_password";
}
