// ==========================================
// 商品目录导入系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ImportApi, ProductApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version};
use crate::engine::events::PostCommitHooks;
use crate::importer::CatalogImporterImpl;
use crate::notify::MailNotifier;
use crate::repository::SqliteCatalogStore;

/// 应用状态
///
/// 包含所有API实例和共享资源，CLI 与集成测试共用
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 目录存储（共享连接）
    pub store: Arc<SqliteCatalogStore>,

    /// 配置管理器（共享连接）
    pub config: Arc<ConfigManager>,

    /// 目录导入API
    pub import_api: Arc<ImportApi>,

    /// 商品API
    pub product_api: Arc<ProductApi<SqliteCatalogStore>>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 初始化存储与配置
    /// 3. 按配置注册提交后钩子（邮件通知）
    /// 4. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        if let Ok(Some(version)) = read_schema_version(&conn) {
            tracing::debug!(schema_version = version, "数据库 schema 就绪");
        }
        let conn = Arc::new(Mutex::new(conn));

        let store = Arc::new(SqliteCatalogStore::from_connection(conn.clone()));
        let config = Arc::new(
            ConfigManager::from_connection(conn).map_err(|e| format!("配置初始化失败: {}", e))?,
        );

        let mut hooks = PostCommitHooks::new();
        match MailNotifier::from_reader(config.as_ref()) {
            Ok(Some(notifier)) => {
                hooks.register(Arc::new(notifier));
                tracing::info!("商品变更邮件通知已启用");
            }
            Ok(None) => tracing::debug!("商品变更邮件通知未启用"),
            Err(e) => tracing::warn!("通知配置读取失败(将继续启动): {}", e),
        }

        let importer = Arc::new(CatalogImporterImpl::with_defaults(store.clone()));
        let import_api = Arc::new(ImportApi::new(importer));
        let product_api = Arc::new(ProductApi::new(store.clone(), hooks));

        Ok(Self {
            db_path,
            store,
            config,
            import_api,
            product_api,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: CATALOG_IMPORT_DB_PATH 环境变量 → 用户数据目录 → ./catalog.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("CATALOG_IMPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./catalog.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("catalog-import");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("catalog.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::CatalogStore;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_initializes_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db").to_string_lossy().to_string();

        let state = AppState::new(db_path).unwrap();

        assert_eq!(state.store.count_categories().unwrap(), 0);
        assert!(state.product_api.list_all().unwrap().is_empty());
    }
}
