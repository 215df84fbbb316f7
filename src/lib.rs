// ==========================================
// 商品目录导入系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 类目/商品 JSON 批量导入与对账
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 对账与事件
pub mod engine;

// 导入层 - JSON 文件
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 通知层 - 邮件
pub mod notify;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EntityKind, ProductChangeKind};

// 领域实体
pub use domain::{Category, ImportResult, LinkTable, Product};

// 导入
pub use importer::{CatalogImporter, CatalogImporterImpl, ImportError};

// 存储
pub use repository::{CatalogStore, RepositoryError, SqliteCatalogStore};

// API
pub use api::{ImportApi, ProductApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "商品目录导入系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
