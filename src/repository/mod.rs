// ==========================================
// 商品目录导入系统 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口，屏蔽数据库细节
// 约束: 所有查询使用参数化，防止 SQL 注入
// ==========================================

pub mod catalog_store;
pub mod catalog_store_impl;
pub mod error;

pub use catalog_store::CatalogStore;
pub use catalog_store_impl::SqliteCatalogStore;
pub use error::{RepositoryError, RepositoryResult};
