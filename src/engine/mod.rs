// ==========================================
// 商品目录导入系统 - 引擎层
// ==========================================
// 职责: 对账、类目解析、提交后事件
// 红线: Engine 不拼 SQL，数据访问全部经由 CatalogStore
// ==========================================

pub mod category_resolver;
pub mod events;
pub mod reconciliation;

pub use category_resolver::{CategoryResolver, StoreCategoryResolver};
pub use events::{NoOpHook, PostCommitHook, PostCommitHooks, ProductChangeEvent};
pub use reconciliation::{validate_touched, Reconciliation, ReconciliationEngine, TouchedSet};
