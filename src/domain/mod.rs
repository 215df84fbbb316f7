// ==========================================
// 商品目录导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、导入记录、关联表
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod catalog;
pub mod import;
pub mod links;
pub mod types;

// 重导出核心类型
pub use catalog::{Category, ExternalKeyed, Product};
pub use import::{CategoryRecord, FieldViolation, ImportResult, ProductRecord, RecordBatch};
pub use links::LinkTable;
pub use types::{EntityKind, ProductChangeKind};
