// ==========================================
// 商品目录导入系统 - 导入层
// ==========================================
// 职责: JSON 文件导入，生成类目/商品数据
// 支持: UTF-8 JSON 数组
// ==========================================

// 模块声明
pub mod catalog_importer_impl;
pub mod catalog_importer_trait;
pub mod conflict_handler;
pub mod error;
pub mod field_validator;
pub mod file_parser;
pub mod schema_validator;

// 重导出核心类型
pub use catalog_importer_impl::CatalogImporterImpl;
pub use conflict_handler::ConflictHandler as ConflictHandlerImpl;
pub use error::ImportError;
pub use field_validator::ConstraintValidator;
pub use file_parser::JsonFileParser;
pub use schema_validator::SchemaValidator;

// 重导出 Trait 接口
pub use catalog_importer_trait::{
    CatalogImporter, ConflictHandler, FieldValidator, FileParser, RecordDecoder,
};
