// ==========================================
// 商品目录导入系统 - 目录导入 Trait
// ==========================================
// 职责: 定义目录导入接口（不包含实现）
// 管道: 读取 → 解码 → 结构校验 → 对账 → 字段校验 → 原子落库
// ==========================================

use crate::domain::catalog::{Category, Product};
use crate::domain::import::{FieldViolation, ImportResult, RecordBatch};
use crate::domain::types::EntityKind;
use crate::importer::error::ImportError;
use std::path::Path;

// ==========================================
// CatalogImporter Trait
// ==========================================
// 用途: 目录导入主接口
// 实现者: CatalogImporterImpl
pub trait CatalogImporter: Send + Sync {
    /// 从 JSON 文件导入类目
    ///
    /// # 参数
    /// - file_path: JSON 数组文件，元素为 {"eId", "title"}
    ///
    /// # 返回
    /// - Ok(ImportResult): 新增/更新计数
    /// - Err: 任一阶段失败，存储保持不变
    fn import_categories(&self, file_path: &Path) -> Result<ImportResult, ImportError>;

    /// 从 JSON 文件导入商品
    ///
    /// # 参数
    /// - file_path: JSON 数组文件，元素为 {"eId", "title", "price", "categoriesEId"}
    ///
    /// # 说明
    /// - 未知的类目 eId 会被忽略
    /// - 已存在商品的类目集合整体重建，不做合并
    fn import_products(&self, file_path: &Path) -> Result<ImportResult, ImportError>;

    /// 按实体类型分派
    fn import(&self, kind: EntityKind, file_path: &Path) -> Result<ImportResult, ImportError> {
        match kind {
            EntityKind::Category => self.import_categories(file_path),
            EntityKind::Product => self.import_products(file_path),
        }
    }
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 读取文件并解码为 JSON 值
// 实现者: JsonFileParser
pub trait FileParser: Send + Sync {
    /// # 返回
    /// - Err(LoadFailure): 文件不存在或不可读
    /// - Err(ParseFailure): 内容不是合法 JSON
    fn parse_file(&self, file_path: &Path) -> Result<serde_json::Value, ImportError>;
}

// ==========================================
// RecordDecoder Trait
// ==========================================
// 用途: 逐条结构校验并转换为导入记录
// 实现者: SchemaValidator
pub trait RecordDecoder: Send + Sync {
    /// # 返回
    /// - Err(MalformedRecord): 顶层不是数组，或任一记录缺字段/类型不符
    fn decode(&self, kind: EntityKind, document: &serde_json::Value)
        -> Result<RecordBatch, ImportError>;
}

// ==========================================
// ConflictHandler Trait
// ==========================================
// 用途: 批次内重复 eId 检测
// 实现者: ConflictHandler
pub trait ConflictHandler: Send + Sync {
    /// 检测批次内重复 eId
    ///
    /// # 返回
    /// - Vec<(序号, eId)>: 重复记录列表（不包括第一次出现），按输入顺序
    fn detect_duplicates(&self, batch: &RecordBatch) -> Vec<(usize, i64)>;
}

// ==========================================
// FieldValidator Trait
// ==========================================
// 用途: 声明式字段约束（非空白 / 长度 / 范围）
// 实现者: ConstraintValidator
pub trait FieldValidator: Send + Sync {
    /// 返回按规则顺序排列的违规列表（空表示通过）
    fn validate_category(&self, category: &Category) -> Vec<FieldViolation>;

    fn validate_product(&self, product: &Product) -> Vec<FieldViolation>;
}
