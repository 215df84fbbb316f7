// ==========================================
// 商品目录导入系统 - 导入领域模型
// ==========================================
// 用途: 导入管道中间产物与结果
// 生命周期: ImportRecord 仅在单次导入调用内存在
// ==========================================

use crate::domain::catalog::ExternalKeyed;
use crate::domain::types::EntityKind;
use serde::{Deserialize, Serialize};

// ==========================================
// CategoryRecord - 类目导入记录
// ==========================================
// 对齐: JSON {"eId": int, "title": string}
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecord {
    pub external_id: i64,
    pub title: String,

    // 元信息
    pub position: usize, // 在 JSON 数组中的序号（从 1 开始）
}

// ==========================================
// ProductRecord - 商品导入记录
// ==========================================
// 对齐: JSON {"eId": int, "title": string, "price": number|null, "categoriesEId": [int]}
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub external_id: i64,
    pub title: String,
    pub price: Option<f64>,
    pub category_external_ids: Vec<i64>,

    pub position: usize,
}

impl ExternalKeyed for CategoryRecord {
    fn external_key(&self) -> Option<i64> {
        Some(self.external_id)
    }
}

impl ExternalKeyed for ProductRecord {
    fn external_key(&self) -> Option<i64> {
        Some(self.external_id)
    }
}

// ==========================================
// RecordBatch - 一次导入的全部记录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBatch {
    Categories(Vec<CategoryRecord>),
    Products(Vec<ProductRecord>),
}

impl RecordBatch {
    pub fn kind(&self) -> EntityKind {
        match self {
            RecordBatch::Categories(_) => EntityKind::Category,
            RecordBatch::Products(_) => EntityKind::Product,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordBatch::Categories(records) => records.len(),
            RecordBatch::Products(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按输入顺序列出 (序号, eId)
    pub fn external_ids(&self) -> Vec<(usize, i64)> {
        match self {
            RecordBatch::Categories(records) => records
                .iter()
                .map(|r| (r.position, r.external_id))
                .collect(),
            RecordBatch::Products(records) => records
                .iter()
                .map(|r| (r.position, r.external_id))
                .collect(),
        }
    }
}

// ==========================================
// FieldViolation - 字段约束违规
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub property_path: String, // 违规字段（如 "title"）
    pub message: String,       // 违规描述
}

impl FieldViolation {
    pub fn new(property_path: &str, message: impl Into<String>) -> Self {
        Self {
            property_path: property_path.to_string(),
            message: message.into(),
        }
    }
}

// ==========================================
// ImportResult - 导入结果
// ==========================================
// 计数在对账阶段累计，持久化后不再调整
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportResult {
    pub added: usize,   // 新增数量
    pub updated: usize, // 更新数量
}

impl ImportResult {
    pub fn new(added: usize, updated: usize) -> Self {
        Self { added, updated }
    }

    pub fn total(&self) -> usize {
        self.added + self.updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_external_ids_keep_input_order() {
        let batch = RecordBatch::Categories(vec![
            CategoryRecord {
                external_id: 9,
                title: "Books".to_string(),
                position: 1,
            },
            CategoryRecord {
                external_id: 3,
                title: "Games".to_string(),
                position: 2,
            },
        ]);

        assert_eq!(batch.kind(), EntityKind::Category);
        assert_eq!(batch.external_ids(), vec![(1, 9), (2, 3)]);
    }

    #[test]
    fn test_import_result_total() {
        assert_eq!(ImportResult::new(2, 3).total(), 5);
        assert_eq!(ImportResult::default().total(), 0);
    }
}
