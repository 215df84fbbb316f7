// ==========================================
// 商品目录导入系统 - 目录领域模型
// ==========================================
// 用途: 类目 / 商品 持久化实体
// 对齐: db.rs category / product 表
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 带外部标识的实体（用于按 eId 对账）
pub trait ExternalKeyed {
    fn external_key(&self) -> Option<i64>;
}

// ==========================================
// Category - 类目
// ==========================================
// 红线: id 由存储层在持久化时分配，此后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    // ===== 标识 =====
    pub id: Option<i64>,          // 内部主键（未持久化时为 None）
    pub external_id: Option<i64>, // 外部系统标识 eId（存在时全局唯一）

    // ===== 业务字段 =====
    pub title: String, // 名称（3..=12 字符，非空白）

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// 构造尚未持久化的类目
    pub fn new(title: impl Into<String>, external_id: Option<i64>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            external_id,
            title: title.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 是否已持久化
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// 覆盖可变字段（导入更新路径）
    pub fn apply_title(&mut self, title: &str) {
        self.title = title.to_string();
        self.updated_at = Utc::now();
    }
}

impl ExternalKeyed for Category {
    fn external_key(&self) -> Option<i64> {
        self.external_id
    }
}

// ==========================================
// Product - 商品
// ==========================================
// 与 Category 为多对多关系，关系本身由 LinkTable / category_product 表维护
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    // ===== 标识 =====
    pub id: Option<i64>,
    pub external_id: Option<i64>,

    // ===== 业务字段 =====
    pub title: String,
    pub price: Option<f64>, // 价格（必填，[0, 200]；None 表示来源数据为 null）

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(title: impl Into<String>, price: Option<f64>, external_id: Option<i64>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            external_id,
            title: title.into(),
            price,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// 覆盖标题与价格（导入更新路径）
    pub fn apply_fields(&mut self, title: &str, price: Option<f64>) {
        self.title = title.to_string();
        self.price = price;
        self.updated_at = Utc::now();
    }
}

impl ExternalKeyed for Product {
    fn external_key(&self) -> Option<i64> {
        self.external_id
    }
}
