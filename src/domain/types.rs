// ==========================================
// 商品目录导入系统 - 领域类型定义
// ==========================================
// 职责: 实体种类等跨模块共享的枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 实体种类 (Entity Kind)
// ==========================================
// 用途: 区分类目导入与商品导入（锁、日志、错误上下文）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Category, // 类目
    Product,  // 商品
}

impl EntityKind {
    /// 必填字段列表（用于结构校验错误提示）
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Category => &["eId", "title"],
            EntityKind::Product => &["eId", "title", "price", "categoriesEId"],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Category => write!(f, "CATEGORY"),
            EntityKind::Product => write!(f, "PRODUCT"),
        }
    }
}

// ==========================================
// 商品变更类型 (Product Change Kind)
// ==========================================
// 用途: 单条保存路径的提交后事件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductChangeKind {
    Created, // 新增
    Updated, // 修改
}

impl fmt::Display for ProductChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductChangeKind::Created => write!(f, "CREATED"),
            ProductChangeKind::Updated => write!(f, "UPDATED"),
        }
    }
}
