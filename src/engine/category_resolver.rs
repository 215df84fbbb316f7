// ==========================================
// 商品目录导入系统 - 类目解析
// ==========================================
// 职责: 将商品记录中的类目 eId 解析为已持久化类目
// 规则: 未知 eId 静默忽略（宽松关联）；空输入不访问存储
// ==========================================

use crate::domain::catalog::Category;
use crate::repository::catalog_store::CatalogStore;
use crate::repository::error::RepositoryResult;
use std::sync::Arc;
use tracing::debug;

/// 类目解析 Trait
pub trait CategoryResolver: Send + Sync {
    fn resolve_by_external_ids(&self, external_ids: &[i64]) -> RepositoryResult<Vec<Category>>;
}

/// 基于 CatalogStore 的解析器
pub struct StoreCategoryResolver<S: CatalogStore> {
    store: Arc<S>,
}

impl<S: CatalogStore> StoreCategoryResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: CatalogStore> CategoryResolver for StoreCategoryResolver<S> {
    fn resolve_by_external_ids(&self, external_ids: &[i64]) -> RepositoryResult<Vec<Category>> {
        if external_ids.is_empty() {
            return Ok(vec![]);
        }

        let categories = self.store.find_categories_by_external_ids(external_ids)?;
        if categories.len() < external_ids.len() {
            debug!(
                requested = external_ids.len(),
                resolved = categories.len(),
                "部分类目 eId 未找到，已忽略"
            );
        }
        Ok(categories)
    }
}
