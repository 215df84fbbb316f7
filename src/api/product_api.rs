// ==========================================
// 商品目录导入系统 - 商品 API
// ==========================================
// 职责: 单商品保存/删除/查询
// 红线: 提交后钩子只在事务提交成功后执行，钩子失败不影响保存结果
// ==========================================

use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::catalog::{Category, Product};
use crate::engine::events::{PostCommitHooks, ProductChangeEvent};
use crate::importer::catalog_importer_trait::FieldValidator;
use crate::importer::field_validator::ConstraintValidator;
use crate::repository::catalog_store::CatalogStore;

// ==========================================
// ProductApi - 商品 API
// ==========================================

/// 商品API
///
/// 职责：
/// 1. 单商品保存（字段校验 + 关联重建 + 提交后通知）
/// 2. 删除（类目保留）
/// 3. 查询
pub struct ProductApi<S: CatalogStore> {
    store: Arc<S>,
    validator: Box<dyn FieldValidator>,
    hooks: PostCommitHooks,
}

impl<S: CatalogStore> ProductApi<S> {
    pub fn new(store: Arc<S>, hooks: PostCommitHooks) -> Self {
        Self {
            store,
            validator: Box::new(ConstraintValidator::default()),
            hooks,
        }
    }

    pub fn with_validator(mut self, validator: Box<dyn FieldValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// 保存商品并整体重写其类目关联
    ///
    /// # 参数
    /// - product: 新商品（id=None）或已存在商品
    /// - category_ids: 类目主键列表
    ///
    /// # 返回
    /// - Ok(Product): 已持久化的商品
    /// - Err(ValidationError): 字段约束不满足（未写入）
    pub fn save(&self, product: Product, category_ids: &[i64]) -> ApiResult<Product> {
        if let Some(violation) = self.validator.validate_product(&product).into_iter().next() {
            return Err(ApiError::ValidationError(format!(
                "{}: {}",
                violation.property_path, violation.message
            )));
        }

        let is_new = !product.is_persisted();
        let saved = self.store.save_product(product, category_ids)?;
        let product_id = saved
            .id
            .ok_or_else(|| ApiError::InternalError("保存后商品缺少主键".to_string()))?;

        let event = if is_new {
            ProductChangeEvent::created(product_id, saved.title.clone())
        } else {
            ProductChangeEvent::updated(product_id, saved.title.clone())
        };
        info!(product_id, kind = %event.kind, "商品已保存");

        let failures = self.hooks.run_all(&event);
        if failures > 0 {
            debug!(product_id, failures, "部分提交后钩子失败");
        }

        Ok(saved)
    }

    /// 删除商品（关联行级联删除，类目保留）
    pub fn delete(&self, id: i64) -> ApiResult<()> {
        if !self.store.delete_product(id)? {
            return Err(ApiError::NotFound(format!("Product(id={})不存在", id)));
        }
        info!(product_id = id, "商品已删除");
        Ok(())
    }

    pub fn list_all(&self) -> ApiResult<Vec<Product>> {
        Ok(self.store.list_products()?)
    }

    pub fn get(&self, id: i64) -> ApiResult<Product> {
        self.store
            .get_product(id)?
            .ok_or_else(|| ApiError::NotFound(format!("Product(id={})不存在", id)))
    }

    /// 商品所属类目
    pub fn categories_of(&self, id: i64) -> ApiResult<Vec<Category>> {
        Ok(self.store.categories_of_product(id)?)
    }
}
