// ==========================================
// 商品目录导入系统 - 目录存储 Trait
// ==========================================
// 职责: 定义类目/商品数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::catalog::{Category, Product};
use crate::domain::links::LinkTable;
use crate::repository::error::RepositoryResult;

// ==========================================
// CatalogStore Trait
// ==========================================
// 用途: 导入对账 / 单商品保存 的数据访问
// 实现者: SqliteCatalogStore（使用 rusqlite）
pub trait CatalogStore: Send + Sync {
    // ===== 按外部标识加载 =====

    /// 按 eId 批量加载类目
    ///
    /// # 返回
    /// - 按主键升序；未命中的 eId 直接忽略
    /// - 空输入返回空列表，不访问数据库
    fn find_categories_by_external_ids(&self, external_ids: &[i64])
        -> RepositoryResult<Vec<Category>>;

    /// 按 eId 批量加载商品（语义同上）
    fn find_products_by_external_ids(&self, external_ids: &[i64])
        -> RepositoryResult<Vec<Product>>;

    /// 加载指定商品的现有关联 (product_id, category_id)
    fn load_product_links(&self, product_ids: &[i64]) -> RepositoryResult<Vec<(i64, i64)>>;

    // ===== 批量写入（事务化）=====

    /// 在单个事务中保存全部类目
    ///
    /// # 返回
    /// - Ok: 已分配主键的类目（顺序与输入一致）
    /// - Err: 任一写入失败，整个事务回滚
    fn save_categories(&self, categories: Vec<Category>) -> RepositoryResult<Vec<Category>>;

    /// 在单个事务中保存全部商品，并按 `links` 重写每个商品的关联行
    ///
    /// # 参数
    /// - products: 待保存商品
    /// - links: 以 `products` 下标为商品键的关联表
    fn save_products(
        &self,
        products: Vec<Product>,
        links: &LinkTable<usize>,
    ) -> RepositoryResult<Vec<Product>>;

    /// 保存单个商品并整体重写其关联类目
    fn save_product(&self, product: Product, category_ids: &[i64]) -> RepositoryResult<Product>;

    // ===== 查询 =====

    fn get_product(&self, id: i64) -> RepositoryResult<Option<Product>>;

    fn list_products(&self) -> RepositoryResult<Vec<Product>>;

    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;

    /// 商品侧关联查询
    fn categories_of_product(&self, product_id: i64) -> RepositoryResult<Vec<Category>>;

    /// 类目侧关联查询
    fn products_of_category(&self, category_id: i64) -> RepositoryResult<Vec<Product>>;

    fn count_categories(&self) -> RepositoryResult<usize>;

    fn count_products(&self) -> RepositoryResult<usize>;

    // ===== 删除 =====

    /// 删除商品（仅级联删除关联行，类目保留）
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 记录不存在
    fn delete_product(&self, id: i64) -> RepositoryResult<bool>;

    /// 删除类目（仅级联删除关联行，商品保留）
    fn delete_category(&self, id: i64) -> RepositoryResult<bool>;
}
