// ==========================================
// 商品目录导入系统 - 类目/商品关联表
// ==========================================
// 职责: 维护 (商品, 类目) 邻接集合，双向索引同步更新
// 红线: 只允许通过 attach / detach / replace 修改，两个方向必须一致
// ==========================================

use std::collections::{BTreeMap, BTreeSet};

/// 商品 ↔ 类目 关联表
///
/// `P` 为商品侧键：导入批次内使用槽位下标（新商品尚无主键），
/// 持久化后可直接使用商品主键。类目侧始终为类目主键。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkTable<P: Ord + Copy> {
    by_product: BTreeMap<P, BTreeSet<i64>>,
    by_category: BTreeMap<i64, BTreeSet<P>>,
}

impl<P: Ord + Copy> LinkTable<P> {
    pub fn new() -> Self {
        Self {
            by_product: BTreeMap::new(),
            by_category: BTreeMap::new(),
        }
    }

    /// 建立一条关联（幂等）
    pub fn attach(&mut self, product: P, category_id: i64) {
        self.by_product.entry(product).or_default().insert(category_id);
        self.by_category.entry(category_id).or_default().insert(product);
    }

    /// 解除一条关联
    pub fn detach(&mut self, product: P, category_id: i64) {
        if let Some(categories) = self.by_product.get_mut(&product) {
            categories.remove(&category_id);
            if categories.is_empty() {
                self.by_product.remove(&product);
            }
        }
        if let Some(products) = self.by_category.get_mut(&category_id) {
            products.remove(&product);
            if products.is_empty() {
                self.by_category.remove(&category_id);
            }
        }
    }

    /// 解除商品的全部关联，返回被解除的类目
    pub fn detach_all(&mut self, product: P) -> BTreeSet<i64> {
        let removed = self.by_product.remove(&product).unwrap_or_default();
        for category_id in &removed {
            if let Some(products) = self.by_category.get_mut(category_id) {
                products.remove(&product);
                if products.is_empty() {
                    self.by_category.remove(category_id);
                }
            }
        }
        removed
    }

    /// 整体重建商品的类目集合：先全部解除，再逐个建立（不做差量合并）
    pub fn replace(&mut self, product: P, category_ids: impl IntoIterator<Item = i64>) {
        self.detach_all(product);
        for category_id in category_ids {
            self.attach(product, category_id);
        }
    }

    /// 商品侧查询
    pub fn categories_of(&self, product: P) -> Vec<i64> {
        self.by_product
            .get(&product)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// 类目侧查询
    pub fn products_of(&self, category_id: i64) -> Vec<P> {
        self.by_category
            .get(&category_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, product: P, category_id: i64) -> bool {
        self.by_product
            .get(&product)
            .map(|set| set.contains(&category_id))
            .unwrap_or(false)
    }

    /// 关联总数
    pub fn len(&self) -> usize {
        self.by_product.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_product.is_empty()
    }

    /// 全部 (商品, 类目) 对，按商品键排序
    pub fn pairs(&self) -> Vec<(P, i64)> {
        self.by_product
            .iter()
            .flat_map(|(p, cats)| cats.iter().map(move |c| (*p, *c)))
            .collect()
    }
}
