// ==========================================
// 商品目录导入系统 - 对账引擎
// ==========================================
// 职责: 按 eId 将导入记录与已持久化实体对账，划分 UPDATE / ADD
// 红线:
// - 重复 eId 在分类之前按整个输入检测，整批拒绝
// - 计数在对账阶段累计，持久化后不再调整
// - 实体修改只发生在本次调用持有的值上，提交前不触碰存储
// ==========================================

use crate::domain::catalog::{Category, ExternalKeyed, Product};
use crate::domain::import::{CategoryRecord, ProductRecord, RecordBatch};
use crate::domain::links::LinkTable;
use crate::engine::category_resolver::CategoryResolver;
use crate::importer::catalog_importer_trait::FieldValidator;
use crate::importer::conflict_handler::ConflictHandler;
use crate::importer::error::ImportError;
use crate::repository::catalog_store::CatalogStore;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

// ==========================================
// TouchedSet - 本批次被触及的实体
// ==========================================
// 顺序即构造顺序: 先按存储顺序的更新项，再按输入顺序的新增项
#[derive(Debug, Clone, PartialEq)]
pub enum TouchedSet {
    Categories(Vec<Category>),
    Products {
        products: Vec<Product>,
        links: LinkTable<usize>, // 商品键为 products 下标
    },
}

impl TouchedSet {
    pub fn len(&self) -> usize {
        match self {
            TouchedSet::Categories(categories) => categories.len(),
            TouchedSet::Products { products, .. } => products.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 对账结果
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub touched: TouchedSet,
    pub added: usize,
    pub updated: usize,
}

/// 按 eId 划分已存在实体与导入记录
///
/// # 返回
/// - 命中对: (实体, 记录)，按存储返回顺序
/// - 新记录: 未命中的记录，按输入顺序
fn partition_by_external_id<'r, E, R>(existing: Vec<E>, records: &'r [R]) -> (Vec<(E, &'r R)>, Vec<&'r R>)
where
    E: ExternalKeyed,
    R: ExternalKeyed,
{
    let mut pending: HashMap<i64, &'r R> = records
        .iter()
        .filter_map(|r| r.external_key().map(|k| (k, r)))
        .collect();

    let mut matched = Vec::new();
    for entity in existing {
        let record = entity.external_key().and_then(|k| pending.remove(&k));
        if let Some(record) = record {
            matched.push((entity, record));
        }
    }

    let fresh = records
        .iter()
        .filter(|r| r.external_key().map(|k| pending.contains_key(&k)).unwrap_or(false))
        .collect();

    (matched, fresh)
}

// ==========================================
// ReconciliationEngine
// ==========================================
pub struct ReconciliationEngine<S: CatalogStore> {
    store: Arc<S>,
    resolver: Box<dyn CategoryResolver>,
    conflict_handler: ConflictHandler,
}

impl<S: CatalogStore> ReconciliationEngine<S> {
    pub fn new(store: Arc<S>, resolver: Box<dyn CategoryResolver>) -> Self {
        Self {
            store,
            resolver,
            conflict_handler: ConflictHandler,
        }
    }

    /// 对账（不写存储）
    ///
    /// # 返回
    /// - Err(DuplicateExternalId): 输入中存在重复 eId
    /// - Err(Persistence): 加载已存在实体失败
    pub fn reconcile(&self, batch: &RecordBatch) -> Result<Reconciliation, ImportError> {
        if let Some((position, external_id)) = self.conflict_handler.first_duplicate(batch) {
            debug!(position, external_id, "检测到重复 eId");
            return Err(ImportError::DuplicateExternalId { external_id });
        }

        if batch.is_empty() {
            let touched = match batch {
                RecordBatch::Categories(_) => TouchedSet::Categories(vec![]),
                RecordBatch::Products(_) => TouchedSet::Products {
                    products: vec![],
                    links: LinkTable::new(),
                },
            };
            return Ok(Reconciliation {
                touched,
                added: 0,
                updated: 0,
            });
        }

        match batch {
            RecordBatch::Categories(records) => self.reconcile_categories(records),
            RecordBatch::Products(records) => self.reconcile_products(records),
        }
    }

    fn reconcile_categories(&self, records: &[CategoryRecord]) -> Result<Reconciliation, ImportError> {
        let external_ids: Vec<i64> = records.iter().map(|r| r.external_id).collect();
        let existing = self.store.find_categories_by_external_ids(&external_ids)?;
        let (matched, fresh) = partition_by_external_id(existing, records);

        let updated = matched.len();
        let added = fresh.len();

        let mut touched = Vec::with_capacity(updated + added);
        for (mut category, record) in matched {
            category.apply_title(&record.title);
            touched.push(category);
        }
        for record in fresh {
            touched.push(Category::new(record.title.clone(), Some(record.external_id)));
        }

        debug!(added, updated, "类目对账完成");
        Ok(Reconciliation {
            touched: TouchedSet::Categories(touched),
            added,
            updated,
        })
    }

    fn reconcile_products(&self, records: &[ProductRecord]) -> Result<Reconciliation, ImportError> {
        let external_ids: Vec<i64> = records.iter().map(|r| r.external_id).collect();
        let existing = self.store.find_products_by_external_ids(&external_ids)?;
        let (matched, fresh) = partition_by_external_id(existing, records);

        let updated = matched.len();
        let added = fresh.len();

        let mut products = Vec::with_capacity(updated + added);
        let mut sources: Vec<&ProductRecord> = Vec::with_capacity(updated + added);
        for (mut product, record) in matched {
            product.apply_fields(&record.title, record.price);
            products.push(product);
            sources.push(record);
        }
        for record in fresh {
            products.push(Product::new(
                record.title.clone(),
                record.price,
                Some(record.external_id),
            ));
            sources.push(record);
        }

        // 载入已存在商品的当前关联，再按记录整体重建
        let mut links: LinkTable<usize> = LinkTable::new();
        let slot_of: HashMap<i64, usize> = products
            .iter()
            .enumerate()
            .filter_map(|(slot, p)| p.id.map(|id| (id, slot)))
            .collect();
        let persisted_ids: Vec<i64> = slot_of.keys().copied().collect();
        for (product_id, category_id) in self.store.load_product_links(&persisted_ids)? {
            if let Some(slot) = slot_of.get(&product_id) {
                links.attach(*slot, category_id);
            }
        }

        // 整批类目 eId 一次解析
        let wanted: BTreeSet<i64> = sources
            .iter()
            .flat_map(|r| r.category_external_ids.iter().copied())
            .collect();
        let wanted: Vec<i64> = wanted.into_iter().collect();
        let category_ids: HashMap<i64, i64> = self
            .resolver
            .resolve_by_external_ids(&wanted)?
            .into_iter()
            .filter_map(|c| Some((c.external_id?, c.id?)))
            .collect();

        for (slot, record) in sources.iter().enumerate() {
            links.replace(
                slot,
                record
                    .category_external_ids
                    .iter()
                    .filter_map(|eid| category_ids.get(eid).copied()),
            );
        }

        debug!(added, updated, links = links.len(), "商品对账完成");
        Ok(Reconciliation {
            touched: TouchedSet::Products { products, links },
            added,
            updated,
        })
    }

    /// 原子提交全部触及实体
    pub fn commit(&self, touched: TouchedSet) -> Result<usize, ImportError> {
        let saved = match touched {
            TouchedSet::Categories(categories) => self.store.save_categories(categories)?.len(),
            TouchedSet::Products { products, links } => {
                self.store.save_products(products, &links)?.len()
            }
        };
        Ok(saved)
    }
}

/// 按构造顺序校验触及实体，首个违规即失败
pub fn validate_touched(validator: &dyn FieldValidator, touched: &TouchedSet) -> Result<(), ImportError> {
    let first = match touched {
        TouchedSet::Categories(categories) => categories
            .iter()
            .find_map(|c| validator.validate_category(c).into_iter().next()),
        TouchedSet::Products { products, .. } => products
            .iter()
            .find_map(|p| validator.validate_product(p).into_iter().next()),
    };

    match first {
        Some(violation) => Err(ImportError::ValidationFailed {
            field: violation.property_path,
            message: violation.message,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use crate::engine::category_resolver::StoreCategoryResolver;
    use crate::importer::field_validator::ConstraintValidator;
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use crate::repository::SqliteCatalogStore;
    use rusqlite::Connection;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // 记录调用次数、可注入保存失败的存储
    struct RecordingStore {
        inner: SqliteCatalogStore,
        find_calls: AtomicUsize,
        fail_saves: bool,
    }

    impl RecordingStore {
        fn new(fail_saves: bool) -> Self {
            let conn = Connection::open_in_memory().unwrap();
            configure_sqlite_connection(&conn).unwrap();
            init_schema(&conn).unwrap();
            Self {
                inner: SqliteCatalogStore::from_connection(Arc::new(Mutex::new(conn))),
                find_calls: AtomicUsize::new(0),
                fail_saves,
            }
        }

        fn save_failure() -> RepositoryError {
            RepositoryError::DatabaseTransactionError("注入的保存失败".to_string())
        }
    }

    impl CatalogStore for RecordingStore {
        fn find_categories_by_external_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<Category>> {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_categories_by_external_ids(ids)
        }
        fn find_products_by_external_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<Product>> {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_products_by_external_ids(ids)
        }
        fn load_product_links(&self, ids: &[i64]) -> RepositoryResult<Vec<(i64, i64)>> {
            self.inner.load_product_links(ids)
        }
        fn save_categories(&self, c: Vec<Category>) -> RepositoryResult<Vec<Category>> {
            if self.fail_saves {
                return Err(Self::save_failure());
            }
            self.inner.save_categories(c)
        }
        fn save_products(&self, p: Vec<Product>, l: &LinkTable<usize>) -> RepositoryResult<Vec<Product>> {
            if self.fail_saves {
                return Err(Self::save_failure());
            }
            self.inner.save_products(p, l)
        }
        fn save_product(&self, p: Product, c: &[i64]) -> RepositoryResult<Product> {
            self.inner.save_product(p, c)
        }
        fn get_product(&self, id: i64) -> RepositoryResult<Option<Product>> {
            self.inner.get_product(id)
        }
        fn list_products(&self) -> RepositoryResult<Vec<Product>> {
            self.inner.list_products()
        }
        fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
            self.inner.list_categories()
        }
        fn categories_of_product(&self, id: i64) -> RepositoryResult<Vec<Category>> {
            self.inner.categories_of_product(id)
        }
        fn products_of_category(&self, id: i64) -> RepositoryResult<Vec<Product>> {
            self.inner.products_of_category(id)
        }
        fn count_categories(&self) -> RepositoryResult<usize> {
            self.inner.count_categories()
        }
        fn count_products(&self) -> RepositoryResult<usize> {
            self.inner.count_products()
        }
        fn delete_product(&self, id: i64) -> RepositoryResult<bool> {
            self.inner.delete_product(id)
        }
        fn delete_category(&self, id: i64) -> RepositoryResult<bool> {
            self.inner.delete_category(id)
        }
    }

    fn engine(store: Arc<RecordingStore>) -> ReconciliationEngine<RecordingStore> {
        let resolver = Box::new(StoreCategoryResolver::new(store.clone()));
        ReconciliationEngine::new(store, resolver)
    }

    fn category_record(external_id: i64, title: &str, position: usize) -> CategoryRecord {
        CategoryRecord {
            external_id,
            title: title.to_string(),
            position,
        }
    }

    fn product_record(external_id: i64, title: &str, price: f64, cats: Vec<i64>, position: usize) -> ProductRecord {
        ProductRecord {
            external_id,
            title: title.to_string(),
            price: Some(price),
            category_external_ids: cats,
            position,
        }
    }

    #[test]
    fn test_empty_batch_skips_store() {
        let store = Arc::new(RecordingStore::new(false));
        let result = engine(store.clone())
            .reconcile(&RecordBatch::Categories(vec![]))
            .unwrap();

        assert_eq!((result.added, result.updated), (0, 0));
        assert!(result.touched.is_empty());
        assert_eq!(store.find_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_partition_updates_then_adds() {
        let store = Arc::new(RecordingStore::new(false));
        store
            .save_categories(vec![Category::new("Old", Some(2))])
            .unwrap();

        let batch = RecordBatch::Categories(vec![
            category_record(1, "Books", 1),
            category_record(2, "Games", 2),
        ]);
        let result = engine(store.clone()).reconcile(&batch).unwrap();

        assert_eq!((result.added, result.updated), (1, 1));
        match result.touched {
            TouchedSet::Categories(categories) => {
                assert_eq!(categories[0].title, "Games");
                assert!(categories[0].is_persisted());
                assert_eq!(categories[1].title, "Books");
                assert!(!categories[1].is_persisted());
            }
            _ => panic!("期望类目集合"),
        }
        assert_eq!(store.find_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_duplicate_detected_before_store_lookup() {
        let store = Arc::new(RecordingStore::new(false));
        let batch = RecordBatch::Categories(vec![
            category_record(5, "Aaa", 1),
            category_record(5, "Bbb", 2),
        ]);

        let err = engine(store.clone()).reconcile(&batch).unwrap_err();

        assert!(matches!(err, ImportError::DuplicateExternalId { external_id: 5 }));
        assert_eq!(store.find_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_product_links_are_rebuilt_not_merged() {
        let store = Arc::new(RecordingStore::new(false));
        let cats = store
            .save_categories(vec![
                Category::new("Phones", Some(10)),
                Category::new("Tablets", Some(11)),
            ])
            .unwrap();
        let phones = cats[0].id.unwrap();
        let tablets = cats[1].id.unwrap();
        store
            .save_product(Product::new("Phone", Some(50.0), Some(1)), &[phones])
            .unwrap();

        let batch = RecordBatch::Products(vec![product_record(1, "Phone", 60.0, vec![11, 999], 1)]);
        let result = engine(store).reconcile(&batch).unwrap();

        assert_eq!((result.added, result.updated), (0, 1));
        match result.touched {
            TouchedSet::Products { links, .. } => {
                assert_eq!(links.categories_of(0), vec![tablets]);
                assert!(links.products_of(phones).is_empty());
            }
            _ => panic!("期望商品集合"),
        }
    }

    #[test]
    fn test_category_ids_resolved_once_per_batch() {
        let store = Arc::new(RecordingStore::new(false));
        let cats = store
            .save_categories(vec![
                Category::new("Phones", Some(10)),
                Category::new("Tablets", Some(11)),
            ])
            .unwrap();

        let batch = RecordBatch::Products(vec![
            product_record(1, "Phone", 10.0, vec![10], 1),
            product_record(2, "Tab", 20.0, vec![10, 11], 2),
            product_record(3, "Cable", 1.0, vec![11, 404], 3),
        ]);
        let result = engine(store.clone()).reconcile(&batch).unwrap();

        // 商品一次 + 类目一次
        assert_eq!(store.find_calls.load(Ordering::SeqCst), 2);
        match result.touched {
            TouchedSet::Products { links, .. } => {
                assert_eq!(links.categories_of(0), vec![cats[0].id.unwrap()]);
                assert_eq!(links.categories_of(2), vec![cats[1].id.unwrap()]);
                assert_eq!(links.len(), 4);
            }
            _ => panic!("期望商品集合"),
        }
    }

    #[test]
    fn test_validate_touched_reports_first_violation() {
        let touched = TouchedSet::Categories(vec![
            Category::new("Books", Some(1)),
            Category::new("B", Some(2)),
            Category::new("", Some(3)),
        ]);

        let err = validate_touched(&ConstraintValidator::default(), &touched).unwrap_err();
        match err {
            ImportError::ValidationFailed { field, message } => {
                assert_eq!(field, "title");
                assert!(message.contains("长度"));
            }
            other => panic!("期望 ValidationFailed，实际 {:?}", other),
        }
    }

    #[test]
    fn test_commit_failure_propagates_as_persistence() {
        let store = Arc::new(RecordingStore::new(true));
        let engine = engine(store.clone());
        let result = engine
            .reconcile(&RecordBatch::Categories(vec![category_record(1, "Books", 1)]))
            .unwrap();

        let err = engine.commit(result.touched).unwrap_err();

        assert!(matches!(err, ImportError::Persistence(_)));
        assert_eq!(store.count_categories().unwrap(), 0);
    }
}
