// ==========================================
// ProductApi 集成测试
// ==========================================
// 测试目标: 提交后钩子时机、钩子失败不影响保存、批量导入不触发钩子
// ==========================================

mod test_helpers;

use catalog_import::api::{ApiError, ProductApi};
use catalog_import::domain::{Category, Product, ProductChangeKind};
use catalog_import::engine::{PostCommitHook, PostCommitHooks, ProductChangeEvent};
use catalog_import::importer::{CatalogImporter, CatalogImporterImpl};
use catalog_import::repository::{CatalogStore, SqliteCatalogStore};
use std::error::Error;
use std::sync::{Arc, Mutex};
use test_helpers::{create_test_db, write_json};

/// 记录事件，并在触发时确认商品已可从存储读到
struct RecordingHook {
    store: Arc<SqliteCatalogStore>,
    seen: Mutex<Vec<(ProductChangeEvent, bool)>>,
}

impl PostCommitHook for RecordingHook {
    fn name(&self) -> &str {
        "recording"
    }

    fn on_commit(&self, event: &ProductChangeEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        let visible = self.store.get_product(event.product_id)?.is_some();
        self.seen.lock().unwrap().push((event.clone(), visible));
        Ok(())
    }
}

struct FailingHook;

impl PostCommitHook for FailingHook {
    fn name(&self) -> &str {
        "failing"
    }

    fn on_commit(&self, _event: &ProductChangeEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        Err("SMTP 不可达".into())
    }
}

fn setup(db_path: &str, with_failing: bool) -> (Arc<SqliteCatalogStore>, Arc<RecordingHook>, ProductApi<SqliteCatalogStore>) {
    let store = Arc::new(SqliteCatalogStore::new(db_path).unwrap());
    let recorder = Arc::new(RecordingHook {
        store: store.clone(),
        seen: Mutex::new(Vec::new()),
    });

    let mut hooks = PostCommitHooks::new();
    if with_failing {
        hooks.register(Arc::new(FailingHook));
    }
    hooks.register(recorder.clone());

    let api = ProductApi::new(store.clone(), hooks);
    (store, recorder, api)
}

#[test]
fn test_hooks_run_after_commit_with_change_kind() {
    let (_db, db_path) = create_test_db().unwrap();
    let (_store, recorder, api) = setup(&db_path, false);

    let created = api.save(Product::new("Phone", Some(10.0), None), &[]).unwrap();
    let mut edited = created.clone();
    edited.apply_fields("Phone2", Some(12.0));
    api.save(edited, &[]).unwrap();

    let seen = recorder.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0.kind, ProductChangeKind::Created);
    assert_eq!(seen[1].0.kind, ProductChangeKind::Updated);
    assert_eq!(seen[1].0.title, "Phone2");
    assert!(seen.iter().all(|(_, visible)| *visible), "钩子执行时商品必须已提交");
}

#[test]
fn test_failing_hook_does_not_fail_save() {
    let (_db, db_path) = create_test_db().unwrap();
    let (store, recorder, api) = setup(&db_path, true);

    let saved = api.save(Product::new("Phone", Some(10.0), None), &[]).unwrap();

    assert!(saved.id.is_some());
    assert_eq!(store.count_products().unwrap(), 1);
    assert_eq!(recorder.seen.lock().unwrap().len(), 1);
}

#[test]
fn test_invalid_product_is_rejected_without_hooks() {
    let (_db, db_path) = create_test_db().unwrap();
    let (store, recorder, api) = setup(&db_path, false);

    let err = api.save(Product::new("Ph", Some(10.0), None), &[]).unwrap_err();

    assert!(matches!(err, ApiError::ValidationError(_)));
    assert_eq!(store.count_products().unwrap(), 0);
    assert!(recorder.seen.lock().unwrap().is_empty());
}

#[test]
fn test_batch_import_does_not_fire_hooks() {
    let (_db, db_path) = create_test_db().unwrap();
    let (store, recorder, api) = setup(&db_path, false);
    let importer = CatalogImporterImpl::with_defaults(store.clone());

    let file = write_json(r#"[{"eId": 1, "title": "Phone", "price": 100, "categoriesEId": []}]"#);
    importer.import_products(file.path()).unwrap();

    assert_eq!(api.list_all().unwrap().len(), 1);
    assert!(recorder.seen.lock().unwrap().is_empty());
}

#[test]
fn test_delete_get_and_categories() {
    let (_db, db_path) = create_test_db().unwrap();
    let (store, _recorder, api) = setup(&db_path, false);
    let category = store
        .save_categories(vec![Category::new("Phones", Some(1))])
        .unwrap()
        .remove(0);
    let category_id = category.id.unwrap();

    let saved = api
        .save(Product::new("Phone", Some(10.0), None), &[category_id])
        .unwrap();
    let id = saved.id.unwrap();

    assert_eq!(api.get(id).unwrap().title, "Phone");
    assert_eq!(api.categories_of(id).unwrap().len(), 1);

    api.delete(id).unwrap();
    assert!(matches!(api.get(id), Err(ApiError::NotFound(_))));
    assert!(matches!(api.delete(id), Err(ApiError::NotFound(_))));
    assert_eq!(store.count_categories().unwrap(), 1);
}
