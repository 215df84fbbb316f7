// ==========================================
// ImportApi 端到端测试
// ==========================================
// 测试目标: AppState 装配 → ImportApi → 导入器 → SQLite
// ==========================================

mod test_helpers;

use catalog_import::api::{ApiError, ImportApi};
use catalog_import::app::AppState;
use catalog_import::domain::types::EntityKind;
use catalog_import::importer::ImportError;
use catalog_import::repository::CatalogStore;
use std::path::Path;
use test_helpers::{create_test_db, fixture_path, write_json};

#[test]
fn test_import_categories_then_products_through_app_state() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();

    let categories = state
        .import_api
        .import(EntityKind::Category, &fixture_path("categories.json"))
        .unwrap();
    assert!(categories.added > 0);
    assert_eq!(categories.updated, 0);
    assert!(categories.message.contains(&categories.added.to_string()));

    let products = state
        .import_api
        .import(EntityKind::Product, &fixture_path("products.json"))
        .unwrap();
    assert!(products.added > 0);
    assert_eq!(products.kind, EntityKind::Product);

    assert_eq!(state.store.count_products().unwrap(), products.added);
    assert_eq!(state.product_api.list_all().unwrap().len(), products.added);
}

#[test]
fn test_reimport_reports_updates() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();
    let file = write_json(r#"[{"eId": 1, "title": "Phones"}, {"eId": 2, "title": "Books"}]"#);

    let first = state.import_api.import(EntityKind::Category, file.path()).unwrap();
    let second = state.import_api.import(EntityKind::Category, file.path()).unwrap();

    assert_eq!((first.added, first.updated), (2, 0));
    assert_eq!((second.added, second.updated), (0, 2));
    assert_eq!(state.store.count_categories().unwrap(), 2);
}

#[test]
fn test_missing_file_reports_load_failure() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();

    let err = state
        .import_api
        .import(EntityKind::Category, Path::new("/nonexistent/categories.json"))
        .unwrap_err();

    match &err {
        ApiError::Import(ImportError::LoadFailure { path, .. }) => {
            assert!(path.contains("categories.json"));
        }
        other => panic!("期望 LoadFailure，实际 {:?}", other),
    }
    assert!(ImportApi::render_error(&err).contains("categories.json"));
}

#[test]
fn test_duplicate_file_surfaces_import_error() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let state = AppState::new(db_path).unwrap();

    let err = state
        .import_api
        .import(EntityKind::Category, &fixture_path("duplicate_categories.json"))
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Import(ImportError::DuplicateExternalId { .. })
    ));
    assert_eq!(state.store.count_categories().unwrap(), 0);
}
