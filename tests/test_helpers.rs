// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、JSON 文件生成等功能
// ==========================================

#![allow(dead_code)]

use catalog_import::db::{init_schema, open_sqlite_connection};
use catalog_import::importer::CatalogImporterImpl;
use catalog_import::repository::SqliteCatalogStore;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 将 JSON 文本写入临时 .json 文件
pub fn write_json(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// tests/fixtures 下的文件路径
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// 创建存储与默认导入器（共享同一存储）
pub fn create_importer(
    db_path: &str,
) -> (Arc<SqliteCatalogStore>, CatalogImporterImpl<SqliteCatalogStore>) {
    let store = Arc::new(SqliteCatalogStore::new(db_path).unwrap());
    let importer = CatalogImporterImpl::with_defaults(store.clone());
    (store, importer)
}
