// ==========================================
// 商品目录导入系统 - 目录存储实现
// ==========================================
// 职责: 使用 rusqlite 实现 CatalogStore
// 红线: 批量写入必须在单个事务内完成，失败时事务在 drop 时回滚
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::catalog::{Category, Product};
use crate::domain::links::LinkTable;
use crate::repository::catalog_store::CatalogStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult, Row, Transaction};
use std::sync::{Arc, Mutex};

const CATEGORY_COLUMNS: &str = "id, eid, title, created_at, updated_at";
const PRODUCT_COLUMNS: &str = "id, eid, title, price, created_at, updated_at";

// 单条 IN 查询的参数上限（SQLite 绑定变量数有限）
const IN_CHUNK_SIZE: usize = 900;

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn map_category(row: &Row) -> SqliteResult<Category> {
    Ok(Category {
        id: Some(row.get(0)?),
        external_id: row.get(1)?,
        title: row.get(2)?,
        created_at: parse_timestamp(&row.get::<_, String>(3)?),
        updated_at: parse_timestamp(&row.get::<_, String>(4)?),
    })
}

fn map_product(row: &Row) -> SqliteResult<Product> {
    Ok(Product {
        id: Some(row.get(0)?),
        external_id: row.get(1)?,
        title: row.get(2)?,
        price: Some(row.get(3)?),
        created_at: parse_timestamp(&row.get::<_, String>(4)?),
        updated_at: parse_timestamp(&row.get::<_, String>(5)?),
    })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

// ==========================================
// SqliteCatalogStore
// ==========================================
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogStore {
    /// 打开数据库并确保表结构存在
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中写入单个类目，返回主键
    fn write_category_tx(tx: &Transaction, category: &Category) -> RepositoryResult<i64> {
        match category.id {
            Some(id) => {
                let affected = tx.execute(
                    "UPDATE category SET title = ?1, eid = ?2, updated_at = ?3 WHERE id = ?4",
                    params![
                        category.title,
                        category.external_id,
                        category.updated_at.to_rfc3339(),
                        id
                    ],
                )?;
                if affected == 0 {
                    return Err(RepositoryError::NotFound {
                        entity: "Category".to_string(),
                        id: id.to_string(),
                    });
                }
                Ok(id)
            }
            None => {
                tx.execute(
                    "INSERT INTO category (title, eid, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        category.title,
                        category.external_id,
                        category.created_at.to_rfc3339(),
                        category.updated_at.to_rfc3339()
                    ],
                )?;
                Ok(tx.last_insert_rowid())
            }
        }
    }

    /// 在事务中写入单个商品，返回主键
    fn write_product_tx(tx: &Transaction, product: &Product) -> RepositoryResult<i64> {
        let price = product.price.ok_or_else(|| RepositoryError::FieldValueError {
            field: "price".to_string(),
            message: "价格不能为空".to_string(),
        })?;

        match product.id {
            Some(id) => {
                let affected = tx.execute(
                    "UPDATE product SET title = ?1, price = ?2, eid = ?3, updated_at = ?4 WHERE id = ?5",
                    params![
                        product.title,
                        price,
                        product.external_id,
                        product.updated_at.to_rfc3339(),
                        id
                    ],
                )?;
                if affected == 0 {
                    return Err(RepositoryError::NotFound {
                        entity: "Product".to_string(),
                        id: id.to_string(),
                    });
                }
                Ok(id)
            }
            None => {
                tx.execute(
                    "INSERT INTO product (title, price, eid, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        product.title,
                        price,
                        product.external_id,
                        product.created_at.to_rfc3339(),
                        product.updated_at.to_rfc3339()
                    ],
                )?;
                Ok(tx.last_insert_rowid())
            }
        }
    }

    /// 在事务中整体重写商品的关联行（先全删，再插入）
    fn rewrite_links_tx(
        tx: &Transaction,
        product_id: i64,
        category_ids: &[i64],
    ) -> RepositoryResult<()> {
        tx.execute(
            "DELETE FROM category_product WHERE product_id = ?1",
            params![product_id],
        )?;

        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO category_product (product_id, category_id) VALUES (?1, ?2)",
        )?;
        for category_id in category_ids {
            stmt.execute(params![product_id, category_id])?;
        }
        Ok(())
    }

    fn count_rows(&self, table: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn find_categories_by_external_ids(
        &self,
        external_ids: &[i64],
    ) -> RepositoryResult<Vec<Category>> {
        if external_ids.is_empty() {
            return Ok(vec![]);
        }

        let conn = self.get_conn()?;
        let mut categories = Vec::with_capacity(external_ids.len());
        for chunk in external_ids.chunks(IN_CHUNK_SIZE) {
            let query = format!(
                "SELECT {} FROM category WHERE eid IN ({})",
                CATEGORY_COLUMNS,
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), map_category)?
                .collect::<SqliteResult<Vec<_>>>()?;
            categories.extend(rows);
        }

        // 分块后恢复按主键排序
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    fn find_products_by_external_ids(
        &self,
        external_ids: &[i64],
    ) -> RepositoryResult<Vec<Product>> {
        if external_ids.is_empty() {
            return Ok(vec![]);
        }

        let conn = self.get_conn()?;
        let mut products = Vec::with_capacity(external_ids.len());
        for chunk in external_ids.chunks(IN_CHUNK_SIZE) {
            let query = format!(
                "SELECT {} FROM product WHERE eid IN ({})",
                PRODUCT_COLUMNS,
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), map_product)?
                .collect::<SqliteResult<Vec<_>>>()?;
            products.extend(rows);
        }

        products.sort_by_key(|p| p.id);
        Ok(products)
    }

    fn load_product_links(&self, product_ids: &[i64]) -> RepositoryResult<Vec<(i64, i64)>> {
        if product_ids.is_empty() {
            return Ok(vec![]);
        }

        let conn = self.get_conn()?;
        let mut links = Vec::new();
        for chunk in product_ids.chunks(IN_CHUNK_SIZE) {
            let query = format!(
                "SELECT product_id, category_id FROM category_product WHERE product_id IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = conn.prepare(&query)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?
                .collect::<SqliteResult<Vec<(i64, i64)>>>()?;
            links.extend(rows);
        }

        links.sort_unstable();
        Ok(links)
    }

    fn save_categories(&self, categories: Vec<Category>) -> RepositoryResult<Vec<Category>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut saved = Vec::with_capacity(categories.len());
        for mut category in categories {
            category.id = Some(Self::write_category_tx(&tx, &category)?);
            saved.push(category);
        }

        tx.commit()?;
        Ok(saved)
    }

    fn save_products(
        &self,
        products: Vec<Product>,
        links: &LinkTable<usize>,
    ) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut saved = Vec::with_capacity(products.len());
        for (slot, mut product) in products.into_iter().enumerate() {
            let product_id = Self::write_product_tx(&tx, &product)?;
            Self::rewrite_links_tx(&tx, product_id, &links.categories_of(slot))?;
            product.id = Some(product_id);
            saved.push(product);
        }

        tx.commit()?;
        Ok(saved)
    }

    fn save_product(&self, mut product: Product, category_ids: &[i64]) -> RepositoryResult<Product> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let product_id = Self::write_product_tx(&tx, &product)?;
        Self::rewrite_links_tx(&tx, product_id, category_ids)?;

        tx.commit()?;
        product.id = Some(product_id);
        Ok(product)
    }

    fn get_product(&self, id: i64) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            &format!("SELECT {} FROM product WHERE id = ?1", PRODUCT_COLUMNS),
            params![id],
            map_product,
        );

        match result {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM product ORDER BY id", PRODUCT_COLUMNS))?;
        let products = stmt
            .query_map([], map_product)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(products)
    }

    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {} FROM category ORDER BY id", CATEGORY_COLUMNS))?;
        let categories = stmt
            .query_map([], map_category)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(categories)
    }

    fn categories_of_product(&self, product_id: i64) -> RepositoryResult<Vec<Category>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, c.eid, c.title, c.created_at, c.updated_at
            FROM category c
            JOIN category_product cp ON cp.category_id = c.id
            WHERE cp.product_id = ?1
            ORDER BY c.id
            "#,
        )?;
        let categories = stmt
            .query_map(params![product_id], map_category)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(categories)
    }

    fn products_of_category(&self, category_id: i64) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.id, p.eid, p.title, p.price, p.created_at, p.updated_at
            FROM product p
            JOIN category_product cp ON cp.product_id = p.id
            WHERE cp.category_id = ?1
            ORDER BY p.id
            "#,
        )?;
        let products = stmt
            .query_map(params![category_id], map_product)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(products)
    }

    fn count_categories(&self) -> RepositoryResult<usize> {
        self.count_rows("category")
    }

    fn count_products(&self) -> RepositoryResult<usize> {
        self.count_rows("product")
    }

    fn delete_product(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM product WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    fn delete_category(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM category WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::configure_sqlite_connection;

    fn memory_store() -> SqliteCatalogStore {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        SqliteCatalogStore::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_save_categories_assigns_ids() {
        let store = memory_store();
        let saved = store
            .save_categories(vec![
                Category::new("Books", Some(1)),
                Category::new("Games", Some(2)),
            ])
            .unwrap();

        assert!(saved.iter().all(|c| c.id.is_some()));
        let found = store.find_categories_by_external_ids(&[2, 99]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Games");
    }

    #[test]
    fn test_empty_external_ids_short_circuit() {
        let store = memory_store();
        assert!(store.find_products_by_external_ids(&[]).unwrap().is_empty());
        assert!(store.load_product_links(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_null_price_rolls_back_batch() {
        let store = memory_store();
        let result = store.save_products(
            vec![
                Product::new("Phone", Some(10.0), Some(1)),
                Product::new("Broken", None, Some(2)),
            ],
            &LinkTable::new(),
        );

        assert!(matches!(result, Err(RepositoryError::FieldValueError { .. })));
        assert_eq!(store.count_products().unwrap(), 0);
    }

    #[test]
    fn test_update_missing_row_is_not_found() {
        let store = memory_store();
        let mut ghost = Category::new("Ghost", None);
        ghost.id = Some(42);

        let result = store.save_categories(vec![ghost]);
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[test]
    fn test_lookup_spans_multiple_chunks_in_id_order() {
        let store = memory_store();
        let total = IN_CHUNK_SIZE * 2 + 17;
        let categories: Vec<Category> = (0..total as i64)
            .map(|i| Category::new(format!("Cat{}", i), Some(i)))
            .collect();
        store.save_categories(categories).unwrap();

        let wanted: Vec<i64> = (0..total as i64).rev().collect();
        let found = store.find_categories_by_external_ids(&wanted).unwrap();

        assert_eq!(found.len(), total);
        assert!(found.windows(2).all(|w| w[0].id < w[1].id));
    }
}

