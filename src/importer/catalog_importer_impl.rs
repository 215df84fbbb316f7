// ==========================================
// 商品目录导入系统 - 目录导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到数据库
// 流程: 解析 → 结构校验 → 重复检测 → 对账 → 字段校验 → 原子落库
// 并发: 同类实体导入在进程内串行（按类型加锁）
// ==========================================

use crate::domain::import::ImportResult;
use crate::domain::types::EntityKind;
use crate::engine::category_resolver::StoreCategoryResolver;
use crate::engine::reconciliation::{validate_touched, ReconciliationEngine};
use crate::importer::catalog_importer_trait::{
    CatalogImporter, FieldValidator, FileParser, RecordDecoder,
};
use crate::importer::error::ImportError;
use crate::importer::field_validator::ConstraintValidator;
use crate::importer::file_parser::JsonFileParser;
use crate::importer::schema_validator::SchemaValidator;
use crate::repository::catalog_store::CatalogStore;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// CatalogImporterImpl - 目录导入器实现
// ==========================================
pub struct CatalogImporterImpl<S>
where
    S: CatalogStore + 'static,
{
    // 对账引擎（持有存储）
    engine: ReconciliationEngine<S>,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    record_decoder: Box<dyn RecordDecoder>,
    field_validator: Box<dyn FieldValidator>,

    // 按实体类型串行化
    category_lock: Mutex<()>,
    product_lock: Mutex<()>,
}

impl<S> CatalogImporterImpl<S>
where
    S: CatalogStore + 'static,
{
    /// 创建新的 CatalogImporter 实例
    ///
    /// # 参数
    /// - store: 目录存储
    /// - file_parser: 文件解析器
    /// - record_decoder: 结构校验器
    /// - field_validator: 字段约束校验器
    pub fn new(
        store: Arc<S>,
        file_parser: Box<dyn FileParser>,
        record_decoder: Box<dyn RecordDecoder>,
        field_validator: Box<dyn FieldValidator>,
    ) -> Self {
        let resolver = Box::new(StoreCategoryResolver::new(store.clone()));
        Self {
            engine: ReconciliationEngine::new(store, resolver),
            file_parser,
            record_decoder,
            field_validator,
            category_lock: Mutex::new(()),
            product_lock: Mutex::new(()),
        }
    }

    /// 使用默认组件（JSON 解析 + 默认约束）
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(
            store,
            Box::new(JsonFileParser),
            Box::new(SchemaValidator),
            Box::new(ConstraintValidator::default()),
        )
    }

    fn lock_for(&self, kind: EntityKind) -> &Mutex<()> {
        match kind {
            EntityKind::Category => &self.category_lock,
            EntityKind::Product => &self.product_lock,
        }
    }

    #[instrument(skip(self), fields(batch_id))]
    fn run_import(&self, kind: EntityKind, file_path: &Path) -> Result<ImportResult, ImportError> {
        // 锁不保护数据，中毒后直接取回
        let _guard = self
            .lock_for(kind)
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(batch_id = %batch_id, kind = %kind, file_path = %file_path.display(), "开始导入");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let document = self.file_parser.parse_file(file_path).map_err(|e| {
            warn!(error = %e, "文件解析失败");
            e
        })?;

        // === 步骤 2: 结构校验 ===
        debug!("步骤 2: 结构校验");
        let batch = self.record_decoder.decode(kind, &document).map_err(|e| {
            warn!(error = %e, "结构校验失败");
            e
        })?;
        info!(total_records = batch.len(), "结构校验完成");

        // === 步骤 3: 对账 ===
        debug!("步骤 3: 对账");
        let reconciliation = self.engine.reconcile(&batch).map_err(|e| {
            warn!(error = %e, "对账失败");
            e
        })?;
        let result = ImportResult::new(reconciliation.added, reconciliation.updated);
        info!(added = result.added, updated = result.updated, "对账完成");

        if reconciliation.touched.is_empty() {
            info!(batch_id = %batch_id, "空输入，跳过落库");
            return Ok(result);
        }

        // === 步骤 4: 字段校验 ===
        debug!("步骤 4: 字段校验");
        validate_touched(self.field_validator.as_ref(), &reconciliation.touched).map_err(|e| {
            warn!(error = %e, "字段校验失败，整批放弃");
            e
        })?;

        // === 步骤 5: 原子落库 ===
        debug!("步骤 5: 落库");
        let saved = self.engine.commit(reconciliation.touched).map_err(|e| {
            tracing::error!(error = %e, "落库失败，事务已回滚");
            e
        })?;

        info!(
            batch_id = %batch_id,
            saved,
            added = result.added,
            updated = result.updated,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "导入完成"
        );
        Ok(result)
    }
}

impl<S> CatalogImporter for CatalogImporterImpl<S>
where
    S: CatalogStore + 'static,
{
    fn import_categories(&self, file_path: &Path) -> Result<ImportResult, ImportError> {
        self.run_import(EntityKind::Category, file_path)
    }

    fn import_products(&self, file_path: &Path) -> Result<ImportResult, ImportError> {
        self.run_import(EntityKind::Product, file_path)
    }
}
