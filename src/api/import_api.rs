// ==========================================
// 目录导入API
// ==========================================
// 职责: 封装类目/商品导入，生成本地化结果消息
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::EntityKind;
use crate::i18n::t_with_args;
use crate::importer::CatalogImporter;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 实体类型
    pub kind: EntityKind,
    /// 新增数量
    pub added: usize,
    /// 更新数量
    pub updated: usize,
    /// 本地化结果消息
    pub message: String,
    /// 导入耗时（毫秒）
    pub elapsed_ms: u64,
}

pub struct ImportApi {
    importer: Arc<dyn CatalogImporter>,
}

impl ImportApi {
    pub fn new(importer: Arc<dyn CatalogImporter>) -> Self {
        Self { importer }
    }

    /// 执行导入
    ///
    /// # 返回
    /// - Ok: 新增/更新计数与成功消息
    /// - Err(Import): 导入失败（整批未落库），文件不存在时为 LoadFailure
    pub fn import(&self, kind: EntityKind, file_path: &Path) -> ApiResult<ImportApiResponse> {
        let start = Instant::now();
        let result = self.importer.import(kind, file_path)?;

        let message = t_with_args(
            "import.success",
            &[
                ("added", &result.added.to_string()),
                ("updated", &result.updated.to_string()),
            ],
        );

        Ok(ImportApiResponse {
            kind,
            added: result.added,
            updated: result.updated,
            message,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// 渲染失败消息
    pub fn render_error(err: &ApiError) -> String {
        t_with_args("import.failed", &[("reason", &err.to_string())])
    }
}
