// ==========================================
// 商品目录导入系统 - 文件解析器实现
// ==========================================
// 支持: UTF-8 JSON (.json)
// ==========================================

use crate::importer::catalog_importer_trait::FileParser;
use crate::importer::error::ImportError;
use std::fs;
use std::path::Path;
use tracing::debug;

// ==========================================
// JSON Parser 实现
// ==========================================
pub struct JsonFileParser;

impl FileParser for JsonFileParser {
    fn parse_file(&self, file_path: &Path) -> Result<serde_json::Value, ImportError> {
        let path = file_path.display().to_string();

        if !file_path.exists() {
            return Err(ImportError::LoadFailure {
                path,
                message: "文件不存在".to_string(),
            });
        }

        let content = fs::read_to_string(file_path).map_err(|e| ImportError::LoadFailure {
            path: path.clone(),
            message: e.to_string(),
        })?;

        // 兼容带 BOM 的文件
        let content = content.trim_start_matches('\u{feff}');

        let document: serde_json::Value = serde_json::from_str(content)?;
        debug!(path = %path, bytes = content.len(), "JSON 文件解析完成");
        Ok(document)
    }
}
