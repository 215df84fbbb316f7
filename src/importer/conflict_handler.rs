// ==========================================
// 商品目录导入系统 - 冲突处理器实现
// ==========================================
// 职责: 检测同批次内重复 eId
// 范围: 整个输入（含已存在实体对应的记录），在分类 UPDATE/ADD 之前执行
// ==========================================

use crate::domain::import::RecordBatch;
use crate::importer::catalog_importer_trait::ConflictHandler as ConflictHandlerTrait;
use std::collections::HashSet;

pub struct ConflictHandler;

impl ConflictHandler {
    /// 首个重复记录（按输入顺序）
    pub fn first_duplicate(&self, batch: &RecordBatch) -> Option<(usize, i64)> {
        self.detect_duplicates(batch).into_iter().next()
    }
}

impl ConflictHandlerTrait for ConflictHandler {
    fn detect_duplicates(&self, batch: &RecordBatch) -> Vec<(usize, i64)> {
        let mut seen: HashSet<i64> = HashSet::new();
        let mut duplicates = Vec::new();

        for (position, external_id) in batch.external_ids() {
            if !seen.insert(external_id) {
                duplicates.push((position, external_id));
            }
        }

        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::import::CategoryRecord;

    fn category(external_id: i64, position: usize) -> CategoryRecord {
        CategoryRecord {
            external_id,
            title: format!("Cat{}", external_id),
            position,
        }
    }

    #[test]
    fn test_detect_duplicates() {
        let batch = RecordBatch::Categories(vec![
            category(5, 1),
            category(6, 2),
            category(5, 3),
            category(6, 4),
        ]);

        let duplicates = ConflictHandler.detect_duplicates(&batch);

        assert_eq!(duplicates, vec![(3, 5), (4, 6)]);
        assert_eq!(ConflictHandler.first_duplicate(&batch), Some((3, 5)));
    }

    #[test]
    fn test_no_duplicates() {
        let batch = RecordBatch::Categories(vec![category(1, 1), category(2, 2)]);
        assert!(ConflictHandler.detect_duplicates(&batch).is_empty());
    }
}
