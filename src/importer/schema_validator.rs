// ==========================================
// 商品目录导入系统 - 记录结构校验
// ==========================================
// 职责: 检查每条记录的必填字段与类型，转换为 RecordBatch
// 红线: 任一记录不合格即整批失败（MalformedRecord），不做跳过
// ==========================================

use crate::domain::import::{CategoryRecord, ProductRecord, RecordBatch};
use crate::domain::types::EntityKind;
use crate::importer::catalog_importer_trait::RecordDecoder;
use crate::importer::error::ImportError;
use serde_json::{Map, Value};

const FIELD_EXTERNAL_ID: &str = "eId";
const FIELD_TITLE: &str = "title";
const FIELD_PRICE: &str = "price";
const FIELD_CATEGORIES: &str = "categoriesEId";

pub struct SchemaValidator;

impl SchemaValidator {
    fn malformed(position: usize, message: impl Into<String>) -> ImportError {
        ImportError::MalformedRecord {
            position,
            message: message.into(),
        }
    }

    fn as_object(position: usize, value: &Value) -> Result<&Map<String, Value>, ImportError> {
        value
            .as_object()
            .ok_or_else(|| Self::malformed(position, "记录必须是 JSON 对象"))
    }

    fn check_required(
        position: usize,
        object: &Map<String, Value>,
        kind: EntityKind,
    ) -> Result<(), ImportError> {
        match kind
            .required_fields()
            .iter()
            .find(|field| !object.contains_key(**field))
        {
            Some(field) => Err(Self::malformed(position, format!("缺少字段 {}", field))),
            None => Ok(()),
        }
    }

    fn required<'a>(
        position: usize,
        object: &'a Map<String, Value>,
        field: &str,
    ) -> Result<&'a Value, ImportError> {
        object
            .get(field)
            .ok_or_else(|| Self::malformed(position, format!("缺少字段 {}", field)))
    }

    fn external_id(position: usize, object: &Map<String, Value>) -> Result<i64, ImportError> {
        Self::required(position, object, FIELD_EXTERNAL_ID)?
            .as_i64()
            .ok_or_else(|| Self::malformed(position, format!("{} 必须是整数", FIELD_EXTERNAL_ID)))
    }

    fn title(position: usize, object: &Map<String, Value>) -> Result<String, ImportError> {
        Self::required(position, object, FIELD_TITLE)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Self::malformed(position, format!("{} 必须是字符串", FIELD_TITLE)))
    }

    /// price 允许显式 null（留给字段校验报告 NotNull），但字段本身必须存在
    fn price(position: usize, object: &Map<String, Value>) -> Result<Option<f64>, ImportError> {
        match Self::required(position, object, FIELD_PRICE)? {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| Self::malformed(position, format!("{} 数值无效", FIELD_PRICE))),
            _ => Err(Self::malformed(
                position,
                format!("{} 必须是数字", FIELD_PRICE),
            )),
        }
    }

    fn category_external_ids(
        position: usize,
        object: &Map<String, Value>,
    ) -> Result<Vec<i64>, ImportError> {
        let items = Self::required(position, object, FIELD_CATEGORIES)?
            .as_array()
            .ok_or_else(|| Self::malformed(position, format!("{} 必须是数组", FIELD_CATEGORIES)))?;

        items
            .iter()
            .map(|item| {
                item.as_i64().ok_or_else(|| {
                    Self::malformed(position, format!("{} 元素必须是整数", FIELD_CATEGORIES))
                })
            })
            .collect()
    }

    /// 解码类目数组
    pub fn decode_categories(&self, items: &[Value]) -> Result<Vec<CategoryRecord>, ImportError> {
        items
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                let position = idx + 1;
                let object = Self::as_object(position, value)?;
                Self::check_required(position, object, EntityKind::Category)?;
                Ok(CategoryRecord {
                    external_id: Self::external_id(position, object)?,
                    title: Self::title(position, object)?,
                    position,
                })
            })
            .collect()
    }

    /// 解码商品数组
    pub fn decode_products(&self, items: &[Value]) -> Result<Vec<ProductRecord>, ImportError> {
        items
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                let position = idx + 1;
                let object = Self::as_object(position, value)?;
                Self::check_required(position, object, EntityKind::Product)?;
                Ok(ProductRecord {
                    external_id: Self::external_id(position, object)?,
                    title: Self::title(position, object)?,
                    price: Self::price(position, object)?,
                    category_external_ids: Self::category_external_ids(position, object)?,
                    position,
                })
            })
            .collect()
    }
}

impl RecordDecoder for SchemaValidator {
    fn decode(&self, kind: EntityKind, document: &Value) -> Result<RecordBatch, ImportError> {
        let items = document
            .as_array()
            .ok_or_else(|| Self::malformed(0, "顶层必须是 JSON 数组"))?;

        match kind {
            EntityKind::Category => Ok(RecordBatch::Categories(self.decode_categories(items)?)),
            EntityKind::Product => Ok(RecordBatch::Products(self.decode_products(items)?)),
        }
    }
}
