// ==========================================
// 商品目录导入系统 - 字段约束校验器实现
// ==========================================
// 规则:
// - title: 非空白（去除首尾空白后判断），长度 [3, 12] 个字符
// - price: 非 null，范围 [0, 200]
// 顺序: title 非空白 → title 长度 → price 非 null → price 范围
// ==========================================

use crate::domain::catalog::{Category, Product};
use crate::domain::import::FieldViolation;
use crate::importer::catalog_importer_trait::FieldValidator as FieldValidatorTrait;

pub struct ConstraintValidator {
    title_min_chars: usize,
    title_max_chars: usize,
    price_min: f64,
    price_max: f64,
}

impl ConstraintValidator {
    pub fn new(title_min_chars: usize, title_max_chars: usize, price_min: f64, price_max: f64) -> Self {
        Self {
            title_min_chars,
            title_max_chars,
            price_min,
            price_max,
        }
    }

    fn check_title(&self, title: &str, violations: &mut Vec<FieldViolation>) {
        if title.trim().is_empty() {
            violations.push(FieldViolation::new("title", "不能为空白"));
        }

        // 空串只报告非空白
        if title.is_empty() {
            return;
        }

        let chars = title.chars().count();
        if chars < self.title_min_chars || chars > self.title_max_chars {
            violations.push(FieldViolation::new(
                "title",
                format!(
                    "长度必须在 {} 到 {} 个字符之间（当前 {}）",
                    self.title_min_chars, self.title_max_chars, chars
                ),
            ));
        }
    }

    fn check_price(&self, price: Option<f64>, violations: &mut Vec<FieldViolation>) {
        match price {
            None => violations.push(FieldViolation::new("price", "不能为空")),
            Some(value) if value < self.price_min || value > self.price_max => {
                violations.push(FieldViolation::new(
                    "price",
                    format!(
                        "必须在 {} 到 {} 之间（当前 {}）",
                        self.price_min, self.price_max, value
                    ),
                ));
            }
            Some(_) => {}
        }
    }
}

impl Default for ConstraintValidator {
    fn default() -> Self {
        Self::new(3, 12, 0.0, 200.0)
    }
}

impl FieldValidatorTrait for ConstraintValidator {
    fn validate_category(&self, category: &Category) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        self.check_title(&category.title, &mut violations);
        violations
    }

    fn validate_product(&self, product: &Product) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        self.check_title(&product.title, &mut violations);
        self.check_price(product.price, &mut violations);
        violations
    }
}
