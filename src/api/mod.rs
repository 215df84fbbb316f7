// ==========================================
// 商品目录导入系统 - API层
// ==========================================
// 职责: 对 CLI 暴露的业务接口
// ==========================================

pub mod error;
pub mod import_api;
pub mod product_api;

pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse};
pub use product_api::ProductApi;
