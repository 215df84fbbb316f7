// ==========================================
// 商品目录导入系统 - 通知层
// ==========================================

pub mod mail_notifier;

pub use mail_notifier::{MailNotifier, MailSettings};
