// ==========================================
// 商品目录导入系统 - 通知配置读取 Trait
// ==========================================
// 职责: 定义变更通知所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;

// ==========================================
// NotifyConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait NotifyConfigReader: Send + Sync {
    /// 是否启用商品变更邮件
    ///
    /// # 默认值
    /// - false
    fn is_notification_enabled(&self) -> RepositoryResult<bool>;

    /// 发件人地址
    ///
    /// # 默认值
    /// - admin@localhost
    fn get_admin_email(&self) -> RepositoryResult<String>;

    /// 收件人地址
    ///
    /// # 默认值
    /// - catalog@localhost
    fn get_notification_email(&self) -> RepositoryResult<String>;

    /// # 默认值
    /// - localhost
    fn get_smtp_host(&self) -> RepositoryResult<String>;

    /// # 默认值
    /// - 1025
    fn get_smtp_port(&self) -> RepositoryResult<u16>;

    /// 为空时不做认证
    fn get_smtp_user(&self) -> RepositoryResult<String>;

    fn get_smtp_password(&self) -> RepositoryResult<String>;
}
