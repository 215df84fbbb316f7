// ==========================================
// 商品目录导入系统 - 商品变更邮件通知
// ==========================================
// 职责: 单商品保存提交后发送变更邮件
// 红线: 发送失败只返回错误给钩子列表记录，不影响保存结果
// ==========================================

use crate::config::notify_config_trait::NotifyConfigReader;
use crate::domain::types::ProductChangeKind;
use crate::engine::events::{PostCommitHook, ProductChangeEvent};
use crate::i18n::{t, t_with_args};
use crate::repository::error::RepositoryResult;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::error::Error;

/// SMTP 配置快照
#[derive(Debug, Clone, PartialEq)]
pub struct MailSettings {
    pub from: String,
    pub to: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
}

pub struct MailNotifier {
    settings: MailSettings,
}

impl MailNotifier {
    pub fn new(settings: MailSettings) -> Self {
        Self { settings }
    }

    /// 从配置构建；通知未启用时返回 None
    pub fn from_reader(reader: &dyn NotifyConfigReader) -> RepositoryResult<Option<Self>> {
        if !reader.is_notification_enabled()? {
            return Ok(None);
        }

        Ok(Some(Self::new(MailSettings {
            from: reader.get_admin_email()?,
            to: reader.get_notification_email()?,
            smtp_host: reader.get_smtp_host()?,
            smtp_port: reader.get_smtp_port()?,
            smtp_user: reader.get_smtp_user()?,
            smtp_password: reader.get_smtp_password()?,
        })))
    }

    /// 渲染 (主题, 正文)
    pub fn render(&self, event: &ProductChangeEvent) -> (String, String) {
        let key = match event.kind {
            ProductChangeKind::Created => "notify.product_created",
            ProductChangeKind::Updated => "notify.product_updated",
        };
        let body = t_with_args(key, &[("title", event.title.as_str())]);
        (t("notify.subject"), body)
    }

    fn build_message(&self, event: &ProductChangeEvent) -> Result<Message, Box<dyn Error + Send + Sync>> {
        let (subject, body) = self.render(event);

        let message = Message::builder()
            .from(
                self.settings
                    .from
                    .parse()
                    .map_err(|e| format!("发件人地址无效: {}", e))?,
            )
            .to(self
                .settings
                .to
                .parse()
                .map_err(|e| format!("收件人地址无效: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| format!("邮件构建失败: {}", e))?;

        Ok(message)
    }

    fn transport(&self) -> Result<SmtpTransport, Box<dyn Error + Send + Sync>> {
        let mailer = if self.settings.smtp_user.is_empty() {
            // 无认证（本地开发 SMTP）
            SmtpTransport::builder_dangerous(&self.settings.smtp_host)
                .port(self.settings.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.settings.smtp_user.clone(),
                self.settings.smtp_password.clone(),
            );
            SmtpTransport::relay(&self.settings.smtp_host)
                .map_err(|e| format!("SMTP relay 错误: {}", e))?
                .credentials(creds)
                .port(self.settings.smtp_port)
                .build()
        };
        Ok(mailer)
    }
}

impl PostCommitHook for MailNotifier {
    fn name(&self) -> &str {
        "mail"
    }

    fn on_commit(&self, event: &ProductChangeEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        let message = self.build_message(event)?;
        self.transport()?
            .send(&message)
            .map_err(|e| format!("邮件发送失败: {}", e))?;

        tracing::info!(
            product_id = event.product_id,
            kind = %event.kind,
            to = %self.settings.to,
            "商品变更邮件已发送"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::error::RepositoryResult;

    struct StaticConfig {
        enabled: bool,
    }

    impl NotifyConfigReader for StaticConfig {
        fn is_notification_enabled(&self) -> RepositoryResult<bool> {
            Ok(self.enabled)
        }
        fn get_admin_email(&self) -> RepositoryResult<String> {
            Ok("admin@shop.test".to_string())
        }
        fn get_notification_email(&self) -> RepositoryResult<String> {
            Ok("ops@shop.test".to_string())
        }
        fn get_smtp_host(&self) -> RepositoryResult<String> {
            Ok("localhost".to_string())
        }
        fn get_smtp_port(&self) -> RepositoryResult<u16> {
            Ok(1025)
        }
        fn get_smtp_user(&self) -> RepositoryResult<String> {
            Ok(String::new())
        }
        fn get_smtp_password(&self) -> RepositoryResult<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_disabled_notifier_is_not_built() {
        let notifier = MailNotifier::from_reader(&StaticConfig { enabled: false }).unwrap();
        assert!(notifier.is_none());
    }

    #[test]
    fn test_enabled_notifier_reads_addresses() {
        let notifier = MailNotifier::from_reader(&StaticConfig { enabled: true })
            .unwrap()
            .unwrap();
        assert_eq!(notifier.settings.from, "admin@shop.test");
        assert_eq!(notifier.settings.to, "ops@shop.test");
    }

    #[test]
    fn test_invalid_address_fails_before_sending() {
        let notifier = MailNotifier::new(MailSettings {
            from: "not an address".to_string(),
            to: "ops@shop.test".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_user: String::new(),
            smtp_password: String::new(),
        });

        let result = notifier.on_commit(&ProductChangeEvent::created(1, "Phone"));
        assert!(result.is_err());
    }

    #[test]
    fn test_render_mentions_title() {
        let notifier = MailNotifier::from_reader(&StaticConfig { enabled: true })
            .unwrap()
            .unwrap();
        let (_, body) = notifier.render(&ProductChangeEvent::created(1, "Phone"));
        assert!(body.contains("Phone"));
    }
}
