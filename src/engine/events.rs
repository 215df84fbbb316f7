// ==========================================
// 商品目录导入系统 - 提交后事件
// ==========================================
// 职责: 单商品保存成功后通知下游（如邮件）
// 红线:
// - 只在事务提交之后触发，批量导入不触发
// - 钩子失败（含 panic）只记录 warn，不改变保存结果
// ==========================================

use crate::domain::types::ProductChangeKind;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// 商品变更事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductChangeEvent {
    pub kind: ProductChangeKind,
    pub product_id: i64,
    pub title: String,
}

impl ProductChangeEvent {
    pub fn created(product_id: i64, title: impl Into<String>) -> Self {
        Self {
            kind: ProductChangeKind::Created,
            product_id,
            title: title.into(),
        }
    }

    pub fn updated(product_id: i64, title: impl Into<String>) -> Self {
        Self {
            kind: ProductChangeKind::Updated,
            product_id,
            title: title.into(),
        }
    }
}

// ==========================================
// 提交后钩子 Trait
// ==========================================

/// 提交后钩子
///
/// # 实现说明
/// - `MailNotifier` 发送变更邮件
/// - 测试中可用记录型实现断言触发时机
pub trait PostCommitHook: Send + Sync {
    /// 钩子名称（日志用）
    fn name(&self) -> &str;

    fn on_commit(&self, event: &ProductChangeEvent) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空操作钩子
#[derive(Debug, Clone, Default)]
pub struct NoOpHook;

impl PostCommitHook for NoOpHook {
    fn name(&self) -> &str {
        "noop"
    }

    fn on_commit(&self, event: &ProductChangeEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpHook: 跳过事件 - product_id={}, kind={}",
            event.product_id,
            event.kind
        );
        Ok(())
    }
}

/// 钩子列表
#[derive(Default, Clone)]
pub struct PostCommitHooks {
    hooks: Vec<Arc<dyn PostCommitHook>>,
}

impl PostCommitHooks {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn register(&mut self, hook: Arc<dyn PostCommitHook>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// 依次执行全部钩子，返回失败数量
    pub fn run_all(&self, event: &ProductChangeEvent) -> usize {
        let mut failures = 0;

        for hook in &self.hooks {
            let outcome = catch_unwind(AssertUnwindSafe(|| hook.on_commit(event)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    failures += 1;
                    tracing::warn!(
                        hook = hook.name(),
                        product_id = event.product_id,
                        error = %e,
                        "提交后钩子执行失败，已忽略"
                    );
                }
                Err(_) => {
                    failures += 1;
                    tracing::warn!(
                        hook = hook.name(),
                        product_id = event.product_id,
                        "提交后钩子 panic，已忽略"
                    );
                }
            }
        }

        failures
    }
}
