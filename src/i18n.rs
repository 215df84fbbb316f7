// ==========================================
// 商品目录导入系统 - 界面语言
// ==========================================
// 职责: CLI 消息、导入结果、通知邮件的本地化
// 语言: zh-CN（默认）/ en，未知代码回退 zh-CN
// 消息文件: locales/*.yml，由 lib.rs 中的 i18n! 宏加载
// ==========================================

use std::fmt;
use tracing::warn;

/// 支持的界面语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    ZhCn,
    En,
}

impl Locale {
    /// 解析语言代码（不区分大小写，接受 `_` 分隔与地区后缀）
    ///
    /// "zh" / "zh_cn" / "zh-Hans" → ZhCn；"en" / "en-US" → En
    pub fn parse(code: &str) -> Option<Self> {
        let normalized = code.trim().to_ascii_lowercase().replace('_', "-");
        let language = normalized.split('-').next().unwrap_or_default();
        match language {
            "zh" => Some(Locale::ZhCn),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    /// locales/ 下的文件名
    pub fn code(&self) -> &'static str {
        match self {
            Locale::ZhCn => "zh-CN",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// 当前进程语言
pub fn current_locale() -> Locale {
    Locale::parse(&rust_i18n::locale()).unwrap_or_default()
}

/// 切换进程语言，返回实际生效的语言
pub fn set_locale(code: &str) -> Locale {
    let locale = Locale::parse(code).unwrap_or_else(|| {
        warn!(requested = code, fallback = %Locale::default(), "不支持的语言代码");
        Locale::default()
    });
    rust_i18n::set_locale(locale.code());
    locale
}

pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 带参数翻译，消息中的 `%{name}` 按 args 逐个替换
///
/// ```no_run
/// use catalog_import::i18n::t_with_args;
/// let msg = t_with_args("import.success", &[("added", "1"), ("updated", "0")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(t(key), |msg, (name, value)| {
            msg.replace(&format!("%{{{}}}", name), value)
        })
}
