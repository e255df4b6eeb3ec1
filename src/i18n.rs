// ==========================================
// 合同定价引擎 - 提示文案国际化
// ==========================================
// 工具: rust-i18n（locales/*.yml,zh-CN 为回退语言）
// 说明: i18n! 宏在 lib.rs 中初始化;占位符格式 %{name}
// ==========================================

/// 支持的提示语言
pub const SUPPORTED_LOCALES: &[&str] = &["zh-CN", "en"];

pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换提示语言
///
/// # 返回
/// - false: 不支持的语言,当前语言保持不变
pub fn set_locale(locale: &str) -> bool {
    match SUPPORTED_LOCALES
        .iter()
        .find(|l| l.eq_ignore_ascii_case(locale.trim()))
    {
        Some(l) => {
            rust_i18n::set_locale(l);
            true
        }
        None => false,
    }
}

/// 取文案
///
/// ```no_run
/// use order_pricing::i18n::t;
/// let party = t("party.customer");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 取文案并替换 %{name} 占位符
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(rust_i18n::t!(key).to_string(), |text, (name, value)| {
            text.replace(&format!("%{{{}}}", name), value)
        })
}

/// 价格展示格式（3 位小数,与改价容差精度一致）
pub fn format_rate(value: f64) -> String {
    format!("{:.3}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // 语言是进程级全局状态,切换语言的测试串行执行
    static LOCALE_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_LOCK.lock().unwrap();
        assert!(set_locale("EN"));
        assert_eq!(current_locale(), "en");

        assert!(!set_locale("fr"));
        assert_eq!(current_locale(), "en");

        assert!(set_locale("zh-CN"));
        assert_eq!(current_locale(), "zh-CN");
    }

    #[test]
    fn test_party_wording_per_locale() {
        let _guard = LOCALE_LOCK.lock().unwrap();
        set_locale("zh-CN");
        assert_eq!(t("party.customer"), "客户");

        set_locale("en");
        assert_eq!(t("party.supplier"), "supplier");

        set_locale("zh-CN");
    }

    #[test]
    fn test_placeholders_replaced() {
        let _guard = LOCALE_LOCK.lock().unwrap();
        set_locale("en");
        let msg = t_with_args(
            "warning.stock_low",
            &[("material", "M1"), ("stock", "4"), ("unit", "kg"), ("reorder", "5")],
        );
        assert!(msg.contains("M1"));
        assert!(msg.contains("reorder level 5"));
        assert!(!msg.contains("%{"));

        set_locale("zh-CN");
        let msg = t_with_args("import.file_not_found", &[("path", "/tmp/contracts.csv")]);
        assert!(msg.contains("/tmp/contracts.csv"));
        assert!(msg.contains("文件不存在"));
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(8.0), "8.000");
        assert_eq!(format_rate(9.12345), "9.123");
    }
}
