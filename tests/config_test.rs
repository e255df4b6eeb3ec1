// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证定价参数与审批人授权的读取/写入
// ==========================================

mod helpers;

use helpers::test_data_builder::approver_grant;
use order_pricing::config::{config_keys, ConfigManager, PricingConfig, PricingConfigReader};
use test_helpers::create_test_db;

#[tokio::test]
async fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[tokio::test]
async fn test_defaults_on_fresh_database() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    let config = config_manager.load_pricing_config().await.unwrap();
    assert_eq!(config, PricingConfig::default());
    assert_eq!(config.default_vat_rate, 5.0);
    assert_eq!(config.rate_tolerance, 0.001);
    assert_eq!(config.min_override_reason_chars, 10);
}

#[tokio::test]
async fn test_values_persist_across_managers() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    {
        let writer = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
        writer
            .set_global_config_value(config_keys::DEFAULT_VAT_RATE, "13")
            .unwrap();
        writer
            .set_global_config_value(config_keys::MIN_OVERRIDE_REASON_CHARS, "20")
            .unwrap();
        writer
            .set_global_config_value(config_keys::STOCK_WARNINGS_ENABLED, "off")
            .unwrap();
        // 覆盖写入
        writer
            .set_global_config_value(config_keys::DEFAULT_VAT_RATE, "9")
            .unwrap();
    }

    let reader = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    assert_eq!(reader.get_default_vat_rate().await.unwrap(), 9.0);
    assert_eq!(reader.get_min_override_reason_chars().await.unwrap(), 20);
    assert!(!reader.get_stock_warnings_enabled().await.unwrap());
    assert!(reader.get_default_taxable().await.unwrap());
    assert_eq!(
        reader
            .get_global_config_value(config_keys::DEFAULT_VAT_RATE)
            .unwrap()
            .as_deref(),
        Some("9")
    );
}

#[tokio::test]
async fn test_invalid_values_fall_back_to_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config_manager
        .set_global_config_value(config_keys::DEFAULT_VAT_RATE, "not-a-number")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::RATE_TOLERANCE, "NaN")
        .unwrap();

    assert_eq!(config_manager.get_default_vat_rate().await.unwrap(), 5.0);
    assert_eq!(config_manager.get_rate_tolerance().await.unwrap(), 0.001);
}

#[tokio::test]
async fn test_approver_grants_upsert_and_redaction() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config_manager
        .upsert_approver_grant(&approver_grant("u-sales", "tok-sales"))
        .unwrap();
    config_manager
        .upsert_approver_grant(&approver_grant("u-finance", "tok-old"))
        .unwrap();
    config_manager
        .upsert_approver_grant(&approver_grant("u-finance", "tok-new"))
        .unwrap();
    assert!(config_manager
        .upsert_approver_grant(&approver_grant("  ", "tok-x"))
        .is_err());

    let grants = config_manager.list_approver_grants().await.unwrap();
    let ids: Vec<&str> = grants.iter().map(|g| g.approver_id.as_str()).collect();
    assert_eq!(ids, vec!["u-finance", "u-sales"]);
    assert_eq!(grants[0].credential, "tok-new");

    let snapshot = config_manager.get_config_snapshot().unwrap();
    assert!(!snapshot.contains("tok-new"));
    assert!(!snapshot.contains("tok-sales"));
}
