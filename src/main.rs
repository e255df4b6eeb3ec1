// ==========================================
// 合同定价引擎 - 命令行入口
// ==========================================
// 用法:
//   order-pricing <scenario.json> [contracts.csv|xlsx|-] [db_path]
//
// 环境变量:
//   RUST_LOG                 日志级别（默认 info）
//   ORDER_PRICING_LOG_JSON   置位（非 0/false）时以 JSON 格式输出日志
//   ORDER_PRICING_LOCALE     提示语言（zh-CN / en）
//
// 回放场景中的编辑序列,向标准输出打印订单行、汇总、审计记录与提示（JSON）
// ==========================================

use anyhow::{anyhow, bail, Context};
use order_pricing::api::OrderEntryApi;
use order_pricing::config::{ConfigManager, PricingConfigReader};
use order_pricing::db::open_sqlite_connection;
use order_pricing::engine::{ContractRateSource, StaticReferenceData};
use order_pricing::i18n::{set_locale, t_with_args};
use order_pricing::importer::{ContractRateImporter, ImportError};
use order_pricing::logging::LogFormat;
use order_pricing::repository::OverrideAuditRepository;
use order_pricing::scenario::{run_scenario, Scenario};
use order_pricing::{logging, APP_NAME, VERSION};
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(LogFormat::from_env());
    if let Ok(locale) = std::env::var("ORDER_PRICING_LOCALE") {
        if !set_locale(&locale) {
            tracing::warn!(locale = %locale, "不支持的提示语言，使用默认语言");
        }
    }

    tracing::info!("{} v{}", APP_NAME, VERSION);

    let mut args = std::env::args().skip(1);
    let scenario_path = args
        .next()
        .ok_or_else(|| anyhow!("用法: order-pricing <scenario.json> [contracts.csv|xlsx|-] [db_path]"))?;
    let contracts_path = args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "-");
    let db_path = args.next().unwrap_or_else(|| ":memory:".to_string());

    let scenario_text = std::fs::read_to_string(&scenario_path)
        .with_context(|| format!("读取场景文件失败: {}", scenario_path))?;
    let scenario: Scenario = serde_json::from_str(&scenario_text)
        .with_context(|| format!("场景文件格式错误: {}", scenario_path))?;

    // 配置与审计共用同一连接
    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path)?));
    let config = ConfigManager::from_connection(conn.clone()).map_err(|e| anyhow!(e))?;
    for grant in &scenario.approvers {
        config.upsert_approver_grant(grant).map_err(|e| anyhow!(e))?;
    }
    tracing::debug!(
        config = %config.get_config_snapshot().map_err(|e| anyhow!(e))?,
        "定价配置"
    );

    let mut reference = StaticReferenceData::new();
    for material in &scenario.materials {
        reference = reference.with_material(material.clone());
    }
    for snapshot in &scenario.stock {
        reference = reference.with_stock(snapshot.clone());
    }
    let reference = Arc::new(
        reference.with_contract_rates(&scenario.counterparty_id, scenario.contracts.clone()),
    );

    let contracts: Arc<dyn ContractRateSource> = match contracts_path {
        Some(path) => {
            let importer =
                ContractRateImporter::new().with_default_counterparty(&scenario.counterparty_id);
            let imported = match importer.import_file(&path) {
                Ok(imported) => imported,
                Err(ImportError::FileNotFound(p)) => {
                    bail!(t_with_args("import.file_not_found", &[("path", &p)]))
                }
                Err(e) => return Err(e.into()),
            };
            eprintln!("{}", imported.report().summary());
            Arc::new(imported)
        }
        None => reference.clone(),
    };

    let audit_repo = Arc::new(OverrideAuditRepository::new(conn));
    let reader: &dyn PricingConfigReader = &config;
    let api = OrderEntryApi::from_config(
        reader,
        reference.clone(),
        contracts,
        reference,
        audit_repo,
    )
    .await?;

    let report = run_scenario(&api, &scenario).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
