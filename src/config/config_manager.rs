// ==========================================
// 合同定价引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::pricing_config::{
    is_valid_tolerance, ApproverGrant, PricingConfig, MIN_OVERRIDE_REASON_CHARS,
};
use crate::config::pricing_config_trait::PricingConfigReader;
use crate::db::{ensure_schema, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 与建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 写入审批人授权（config_kv: approver/{approver_id}）
    pub fn upsert_approver_grant(&self, grant: &ApproverGrant) -> ConfigResult<()> {
        let id = grant.approver_id.trim();
        if id.is_empty() {
            return Err("approver_id 不能为空".into());
        }
        let key = format!("{}{}", config_keys::APPROVER_PREFIX, id);
        let value = serde_json::to_string(grant)?;
        self.set_global_config_value(&key, &value)
    }

    /// 获取所有配置的快照（JSON格式，审批凭证已脱敏）
    ///
    /// # 用途
    /// - 在订单提交时记录定价参数，便于事后核对
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key",
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            // 审批凭证不进入快照
            if key.starts_with(config_keys::APPROVER_PREFIX) {
                continue;
            }
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    fn parse_bool(value: &str, default: bool) -> bool {
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => default,
        }
    }
}

// ==========================================
// PricingConfigReader Trait 实现
// ==========================================
#[async_trait]
impl PricingConfigReader for ConfigManager {
    async fn get_rate_tolerance(&self) -> ConfigResult<f64> {
        let default = PricingConfig::default().rate_tolerance;
        let value = self.get_config_or_default(config_keys::RATE_TOLERANCE, "0.001")?;
        Ok(value
            .parse::<f64>()
            .ok()
            .filter(|v| is_valid_tolerance(*v))
            .unwrap_or(default))
    }

    async fn get_min_override_reason_chars(&self) -> ConfigResult<usize> {
        let value = self.get_config_or_default(config_keys::MIN_OVERRIDE_REASON_CHARS, "10")?;
        Ok(value
            .parse::<usize>()
            .map(|v| v.max(MIN_OVERRIDE_REASON_CHARS))
            .unwrap_or(MIN_OVERRIDE_REASON_CHARS))
    }

    async fn get_default_vat_rate(&self) -> ConfigResult<f64> {
        let value = self.get_config_or_default(config_keys::DEFAULT_VAT_RATE, "5.0")?;
        Ok(value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(5.0))
    }

    async fn get_default_taxable(&self) -> ConfigResult<bool> {
        let value = self.get_config_or_default(config_keys::DEFAULT_TAXABLE, "true")?;
        Ok(Self::parse_bool(&value, true))
    }

    async fn get_stock_warnings_enabled(&self) -> ConfigResult<bool> {
        let value = self.get_config_or_default(config_keys::STOCK_WARNINGS_ENABLED, "true")?;
        Ok(Self::parse_bool(&value, true))
    }

    async fn list_approver_grants(&self) -> ConfigResult<Vec<ApproverGrant>> {
        let raw: Vec<(String, String)> = {
            let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            let mut stmt = conn.prepare(
                "SELECT key, value FROM config_kv
                 WHERE scope_id = 'global' AND key LIKE 'approver/%'
                 ORDER BY key",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            let collected = rows.collect::<Result<Vec<_>, _>>()?;
            collected
        };

        let mut grants = Vec::with_capacity(raw.len());
        for (key, value) in raw {
            match serde_json::from_str::<ApproverGrant>(&value) {
                Ok(grant) => grants.push(grant),
                Err(e) => {
                    tracing::warn!(
                        config_key = %key,
                        error = %e,
                        "审批人授权配置格式错误，已跳过"
                    );
                }
            }
        }
        Ok(grants)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 改价审批
    pub const RATE_TOLERANCE: &str = "pricing.rate_tolerance";
    pub const MIN_OVERRIDE_REASON_CHARS: &str = "pricing.min_override_reason_chars";
    pub const APPROVER_PREFIX: &str = "approver/";

    // 税费
    pub const DEFAULT_VAT_RATE: &str = "pricing.default_vat_rate";
    pub const DEFAULT_TAXABLE: &str = "pricing.default_taxable";

    // 库存提示
    pub const STOCK_WARNINGS_ENABLED: &str = "pricing.stock_warnings_enabled";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[tokio::test]
    async fn test_defaults_when_empty() {
        let manager = memory_manager();
        let cfg = manager.load_pricing_config().await.unwrap();
        assert_eq!(cfg, PricingConfig::default());
        assert!(manager.list_approver_grants().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overrides_and_invalid_values() {
        let manager = memory_manager();
        manager
            .set_global_config_value(config_keys::DEFAULT_VAT_RATE, "15")
            .unwrap();
        manager
            .set_global_config_value(config_keys::RATE_TOLERANCE, "-3")
            .unwrap();
        manager
            .set_global_config_value(config_keys::DEFAULT_TAXABLE, "no")
            .unwrap();

        let cfg = manager.load_pricing_config().await.unwrap();
        assert_eq!(cfg.default_vat_rate, 15.0);
        assert_eq!(cfg.rate_tolerance, 0.001); // 负数回退默认值
        assert!(!cfg.default_taxable);
    }

    #[tokio::test]
    async fn test_pricing_limits_cannot_be_weakened() {
        let manager = memory_manager();
        manager
            .set_global_config_value(config_keys::MIN_OVERRIDE_REASON_CHARS, "2")
            .unwrap();
        manager
            .set_global_config_value(config_keys::RATE_TOLERANCE, "0.5")
            .unwrap();

        let cfg = manager.load_pricing_config().await.unwrap();
        assert_eq!(cfg.min_override_reason_chars, 10);
        assert_eq!(cfg.rate_tolerance, 0.001);
    }

    #[tokio::test]
    async fn test_approver_grants_roundtrip_and_snapshot_redaction() {
        let manager = memory_manager();
        manager
            .upsert_approver_grant(&ApproverGrant {
                approver_id: "u-001".to_string(),
                display_name: "Finance Lead".to_string(),
                credential: "tok-1".to_string(),
                max_deviation_percent: Some(25.0),
                enabled: true,
            })
            .unwrap();
        manager
            .set_global_config_value("approver/broken", "{not json")
            .unwrap();

        let grants = manager.list_approver_grants().await.unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].approver_id, "u-001");

        let snapshot = manager.get_config_snapshot().unwrap();
        assert!(!snapshot.contains("tok-1"));
    }
}
