// ==========================================
// 合同定价引擎 - 改价审批能力
// ==========================================
// 职责: 校验审批凭证,返回真实审批人
// 说明: 引擎只依赖 ApprovalAuthority trait,具体身份服务由调用方注入
// 红线: 不存在共享的固定审批口令,每个审批人持有独立凭证
// ==========================================

use crate::config::pricing_config::ApproverGrant;
use crate::domain::override_audit::{Approver, ApproverCredentialProof, OverrideRequest};
use crate::error::{PricingError, PricingResult};
use std::collections::HashSet;

// ==========================================
// ApprovalAuthority Trait
// ==========================================

/// 改价审批能力
///
/// # 实现说明
/// - `ApproverDirectory`: 基于 config_kv 中审批人授权的实现
/// - 接入外部身份/策略服务时,实现此 trait 即可
pub trait ApprovalAuthority: Send + Sync {
    /// 校验凭证并返回审批人
    ///
    /// # 返回
    /// - `Ok(Approver)`: 凭证有效且有权批准该申请
    /// - `Err(PricingError::Authorization)`: 凭证无效或超出权限
    fn verify(
        &self,
        proof: &ApproverCredentialProof,
        request: &OverrideRequest,
    ) -> PricingResult<Approver>;
}

// ==========================================
// ApproverDirectory - 审批人目录
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ApproverDirectory {
    grants: Vec<ApproverGrant>,
}

impl ApproverDirectory {
    /// 由审批人授权构建目录
    ///
    /// 停用、凭证为空、凭证重复的授权会被忽略（重复凭证无法对应到唯一审批人）
    pub fn from_grants(grants: Vec<ApproverGrant>) -> Self {
        let mut seen = HashSet::new();
        let mut duplicated = HashSet::new();
        for g in grants.iter().filter(|g| g.enabled && !g.credential.is_empty()) {
            if !seen.insert(g.credential.clone()) {
                duplicated.insert(g.credential.clone());
            }
        }

        let mut kept = Vec::new();
        for grant in grants {
            if !grant.enabled || grant.credential.is_empty() {
                continue;
            }
            if duplicated.contains(&grant.credential) {
                tracing::warn!(
                    approver_id = %grant.approver_id,
                    "审批凭证与其他审批人重复，已忽略该授权"
                );
                continue;
            }
            kept.push(grant);
        }

        tracing::info!(approver_count = kept.len(), "审批人目录已加载");
        Self { grants: kept }
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

/// 等长比较,避免按前缀逐字节提前返回
fn credential_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl ApprovalAuthority for ApproverDirectory {
    fn verify(
        &self,
        proof: &ApproverCredentialProof,
        request: &OverrideRequest,
    ) -> PricingResult<Approver> {
        let grant = self
            .grants
            .iter()
            .find(|g| credential_eq(&g.credential, proof.as_str()))
            .ok_or_else(|| PricingError::Authorization("审批凭证无效".to_string()))?;

        if let Some(limit) = grant.max_deviation_percent {
            let deviation = request.deviation_percent();
            if deviation > limit {
                return Err(PricingError::Authorization(format!(
                    "审批人 {} 的改价权限上限为 {:.2}%，本次偏离 {:.2}%",
                    grant.approver_id, limit, deviation
                )));
            }
        }

        Ok(Approver {
            approver_id: grant.approver_id.clone(),
            display_name: grant.display_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(id: &str, credential: &str, limit: Option<f64>) -> ApproverGrant {
        ApproverGrant {
            approver_id: id.to_string(),
            display_name: format!("Approver {}", id),
            credential: credential.to_string(),
            max_deviation_percent: limit,
            enabled: true,
        }
    }

    fn request(original: f64, requested: f64, token: &str) -> OverrideRequest {
        OverrideRequest::new(
            "M1",
            original,
            requested,
            "customer requested adjustment",
            ApproverCredentialProof::new(token),
        )
    }

    #[test]
    fn test_verify_returns_named_approver() {
        let dir = ApproverDirectory::from_grants(vec![grant("u-1", "tok-1", None), grant("u-2", "tok-2", None)]);
        let req = request(8.0, 9.0, "tok-2");
        let approver = dir.verify(&req.approver_credential_proof, &req).unwrap();
        assert_eq!(approver.approver_id, "u-2");
    }

    #[test]
    fn test_verify_rejects_unknown_credential() {
        let dir = ApproverDirectory::from_grants(vec![grant("u-1", "tok-1", None)]);
        let req = request(8.0, 9.0, "tok-x");
        assert!(dir.verify(&req.approver_credential_proof, &req).unwrap_err().is_authorization());
    }

    #[test]
    fn test_verify_enforces_deviation_limit() {
        let dir = ApproverDirectory::from_grants(vec![grant("u-1", "tok-1", Some(10.0))]);
        let req = request(8.0, 9.0, "tok-1"); // 12.5%
        assert!(dir.verify(&req.approver_credential_proof, &req).is_err());

        let req = request(8.0, 8.4, "tok-1"); // 5%
        assert!(dir.verify(&req.approver_credential_proof, &req).is_ok());
    }

    #[test]
    fn test_disabled_and_duplicate_grants_ignored() {
        let mut disabled = grant("u-3", "tok-3", None);
        disabled.enabled = false;
        let dir = ApproverDirectory::from_grants(vec![
            grant("u-1", "shared", None),
            grant("u-2", "shared", None),
            disabled,
            grant("u-4", "", None),
        ]);
        assert!(dir.is_empty());

        let req = request(8.0, 9.0, "shared");
        assert!(dir.verify(&req.approver_credential_proof, &req).is_err());
        let req = request(8.0, 9.0, "");
        assert!(dir.verify(&req.approver_credential_proof, &req).is_err());
    }

    #[test]
    fn test_credential_eq() {
        assert!(credential_eq("abc", "abc"));
        assert!(!credential_eq("abc", "abd"));
        assert!(!credential_eq("abc", "abcd"));
    }
}
