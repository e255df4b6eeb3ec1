// ==========================================
// 合同定价引擎 - 改价申请与审计领域模型
// ==========================================
// 红线: 审计记录只追加,不修改,不删除
// 红线: 失败的改价申请不产生审计记录
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ApproverCredentialProof - 审批凭证
// ==========================================
// 不透明令牌,只由注入的审批能力校验
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproverCredentialProof(String);

impl ApproverCredentialProof {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// 凭证不得出现在日志中
impl fmt::Debug for ApproverCredentialProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApproverCredentialProof(***)")
    }
}

// ==========================================
// Approver - 已验证的审批人
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    pub approver_id: String,  // 审批人唯一标识
    pub display_name: String, // 展示名称
}

// ==========================================
// OverrideRequest - 改价申请
// ==========================================
// 生命周期: 瞬时,由 OverrideAuthorizer 消费
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRequest {
    pub material_id: String,
    pub original_rate: f64,  // 申请时的合同解析价
    pub requested_rate: f64, // 申请价格
    pub reason: String,      // 改价原因（去除首尾空白后至少 10 个字符）
    pub approver_credential_proof: ApproverCredentialProof,
}

impl OverrideRequest {
    pub fn new(
        material_id: &str,
        original_rate: f64,
        requested_rate: f64,
        reason: &str,
        proof: ApproverCredentialProof,
    ) -> Self {
        Self {
            material_id: material_id.to_string(),
            original_rate,
            requested_rate,
            reason: reason.to_string(),
            approver_credential_proof: proof,
        }
    }

    /// 偏离合同价的百分比（合同价为 0 时按 100% 计）
    pub fn deviation_percent(&self) -> f64 {
        if self.original_rate.abs() < f64::EPSILON {
            if self.requested_rate.abs() < f64::EPSILON {
                0.0
            } else {
                100.0
            }
        } else {
            ((self.requested_rate - self.original_rate) / self.original_rate * 100.0).abs()
        }
    }
}

// ==========================================
// OverrideAuditRecord - 改价审计记录
// ==========================================
// 用途: 会话内追加,提交时整体落库,供下游报表使用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideAuditRecord {
    pub audit_id: String, // UUID
    pub material_id: String,
    pub original_rate: f64,
    pub override_rate: f64,
    pub reason: String,
    pub approved_by: String,   // 审批人ID
    pub approver_name: String, // 审批人展示名称
    pub approved_at: NaiveDateTime,
}

impl OverrideAuditRecord {
    /// 由通过审批的申请生成审计记录
    pub fn from_approved(
        request: &OverrideRequest,
        approver: &Approver,
        approved_at: NaiveDateTime,
    ) -> Self {
        Self {
            audit_id: uuid::Uuid::new_v4().to_string(),
            material_id: request.material_id.clone(),
            original_rate: request.original_rate,
            override_rate: request.requested_rate,
            reason: request.reason.trim().to_string(),
            approved_by: approver.approver_id.clone(),
            approver_name: approver.display_name.clone(),
            approved_at,
        }
    }

    /// 价格变化量
    pub fn rate_delta(&self) -> f64 {
        self.override_rate - self.original_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proof_debug_is_redacted() {
        let proof = ApproverCredentialProof::new("s3cret-token");
        let dbg = format!("{:?}", proof);
        assert!(!dbg.contains("s3cret"));
        assert_eq!(proof.as_str(), "s3cret-token");
    }

    #[test]
    fn test_deviation_percent() {
        let proof = ApproverCredentialProof::new("t");
        let req = OverrideRequest::new("M1", 8.0, 9.0, "customer requested", proof.clone());
        assert!((req.deviation_percent() - 12.5).abs() < 1e-9);

        let req = OverrideRequest::new("M1", 0.0, 1.0, "customer requested", proof);
        assert_eq!(req.deviation_percent(), 100.0);
    }

    #[test]
    fn test_record_from_approved_trims_reason() {
        let req = OverrideRequest::new(
            "M1",
            8.0,
            9.0,
            "  customer requested adjustment  ",
            ApproverCredentialProof::new("t"),
        );
        let approver = Approver {
            approver_id: "u-001".to_string(),
            display_name: "Finance Lead".to_string(),
        };
        let at = chrono::NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let record = OverrideAuditRecord::from_approved(&req, &approver, at);

        assert_eq!(record.reason, "customer requested adjustment");
        assert_eq!(record.approved_by, "u-001");
        assert_eq!(record.approved_at, at);
        assert!((record.rate_delta() - 1.0).abs() < 1e-9);
        assert_eq!(record.audit_id.len(), 36);
    }
}
