// ==========================================
// 合同定价引擎 - 改价审批
// ==========================================
// 输入: OverrideRequest
// 校验: 改价原因长度 + 申请价格 + 审批凭证
// 输出: 审计记录 + 改价提示文案
// 红线: 被拒绝的申请不得被静默接受,也不产生审计记录
// ==========================================

use crate::config::pricing_config::PricingConfig;
use crate::domain::override_audit::{OverrideAuditRecord, OverrideRequest};
use crate::engine::authorization::ApprovalAuthority;
use crate::error::{ensure_non_negative, PricingError, PricingResult};
use crate::i18n::{format_rate, t_with_args};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::instrument;

/// 审批通过结果
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideApproval {
    pub record: OverrideAuditRecord,
    pub warning: String, // 改价提示（原价/新价/原因/审批人）
}

// ==========================================
// OverrideAuthorizer - 改价审批器
// ==========================================
pub struct OverrideAuthorizer {
    authority: Arc<dyn ApprovalAuthority>,
    min_reason_chars: usize,
}

impl OverrideAuthorizer {
    /// 创建改价审批器
    pub fn new(authority: Arc<dyn ApprovalAuthority>, config: &PricingConfig) -> Self {
        Self {
            authority,
            min_reason_chars: config.effective_min_reason_chars(),
        }
    }

    /// 校验改价原因（去除首尾空白后按字符计数）
    pub fn validate_reason(&self, reason: &str) -> PricingResult<()> {
        let chars = reason.trim().chars().count();
        if chars < self.min_reason_chars {
            return Err(PricingError::validation(
                "reason",
                format!(
                    "改价原因至少需要 {} 个字符，当前 {} 个",
                    self.min_reason_chars, chars
                ),
            ));
        }
        Ok(())
    }

    /// 审批改价申请
    ///
    /// # 顺序
    /// 1) 改价原因长度 → ValidationError
    /// 2) 申请价格非负 → ValidationError
    /// 3) 审批凭证 → AuthorizationError
    ///
    /// # 返回
    /// - `Ok(OverrideApproval)`: 审批通过,含唯一一条审计记录
    /// - `Err`: 明确拒绝
    #[instrument(skip(self, request), fields(material_id = %request.material_id))]
    pub fn authorize(
        &self,
        request: &OverrideRequest,
        approved_at: NaiveDateTime,
    ) -> PricingResult<OverrideApproval> {
        self.validate_reason(&request.reason)?;
        ensure_non_negative("requested_rate", request.requested_rate)?;

        let approver = match self
            .authority
            .verify(&request.approver_credential_proof, request)
        {
            Ok(approver) => approver,
            Err(e) => {
                tracing::warn!(error = %e, "改价审批被拒绝");
                return Err(e);
            }
        };

        let record = OverrideAuditRecord::from_approved(request, &approver, approved_at);
        let warning = Self::warning_message(&record);

        tracing::info!(
            audit_id = %record.audit_id,
            approved_by = %record.approved_by,
            original_rate = record.original_rate,
            override_rate = record.override_rate,
            "改价审批通过"
        );

        Ok(OverrideApproval { record, warning })
    }

    /// 改价提示文案
    pub fn warning_message(record: &OverrideAuditRecord) -> String {
        t_with_args(
            "warning.rate_overridden",
            &[
                ("material", &record.material_id),
                ("original", &format_rate(record.original_rate)),
                ("override", &format_rate(record.override_rate)),
                ("approver", &record.approver_name),
                ("reason", &record.reason),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::pricing_config::ApproverGrant;
    use crate::domain::override_audit::ApproverCredentialProof;
    use crate::engine::authorization::ApproverDirectory;

    fn authorizer() -> OverrideAuthorizer {
        let dir = ApproverDirectory::from_grants(vec![ApproverGrant {
            approver_id: "u-1".to_string(),
            display_name: "Finance Lead".to_string(),
            credential: "tok-1".to_string(),
            max_deviation_percent: None,
            enabled: true,
        }]);
        OverrideAuthorizer::new(Arc::new(dir), &PricingConfig::default())
    }

    fn now() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2026, 5, 15)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn request(reason: &str, token: &str) -> OverrideRequest {
        OverrideRequest::new("M1", 8.0, 9.0, reason, ApproverCredentialProof::new(token))
    }

    #[test]
    fn test_authorize_success() {
        let approval = authorizer()
            .authorize(&request("customer requested adjustment", "tok-1"), now())
            .unwrap();
        assert_eq!(approval.record.material_id, "M1");
        assert_eq!(approval.record.original_rate, 8.0);
        assert_eq!(approval.record.override_rate, 9.0);
        assert_eq!(approval.record.approved_by, "u-1");
        assert!(approval.warning.contains("8.000"));
        assert!(approval.warning.contains("9.000"));
        assert!(approval.warning.contains("customer requested adjustment"));
    }

    #[test]
    fn test_short_reason_is_validation_error() {
        // 去除空白后只有 9 个字符
        match authorizer().authorize(&request("   too short  ", "tok-1"), now()) {
            Err(PricingError::Validation { field, .. }) => assert_eq!(field, "reason"),
            other => panic!("Expected Validation, got {:?}", other),
        }
        assert!(authorizer().validate_reason("exactly10!").is_ok());
    }

    #[test]
    fn test_configured_minimum_below_ten_is_ignored() {
        let dir = ApproverDirectory::from_grants(vec![ApproverGrant {
            approver_id: "u-1".to_string(),
            display_name: "Finance Lead".to_string(),
            credential: "tok-1".to_string(),
            max_deviation_percent: None,
            enabled: true,
        }]);
        let config = PricingConfig {
            min_override_reason_chars: 2,
            ..Default::default()
        };
        let lenient = OverrideAuthorizer::new(Arc::new(dir), &config);

        match lenient.authorize(&request("ok", "tok-1"), now()) {
            Err(PricingError::Validation { field, .. }) => assert_eq!(field, "reason"),
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_reason_counts_characters_not_bytes() {
        // 10 个汉字
        assert!(authorizer().validate_reason("客户要求调整合同价格").is_ok());
        assert!(authorizer().validate_reason("客户要求调整价格").is_err());
    }

    #[test]
    fn test_bad_credential_is_authorization_error() {
        let err = authorizer()
            .authorize(&request("customer requested adjustment", "wrong"), now())
            .unwrap_err();
        assert!(err.is_authorization());
    }

    #[test]
    fn test_negative_requested_rate_rejected() {
        let mut req = request("customer requested adjustment", "tok-1");
        req.requested_rate = -1.0;
        assert!(matches!(
            authorizer().authorize(&req, now()),
            Err(PricingError::Validation { .. })
        ));
    }
}
