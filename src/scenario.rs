// ==========================================
// 合同定价引擎 - 录入场景回放
// ==========================================
// 职责: 按 JSON 描述的编辑序列驱动一次订单录入,输出每步结果与最终订单
// 说明: 单步失败只记录在结果中,后续步骤继续执行（与界面行为一致）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::order_entry_api::{CommittedOrder, OrderEntryApi};
use crate::config::pricing_config::ApproverGrant;
use crate::domain::contract::RawContractRateRecord;
use crate::domain::material::{Material, StockSnapshot};
use crate::domain::override_audit::{ApproverCredentialProof, OverrideRequest};
use crate::domain::types::OrderKind;
use crate::engine::order_line_calculator::RateEdit;
use crate::engine::rate_resolver::RateResolver;
use crate::engine::session::OrderEditingSession;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 录入场景
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub order_ref: String,
    pub kind: OrderKind,
    pub counterparty_id: String,
    pub today: NaiveDate,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub stock: Vec<StockSnapshot>,
    /// 未提供合同文件时使用
    #[serde(default)]
    pub contracts: Vec<RawContractRateRecord>,
    #[serde(default)]
    pub approvers: Vec<ApproverGrant>,
    #[serde(default)]
    pub edits: Vec<ScenarioEdit>,
}

/// 单步编辑
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScenarioEdit {
    AddLine,
    RemoveLine {
        line: usize,
    },
    SelectMaterial {
        line: usize,
        material_id: String,
    },
    SetQuantity {
        line: usize,
        quantity: f64,
    },
    SetRate {
        line: usize,
        rate: f64,
    },
    /// 原价取该行当前合同价
    Override {
        line: usize,
        requested_rate: f64,
        reason: String,
        #[serde(skip_serializing)]
        credential: String,
    },
    SetDiscount {
        percent: f64,
    },
    SetTax {
        taxable: bool,
        vat_rate: f64,
    },
}

/// 单步结果
#[derive(Debug, Clone, Serialize)]
pub struct EditOutcome {
    pub step: usize,
    pub edit: ScenarioEdit,
    pub ok: bool,
    pub detail: serde_json::Value,
}

/// 场景回放结果
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub outcomes: Vec<EditOutcome>,
    pub order: CommittedOrder,
}

/// 回放场景并提交订单
#[instrument(skip(api, scenario), fields(order_ref = %scenario.order_ref))]
pub async fn run_scenario(api: &OrderEntryApi, scenario: &Scenario) -> ApiResult<ScenarioReport> {
    let mut session = api
        .open_session(
            &scenario.order_ref,
            scenario.kind,
            &scenario.counterparty_id,
            scenario.today,
        )
        .await?;

    let mut outcomes = Vec::with_capacity(scenario.edits.len());
    for (step, edit) in scenario.edits.iter().enumerate() {
        let outcome = match apply_edit(api, &mut session, edit).await {
            Ok(detail) => EditOutcome {
                step,
                edit: edit.clone(),
                ok: true,
                detail,
            },
            Err(e) => {
                tracing::warn!(step, error = %e, "场景步骤被拒绝");
                EditOutcome {
                    step,
                    edit: edit.clone(),
                    ok: false,
                    detail: serde_json::json!({ "error": e.to_string() }),
                }
            }
        };
        outcomes.push(outcome);
    }

    let order = api.commit(&mut session)?;
    Ok(ScenarioReport { outcomes, order })
}

async fn apply_edit(
    api: &OrderEntryApi,
    session: &mut OrderEditingSession,
    edit: &ScenarioEdit,
) -> ApiResult<serde_json::Value> {
    let detail = match edit {
        ScenarioEdit::AddLine => serde_json::json!({ "line": session.add_line() }),
        ScenarioEdit::RemoveLine { line } => to_json(&session.remove_line(*line)?)?,
        ScenarioEdit::SelectMaterial { line, material_id } => {
            let resolution = api.select_material(session, *line, material_id).await?;
            serde_json::json!({
                "effective_rate": resolution.effective_rate,
                "contract_active": resolution.contract_active,
                "rationale": RateResolver::rationale_message(&resolution.rationale),
            })
        }
        ScenarioEdit::SetQuantity { line, quantity } => {
            let level = api.change_quantity(session, *line, *quantity).await?;
            serde_json::json!({ "stock_level": level })
        }
        ScenarioEdit::SetRate { line, rate } => {
            let edit: RateEdit = api.edit_rate(session, *line, *rate)?;
            to_json(&edit)?
        }
        ScenarioEdit::Override {
            line,
            requested_rate,
            reason,
            credential,
        } => {
            let current = session.line(*line)?;
            let request = OverrideRequest::new(
                current.material_id.as_deref().unwrap_or_default(),
                current.effective_rate,
                *requested_rate,
                reason,
                ApproverCredentialProof::new(credential.as_str()),
            );
            to_json(&api.submit_override(session, *line, &request)?)?
        }
        ScenarioEdit::SetDiscount { percent } => to_json(&session.set_discount(*percent)?)?,
        ScenarioEdit::SetTax { taxable, vat_rate } => {
            to_json(&session.set_tax(*taxable, *vat_rate)?)?
        }
    };
    Ok(detail)
}

fn to_json<T: Serialize>(value: &T) -> ApiResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| ApiError::Other(e.into()))
}
