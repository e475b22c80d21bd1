use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// One node of a filter / having condition tree as it arrives on the wire.
///
/// `and` / `or` nodes carry `sub_conds`; every other operation is a leaf
/// comparing field `name` against `value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CondCfg {
    #[serde(default, alias = "field", skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub operation: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_conds: Vec<CondCfg>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from: Option<String>,
}

impl CondCfg {
    pub fn leaf(name: impl Into<String>, operation: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            operation: operation.into(),
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn composite(operation: impl Into<String>, sub_conds: Vec<CondCfg>) -> Self {
        Self { operation: operation.into(), sub_conds, ..Default::default() }
    }

    /// `{}`: no field, operation, children, origin or value
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.operation.is_empty()
            && self.sub_conds.is_empty()
            && self.value_from.as_deref().unwrap_or_default().is_empty()
            && self.value.is_none()
    }
}

/// Body of `POST /api/conditions/validate`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ValidateConditionRequest {
    #[serde(default)]
    pub condition: Option<CondCfg>,
    /// Check the node as a having clause instead of a filter tree
    #[serde(default)]
    pub having: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidateConditionResponse {
    pub valid: bool,
}
