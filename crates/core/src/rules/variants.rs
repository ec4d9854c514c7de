use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::{ASSET_SPARK, ASSET_VARIANTS};
use crate::error::CoreError;

/// How to treat the `__spark` payload when rewriting variants.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SparkUpdate {
    /// Option not supplied: keep whatever is stored.
    #[default]
    Keep,
    Set(Value),
    /// Explicit `null`: remove the key.
    Clear,
}

impl SparkUpdate {
    /// Map a "field absent / field null / field set" triple onto an update.
    pub fn from_field(field: Option<Value>) -> Self {
        match field {
            None => Self::Keep,
            Some(Value::Null) => Self::Clear,
            Some(value) => Self::Set(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct VariantDefinition {
    pub name: String,
    #[serde(default)]
    pub hook: Option<String>,
    #[serde(default)]
    pub mechanic: Option<String>,
    #[serde(default)]
    pub prize: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Variant names must be present and unique (case-insensitive).
pub fn validate_variants(variants: &[VariantDefinition]) -> Result<(), CoreError> {
    let mut seen = std::collections::HashSet::new();
    for (i, variant) in variants.iter().enumerate() {
        let name = variant.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation(format!("variants[{i}].name is required")));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(CoreError::Validation(format!(
                "variants[{i}].name '{name}' is duplicated"
            )));
        }
    }
    Ok(())
}

/// Return a copy of `existing` with `variants` replaced and `__spark` updated.
/// Non-object input is treated as an empty bag.
pub fn build_variant_assets(
    existing: &Value,
    variants: &[VariantDefinition],
    spark: SparkUpdate,
) -> Value {
    let mut assets = match existing {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let variants = variants
        .iter()
        .filter_map(|v| serde_json::to_value(v).ok())
        .collect();
    assets.insert(ASSET_VARIANTS.to_string(), Value::Array(variants));

    match spark {
        SparkUpdate::Keep => {}
        SparkUpdate::Set(value) => {
            assets.insert(ASSET_SPARK.to_string(), value);
        }
        SparkUpdate::Clear => {
            assets.remove(ASSET_SPARK);
        }
    }

    Value::Object(assets)
}
