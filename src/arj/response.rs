// src/arj/response.rs

use serde::{Deserialize, Deserializer};

/// Legacy banner (`arj`) response body.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ArjResponse {
    #[serde(default)]
    pub ads: Option<AdsBody>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct AdsBody {
    #[serde(default)]
    pub ad: Option<Vec<AdUnit>>,
}

/// One ad unit of the legacy banner response. The exchange mixes strings
/// and numbers for the same fields across deployments, so every scalar is
/// decoded tolerantly.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct AdUnit {
    /// Positional index into the originating slot batch.
    #[serde(default, deserialize_with = "opt_u32")]
    pub idx: Option<u32>,
    /// Publisher revenue in milli-units; absence means no fill.
    #[serde(default, deserialize_with = "opt_string")]
    pub pub_rev: Option<String>,
    #[serde(default)]
    pub creative: Option<Vec<CreativeUnit>>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub deal_id: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub brand_id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub adv_id: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CreativeUnit {
    #[serde(default, deserialize_with = "opt_u32")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "opt_u32")]
    pub height: Option<u32>,
    #[serde(default, deserialize_with = "opt_string")]
    pub id: Option<String>,
}

/// Legacy video (`avjp`) response body: a single implicit unit.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct AvjpResponse {
    #[serde(default, rename = "vastUrl")]
    pub vast_url: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub pub_rev: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "opt_u32")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "opt_u32")]
    pub height: Option<u32>,
    #[serde(default, deserialize_with = "opt_string")]
    pub adid: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
}

fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let scalar = Option::<Scalar>::deserialize(deserializer)?;
    Ok(scalar.map(|s| match s {
        Scalar::Text(text) => text,
        Scalar::Int(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
    }))
}

fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let scalar = Option::<Scalar>::deserialize(deserializer)?;
    Ok(scalar.and_then(|s| match s {
        Scalar::Text(text) => text.trim().parse().ok(),
        Scalar::Int(n) => u32::try_from(n).ok(),
        Scalar::Float(n) if n >= 0.0 => Some(n as u32),
        Scalar::Float(_) => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_decode_from_strings_and_numbers() {
        let unit: AdUnit = serde_json::from_value(json!({
            "idx": "1",
            "pub_rev": 2500,
            "creative": [{"width": "300", "height": 250, "id": 99}],
            "brand_id": 12
        }))
        .unwrap();
        assert_eq!(unit.idx, Some(1));
        assert_eq!(unit.pub_rev.as_deref(), Some("2500"));
        let creative = &unit.creative.unwrap()[0];
        assert_eq!(creative.width, Some(300));
        assert_eq!(creative.height, Some(250));
        assert_eq!(creative.id.as_deref(), Some("99"));
        assert_eq!(unit.brand_id.as_deref(), Some("12"));
    }

    #[test]
    fn missing_fields_stay_absent() {
        let unit: AdUnit = serde_json::from_value(json!({"idx": 0})).unwrap();
        assert_eq!(unit.pub_rev, None);
        assert!(unit.creative.is_none());
    }
}
