//! Dataset loading and validation
//!
//! The insight dataset is a JSON array exported from the original document
//! store. Field shapes in the export are loose (numbers stored as strings,
//! blanks as `""`, ids as `{"$oid": ...}`), so every record is normalized
//! here once, and the rest of the crate works with [`Insight`] only.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::Insight;

/// Record as it appears in the dataset file
#[derive(Debug, Deserialize)]
struct RawInsight {
    #[serde(rename = "_id", default)]
    object_id: Option<RawId>,
    /// Used only when `_id` is absent
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default, deserialize_with = "loose_string")]
    end_year: String,
    #[serde(default, deserialize_with = "loose_number")]
    intensity: Option<f64>,
    #[serde(default, deserialize_with = "loose_string")]
    sector: String,
    #[serde(default, deserialize_with = "loose_string")]
    topic: String,
    #[serde(default, deserialize_with = "loose_string")]
    insight: String,
    #[serde(default, deserialize_with = "loose_string")]
    url: String,
    #[serde(default, deserialize_with = "loose_string")]
    region: String,
    #[serde(default, deserialize_with = "loose_string")]
    start_year: String,
    #[serde(default, deserialize_with = "loose_string")]
    impact: String,
    #[serde(default, deserialize_with = "loose_string")]
    added: String,
    #[serde(default, deserialize_with = "loose_string")]
    published: String,
    #[serde(default, deserialize_with = "loose_string")]
    country: String,
    #[serde(default, deserialize_with = "loose_number")]
    relevance: Option<f64>,
    #[serde(default, deserialize_with = "loose_string")]
    pestle: String,
    #[serde(default, deserialize_with = "loose_string")]
    source: String,
    #[serde(default, deserialize_with = "loose_string")]
    title: String,
    #[serde(default, deserialize_with = "loose_number")]
    likelihood: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::ObjectId { oid } => oid,
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Strings may arrive as strings, numbers (`"end_year": 2027`) or null
fn loose_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string, got {}",
            other
        ))),
    }
}

/// Scores may arrive as numbers, numeric strings, `""` or null
///
/// "NaN" and "inf" parse as floats but are not scores, so only finite values
/// are accepted.
fn loose_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| n.to_string()),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| format!("'{}'", s)),
        Some(other) => Err(other.to_string()),
    };

    match parsed {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        Ok(value) => Err(serde::de::Error::custom(format!(
            "expected a number, got '{}'",
            value
        ))),
        Err(raw) => Err(serde::de::Error::custom(format!(
            "expected a number, got {}",
            raw
        ))),
    }
}

/// Parse and validate a dataset from JSON bytes
///
/// Records without an id get their 1-based position. Duplicate ids are
/// rejected because record lookup is by id.
pub fn parse_dataset(bytes: &[u8]) -> Result<Vec<Insight>> {
    let raw: Vec<RawInsight> = serde_json::from_slice(bytes)
        .map_err(|e| Error::DataSourceUnavailable(format!("Invalid dataset JSON: {}", e)))?;

    let mut seen = HashSet::with_capacity(raw.len());
    let mut insights = Vec::with_capacity(raw.len());

    for (position, record) in raw.into_iter().enumerate() {
        let id = [record.object_id, record.id]
            .into_iter()
            .flatten()
            .map(RawId::into_string)
            .find(|id| !id.is_empty())
            .unwrap_or_else(|| (position + 1).to_string());

        if !seen.insert(id.clone()) {
            return Err(Error::DataSourceUnavailable(format!(
                "Duplicate insight id '{}' at record {}",
                id,
                position + 1
            )));
        }

        insights.push(Insight {
            id,
            end_year: record.end_year,
            intensity: record.intensity,
            sector: record.sector,
            topic: record.topic,
            insight: record.insight,
            url: record.url,
            region: record.region,
            start_year: record.start_year,
            impact: record.impact,
            added: record.added,
            published: record.published,
            country: record.country,
            relevance: record.relevance,
            pestle: record.pestle,
            source: record.source,
            title: record.title,
            likelihood: record.likelihood,
        });
    }

    debug!(records = insights.len(), "Parsed insight dataset");
    Ok(insights)
}

/// Read and validate a dataset file
pub fn load_dataset(path: &Path) -> Result<Vec<Insight>> {
    let bytes = std::fs::read(path).map_err(|e| {
        Error::DataSourceUnavailable(format!("Cannot read dataset {}: {}", path.display(), e))
    })?;
    let insights = parse_dataset(&bytes)?;
    info!(path = %path.display(), records = insights.len(), "Loaded insight dataset");
    Ok(insights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_export_shapes() {
        let json = br#"[
            {
                "_id": {"$oid": "5d8d1a1b"},
                "end_year": "",
                "intensity": 6,
                "sector": "Energy",
                "topic": "gas",
                "insight": "Annual Energy Outlook",
                "url": "http://www.eia.gov/outlooks/aeo/",
                "region": "Northern America",
                "start_year": "",
                "impact": "",
                "added": "January, 20 2017 03:51:25",
                "published": "January, 09 2017 00:00:00",
                "country": "United States of America",
                "relevance": 2,
                "pestle": "Industries",
                "source": "EIA",
                "title": "U.S. natural gas consumption is expected to increase.",
                "likelihood": 3
            },
            {
                "id": "abc",
                "end_year": 2027,
                "intensity": "",
                "likelihood": "4",
                "relevance": null,
                "topic": "  oil  "
            },
            {
                "topic": "market",
                "__v": 0
            }
        ]"#;

        let insights = parse_dataset(json).unwrap();
        assert_eq!(insights.len(), 3);

        assert_eq!(insights[0].id, "5d8d1a1b");
        assert_eq!(insights[0].intensity, Some(6.0));
        assert_eq!(insights[0].end_year, "");

        assert_eq!(insights[1].id, "abc");
        assert_eq!(insights[1].end_year, "2027");
        assert_eq!(insights[1].intensity, None);
        assert_eq!(insights[1].likelihood, Some(4.0));
        assert_eq!(insights[1].relevance, None);
        assert_eq!(insights[1].topic, "oil");

        // Missing id falls back to position
        assert_eq!(insights[2].id, "3");
        assert_eq!(insights[2].sector, "");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = br#"[{"_id": "a"}, {"_id": "a"}]"#;
        let err = parse_dataset(json).unwrap_err();
        assert!(matches!(err, Error::DataSourceUnavailable(_)));
    }

    #[test]
    fn test_non_numeric_score_rejected() {
        let json = br#"[{"_id": "a", "intensity": "high"}]"#;
        assert!(parse_dataset(json).is_err());
    }

    #[test]
    fn test_non_finite_score_rejected() {
        for raw in ["NaN", "inf", "-Infinity"] {
            let json = format!(r#"[{{"_id": "a", "intensity": "{}"}}]"#, raw);
            let err = parse_dataset(json.as_bytes()).unwrap_err();
            assert!(matches!(err, Error::DataSourceUnavailable(_)), "{}", raw);
        }
    }

    #[test]
    fn test_object_id_preferred_over_id() {
        let json = br#"[
            {"_id": {"$oid": "5d8d1a1b"}, "id": "legacy-1", "topic": "oil"},
            {"_id": "", "id": "legacy-2"},
            {"id": 7}
        ]"#;
        let insights = parse_dataset(json).unwrap();
        assert_eq!(insights[0].id, "5d8d1a1b");
        assert_eq!(insights[1].id, "legacy-2");
        assert_eq!(insights[2].id, "7");
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let err = load_dataset(Path::new("/nonexistent/vantage/insights.json")).unwrap_err();
        assert!(matches!(err, Error::DataSourceUnavailable(_)));
    }
}
