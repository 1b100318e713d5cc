//! Submission validation.
//!
//! Works on the generic JSON value so that missing fields, wrong types and
//! instrument rules all surface as [`MetricsError::Validation`] with a
//! readable reason. Nothing here touches the registry.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{MetricsError, Result};
use crate::instrument::InstrumentKind;
use crate::labels::LabelSet;

const REQUIRED_FIELDS: [&str; 3] = ["metric_name", "instrument_type", "value"];

/// A submission that passed every rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub metric_name: String,
    pub instrument_type: InstrumentKind,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub attributes: LabelSet,
}

fn invalid(msg: impl Into<String>) -> MetricsError {
    MetricsError::Validation(msg.into())
}

fn allowed_kinds() -> String {
    InstrumentKind::ALL
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn optional_string(obj: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(invalid(format!("{field} must be a string"))),
    }
}

fn attributes(obj: &Map<String, Value>) -> Result<LabelSet> {
    let raw = match obj.get("attributes") {
        None | Some(Value::Null) => return Ok(LabelSet::new()),
        Some(Value::Object(m)) => m,
        Some(_) => return Err(invalid("attributes must be an object")),
    };
    let mut out = LabelSet::new();
    for (k, v) in raw {
        let Value::String(s) = v else {
            return Err(invalid(format!("attribute {k} must be a string")));
        };
        out.insert(k.as_str(), s.as_str());
    }
    Ok(out)
}

/// Check a parsed request body and extract a [`Submission`].
pub fn validate(body: &Value) -> Result<Submission> {
    let obj = body
        .as_object()
        .ok_or_else(|| invalid("request body must be a JSON object"))?;

    // 1) required fields
    for field in REQUIRED_FIELDS {
        if obj.get(field).map_or(true, Value::is_null) {
            return Err(invalid(format!("missing required field: {field}")));
        }
    }

    let metric_name = match &body["metric_name"] {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::String(_) => return Err(invalid("metric_name must not be empty")),
        _ => return Err(invalid("metric_name must be a string")),
    };

    // 2) instrument type
    let kind: InstrumentKind = body["instrument_type"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            invalid(format!(
                "instrument_type must be one of the OpenTelemetry synchronous instruments: {}",
                allowed_kinds()
            ))
        })?;

    // 3) numeric value
    let value = body["value"]
        .as_f64()
        .ok_or_else(|| invalid("value must be a number"))?;

    // 4) / 5) instrument rules
    match kind {
        InstrumentKind::Counter if value < 0.0 => {
            return Err(invalid("counter values must be non-negative"));
        }
        InstrumentKind::Histogram if !value.is_finite() => {
            return Err(invalid("histogram values must be finite (no NaN or infinity)"));
        }
        _ => {}
    }

    let unit = optional_string(obj, "unit")?;
    let description = optional_string(obj, "description")?;

    // 6) attribute names must stay distinct in the exposition
    let attributes = attributes(obj)?;
    attributes.check_names(kind.reserved_labels())?;

    Ok(Submission {
        metric_name,
        instrument_type: kind,
        value,
        unit,
        description,
        attributes,
    })
}
