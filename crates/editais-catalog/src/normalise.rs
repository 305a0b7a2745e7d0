//! Raw API record → canonical `Notice`.
//!
//! The API nests most fields in a `json_data` payload that may arrive either
//! as an object or as JSON text, and attachments in `arquivos_json` with the
//! same ambiguity. Every field is resolved in a fixed order: payload first,
//! then the top-level record, then a default.
//!
//! Decoding fails closed: a blob that is not valid JSON, or that holds the
//! wrong JSON type, rejects the whole record with `NormalizeError`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use editais_common::entities::{
    Attachment, Notice, DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_REGION, DEFAULT_TITLE,
    NOT_INFORMED,
};

// ── Keys ──────────────────────────────────────────────────────────────────────

const PAYLOAD: &[&str] = &["json_data", "payload"];
const TOP_ATTACHMENTS: &[&str] = &["arquivos_json", "attachments", "anexos"];
const PAYLOAD_ATTACHMENTS: &[&str] = &["anexos", "attachments", "arquivos"];

const TITLE: &[&str] = &["titulo", "title"];
const DESCRIPTION: &[&str] = &["descricao", "description"];
const REGION: &[&str] = &["regiao", "region"];
const CATEGORY: &[&str] = &["categoria", "category"];
const SUPPORT_TYPE: &[&str] = &["tipo_apoio", "support_type"];
const NOTICE_TYPE: &[&str] = &["tipo_edital", "notice_type"];
const CLOSING_DATE: &[&str] = &["data_final_submissao", "closing_date"];
const OPENING_DATE: &[&str] = &["data_abertura", "opening_date"];
const TAGS: &[&str] = &["tags"];
const SHARE_LINK: &[&str] = &["share_link"];
const TOTAL_VALUE: &[&str] = &["valor_total", "total_value"];
const TARGET_AUDIENCE: &[&str] = &["publico_alvo", "target_audience"];
const INSTITUTION: &[&str] = &["instituicao", "institution"];
const ICON: &[&str] = &["icone", "icon"];

// ── Types ─────────────────────────────────────────────────────────────────────

/// One record exactly as the API returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawNotice(pub Map<String, Value>);

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("record {id}: field `{field}` is malformed: {reason}")]
    MalformedField {
        id: String,
        field: &'static str,
        reason: String,
    },

    #[error("record has no usable id")]
    MissingId,
}

/// Result of normalizing a whole API response.
#[derive(Debug, Default)]
pub struct NormalizeReport {
    pub notices: Vec<Notice>,
    pub rejected: Vec<NormalizeError>,
}

#[derive(Clone, Copy)]
enum Shape {
    Object,
    Array,
}

impl Shape {
    fn empty(self) -> Value {
        match self {
            Shape::Object => Value::Object(Map::new()),
            Shape::Array => Value::Array(Vec::new()),
        }
    }

    fn matches(self, v: &Value) -> bool {
        matches!((self, v), (Shape::Object, Value::Object(_)) | (Shape::Array, Value::Array(_)))
    }

    fn name(self) -> &'static str {
        match self {
            Shape::Object => "an object",
            Shape::Array => "an array",
        }
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Decoding helpers ──────────────────────────────────────────────────────────

/// Structured value as-is, JSON text parsed, absent → empty structure.
fn decode_blob(
    id: &str,
    field: &'static str,
    value: Option<&Value>,
    shape: Shape,
) -> Result<Value, NormalizeError> {
    let malformed = |reason: String| NormalizeError::MalformedField {
        id: id.to_string(),
        field,
        reason,
    };

    let decoded = match value {
        None | Some(Value::Null) => return Ok(shape.empty()),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(shape.empty()),
        Some(Value::String(s)) => {
            serde_json::from_str::<Value>(s).map_err(|e| malformed(e.to_string()))?
        }
        Some(v) => v.clone(),
    };

    if decoded.is_null() {
        return Ok(shape.empty());
    }
    if !shape.matches(&decoded) {
        return Err(malformed(format!("expected {}, found {}", shape.name(), kind(&decoded))));
    }
    Ok(decoded)
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Canonical `YYYY-MM-DD`; a time suffix is dropped, `dd/mm/yyyy` is accepted.
fn as_date(v: &Value) -> Option<String> {
    let text = as_text(v)?;
    let day = text.split(['T', ' ']).next().unwrap_or_default();
    let parsed = NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(day, "%d/%m/%Y"));
    match parsed {
        Ok(date) => Some(date.format("%Y-%m-%d").to_string()),
        Err(_) => {
            debug!(value = %text, "Ignoring unparseable date");
            None
        }
    }
}

fn as_tags(v: &Value) -> Option<Vec<String>> {
    let raw: Vec<String> = match v {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        _ => return None,
    };

    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    (!tags.is_empty()).then_some(tags)
}

fn parse_attachments(
    id: &str,
    field: &'static str,
    list: &Value,
) -> Result<Vec<Attachment>, NormalizeError> {
    let Value::Array(entries) = list else {
        return Ok(Vec::new());
    };

    let mut out = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let default_name = || format!("Anexo {}", i + 1);
        match entry {
            Value::Object(obj) => {
                let Some(url) = obj.get("url").and_then(as_text) else {
                    debug!(id, index = i, "Skipping attachment without url");
                    continue;
                };
                let name = obj
                    .get("nome")
                    .or_else(|| obj.get("name"))
                    .and_then(as_text)
                    .unwrap_or_else(default_name);
                out.push(Attachment { name, url });
            }
            Value::String(_) => {
                if let Some(url) = as_text(entry) {
                    out.push(Attachment { name: default_name(), url });
                }
            }
            other => {
                return Err(NormalizeError::MalformedField {
                    id: id.to_string(),
                    field,
                    reason: format!("attachment {} is {}", i + 1, kind(other)),
                })
            }
        }
    }
    Ok(out)
}

// ── Field resolution ──────────────────────────────────────────────────────────

struct Sources<'a> {
    payload: &'a Map<String, Value>,
    top: &'a Map<String, Value>,
}

impl<'a> Sources<'a> {
    /// Payload values for `keys`, then top-level values, in key order.
    fn candidates(&self, keys: &[&str]) -> Vec<&'a Value> {
        let payload: &'a Map<String, Value> = self.payload;
        let top: &'a Map<String, Value> = self.top;
        keys.iter()
            .filter_map(|k| payload.get(*k))
            .chain(keys.iter().filter_map(|k| top.get(*k)))
            .collect()
    }

    fn text(&self, keys: &[&str]) -> Option<String> {
        self.candidates(keys).into_iter().find_map(as_text)
    }

    fn date(&self, keys: &[&str]) -> Option<String> {
        self.candidates(keys).into_iter().find_map(as_date)
    }

    fn tags(&self) -> Vec<String> {
        self.candidates(TAGS)
            .into_iter()
            .find_map(as_tags)
            .unwrap_or_default()
    }
}

fn record_id(top: &Map<String, Value>) -> Result<String, NormalizeError> {
    top.get("id").and_then(as_text).ok_or(NormalizeError::MissingId)
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Normalize one raw record.
pub fn normalize(raw: &RawNotice) -> Result<Notice, NormalizeError> {
    let top = &raw.0;
    let id = record_id(top)?;

    let payload_value = decode_blob(
        &id,
        "json_data",
        PAYLOAD.iter().find_map(|k| top.get(*k)),
        Shape::Object,
    )?;
    let empty = Map::new();
    let payload = payload_value.as_object().unwrap_or(&empty);
    let src = Sources { payload, top };

    // Attachments: payload list first, then the top-level list.
    let mut attachments = Vec::new();
    if let Some(v) = PAYLOAD_ATTACHMENTS.iter().find_map(|k| payload.get(*k)) {
        let list = decode_blob(&id, "json_data.anexos", Some(v), Shape::Array)?;
        attachments = parse_attachments(&id, "json_data.anexos", &list)?;
    }
    if attachments.is_empty() {
        let list = decode_blob(
            &id,
            "arquivos_json",
            TOP_ATTACHMENTS.iter().find_map(|k| top.get(*k)),
            Shape::Array,
        )?;
        attachments = parse_attachments(&id, "arquivos_json", &list)?;
    }

    let tags = src.tags();
    let category = src
        .text(CATEGORY)
        .or_else(|| tags.first().cloned())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

    Ok(Notice {
        title: src.text(TITLE).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: src
            .text(DESCRIPTION)
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        region: src.text(REGION).unwrap_or_else(|| DEFAULT_REGION.to_string()),
        category,
        support_type: src.text(SUPPORT_TYPE).unwrap_or_else(|| NOT_INFORMED.to_string()),
        notice_type: src.text(NOTICE_TYPE).unwrap_or_else(|| NOT_INFORMED.to_string()),
        closing_date: src.date(CLOSING_DATE),
        opening_date: src.date(OPENING_DATE),
        tags,
        attachments,
        share_link: src.text(SHARE_LINK),
        total_value: src.text(TOTAL_VALUE),
        target_audience: src.text(TARGET_AUDIENCE),
        institution: src.text(INSTITUTION),
        icon: src.text(ICON),
        id,
    })
}

/// Normalize a whole response. Rejected records are logged and reported,
/// the rest load.
pub fn normalize_all(raw: &[RawNotice]) -> NormalizeReport {
    let mut report = NormalizeReport::default();
    for record in raw {
        match normalize(record) {
            Ok(notice) => report.notices.push(notice),
            Err(e) => {
                warn!(error = %e, "Rejecting malformed notice");
                report.rejected.push(e);
            }
        }
    }
    report
}

/// Canonical record shape, so a normalized notice can be fed back in.
impl From<&Notice> for RawNotice {
    fn from(n: &Notice) -> Self {
        let mut payload = Map::new();
        let mut put = |key: &str, value: Option<&String>| {
            if let Some(v) = value {
                payload.insert(key.to_string(), Value::String(v.clone()));
            }
        };
        put("descricao", Some(&n.description));
        put("regiao", Some(&n.region));
        put("categoria", Some(&n.category));
        put("tipo_apoio", Some(&n.support_type));
        put("tipo_edital", Some(&n.notice_type));
        put("data_abertura", n.opening_date.as_ref());
        put("valor_total", n.total_value.as_ref());
        put("publico_alvo", n.target_audience.as_ref());
        put("instituicao", n.institution.as_ref());
        put("icone", n.icon.as_ref());
        payload.insert(
            "tags".to_string(),
            Value::Array(n.tags.iter().cloned().map(Value::String).collect()),
        );

        let attachments: Vec<Value> = n
            .attachments
            .iter()
            .map(|a| serde_json::json!({ "nome": a.name, "url": a.url }))
            .collect();

        let mut top = Map::new();
        top.insert("id".to_string(), Value::String(n.id.clone()));
        top.insert("titulo".to_string(), Value::String(n.title.clone()));
        top.insert("json_data".to_string(), Value::Object(payload));
        top.insert("arquivos_json".to_string(), Value::Array(attachments));
        top.insert(
            "data_final_submissao".to_string(),
            n.closing_date.clone().map(Value::String).unwrap_or(Value::Null),
        );
        if let Some(link) = &n.share_link {
            top.insert("share_link".to_string(), Value::String(link.clone()));
        }
        RawNotice(top)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
