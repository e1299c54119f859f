//! Navigation row types as emitted by `ReadNavigation`
//!
//! The procedure is loose about types: identifiers and small integers come
//! back as numbers from some servers and as strings from others. The
//! deserializers here accept both so the rest of the crate can rely on a
//! single shape.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An `ObjNo`-style identifier.
///
/// Keeps the wire type it arrived with, but compares and hashes by its
/// canonical string form, so `3003721` and `"3003721"` are the same object.
#[derive(Debug, Clone)]
pub enum ObjNo {
    Int(i64),
    Text(String),
}

impl ObjNo {
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            ObjNo::Int(i) => Cow::Owned(i.to_string()),
            ObjNo::Text(s) => Cow::Borrowed(s.trim()),
        }
    }
}

impl PartialEq for ObjNo {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ObjNo::Int(a), ObjNo::Int(b)) => a == b,
            _ => self.canonical() == other.canonical(),
        }
    }
}

impl Eq for ObjNo {}

impl Hash for ObjNo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for ObjNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<i64> for ObjNo {
    fn from(value: i64) -> Self {
        ObjNo::Int(value)
    }
}

impl From<&str> for ObjNo {
    fn from(value: &str) -> Self {
        ObjNo::Text(value.to_string())
    }
}

impl From<String> for ObjNo {
    fn from(value: String) -> Self {
        ObjNo::Text(value)
    }
}

impl Serialize for ObjNo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ObjNo::Int(i) => serializer.serialize_i64(*i),
            ObjNo::Text(s) => serializer.serialize_str(s),
        }
    }
}

struct ObjNoVisitor;

impl<'de> Visitor<'de> for ObjNoVisitor {
    type Value = ObjNo;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an integer or string identifier")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ObjNo, E> {
        Ok(ObjNo::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ObjNo, E> {
        i64::try_from(v)
            .map(ObjNo::Int)
            .or_else(|_| Ok(ObjNo::Text(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<ObjNo, E> {
        if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Ok(ObjNo::Int(v as i64))
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ObjNo, E> {
        Ok(ObjNo::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<ObjNo, E> {
        Ok(ObjNo::Text(v))
    }
}

impl<'de> Deserialize<'de> for ObjNo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ObjNoVisitor)
    }
}

/// Integer columns that may arrive as numbers or numeric strings.
///
/// Anything that does not parse (non-numeric text, null) reads as 0, which
/// keeps e.g. `IsActive = "N"` on the inactive side.
fn loose_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
                .unwrap_or(0)
        }
        Some(serde_json::Value::Bool(b)) => i64::from(b),
        _ => 0,
    })
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level menu entry (Strategy, Planning, ERM, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NavModule {
    pub obj_no: ObjNo,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub icon: String,
    #[serde(default, deserialize_with = "loose_i64")]
    pub sort_order: i64,
    #[serde(default, deserialize_with = "loose_i64")]
    pub status_no: i64,
    #[serde(default, deserialize_with = "loose_i64")]
    pub is_active: i64,
}

impl NavModule {
    /// Integer semantics: only `1` is active.
    pub fn is_active(&self) -> bool {
        self.is_active == 1
    }
}

/// Item under a module. `FormID` set means it opens a data form directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NavChild {
    pub obj_no: ObjNo,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    pub parent_obj_no: ObjNo,
    #[serde(default, deserialize_with = "loose_i64")]
    pub obj_type_no: i64,
    #[serde(default, deserialize_with = "loose_i64")]
    pub sort_order: i64,
    #[serde(default, deserialize_with = "loose_i64")]
    pub status_no: i64,
    #[serde(rename = "FormID", default)]
    pub form_id: Option<ObjNo>,
}

impl NavChild {
    pub fn is_form_item(&self) -> bool {
        self.form_id.is_some()
    }

    pub fn route(&self) -> NavRoute {
        match &self.form_id {
            Some(form_id) => NavRoute::Form {
                form_id: form_id.clone(),
            },
            None => NavRoute::Module {
                parent: self.parent_obj_no.clone(),
                child: self.obj_no.clone(),
            },
        }
    }
}

/// Where a child entry leads in the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRoute {
    /// Generic form view for a `ReadNewERM` form.
    Form { form_id: ObjNo },
    /// Placeholder page for children with no form yet.
    Module { parent: ObjNo, child: ObjNo },
}

impl NavRoute {
    pub fn path(&self) -> String {
        match self {
            NavRoute::Form { form_id } => format!("/form/{}", form_id),
            NavRoute::Module { parent, child } => format!("/module/{}/{}", parent, child),
        }
    }
}

impl Serialize for NavRoute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path())
    }
}
