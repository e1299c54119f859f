//! FormID override table for the ERM subtree
//!
//! `ReadNavigation` joins children to forms on ObjCode + ObjTypeNo = 826, and
//! for children of the ERM module that join returns wrong and duplicated
//! FormIDs. Until the procedure is fixed, every ERM child takes its FormID
//! from this table and nowhere else. Delete the table (and its single call
//! site in `synthesize`) once the join is correct.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::ObjNo;
use crate::error::ConfigError;

/// ObjNo of the ERM top-level module.
pub const DEFAULT_ERM_PARENT_OBJ_NO: i64 = 3003721;

/// Version tag of the built-in table.
pub const BUILTIN_TABLE_VERSION: &str = "backend-003";

/// Child `Code` → known-correct FormID, scoped to one parent module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormIdOverrideTable {
    pub version: String,
    pub erm_parent_obj_no: i64,
    pub form_ids: BTreeMap<String, i64>,
}

impl Default for FormIdOverrideTable {
    fn default() -> Self {
        let form_ids = [
            ("Stakeholder", 3002443),
            ("Product", 3003751),
            ("Business Process", 3004196),
            ("Resource", 3000825),
            ("Look-ups", 3001603),
            ("Share Register", 3003754),
            ("Related Party", 3003752),
            ("Addresses", 3000650),
            ("Documents", 3001488),
            ("Account", 3000743),
            ("AccountSetUp", 3003725),
            ("Specific Fees", 3004095),
            ("Bank Transaction", 3000152),
            ("Journals", 3000214),
            ("General Ledgers", 3003744),
            ("Sub-Product", 3003756),
            ("Sub-Product Detail", 3004120),
            ("Global Fees", 3003745),
            ("Equipment", 3000908),
            ("Master Tasks", 3001231),
        ]
        .into_iter()
        .map(|(code, form_id)| (code.to_string(), form_id))
        .collect();

        Self {
            version: BUILTIN_TABLE_VERSION.to_string(),
            erm_parent_obj_no: DEFAULT_ERM_PARENT_OBJ_NO,
            form_ids,
        }
    }
}

impl FormIdOverrideTable {
    /// Load a table from YAML:
    ///
    /// ```yaml
    /// version: backend-003
    /// erm_parent_obj_no: 3003721
    /// form_ids:
    ///   Stakeholder: 3002443
    /// ```
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: display,
            source,
        })
    }

    pub fn with_erm_parent(mut self, erm_parent_obj_no: i64) -> Self {
        self.erm_parent_obj_no = erm_parent_obj_no;
        self
    }

    pub fn erm_parent(&self) -> ObjNo {
        ObjNo::Int(self.erm_parent_obj_no)
    }

    /// Override for `code`, as a string-typed identifier.
    pub fn lookup(&self, code: &str) -> Option<ObjNo> {
        self.form_ids
            .get(code)
            .map(|form_id| ObjNo::Text(form_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.form_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.form_ids.is_empty()
    }
}
