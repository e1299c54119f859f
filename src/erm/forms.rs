//! Static list of ERM forms shown in the sidebar
//!
//! Configuration data: each entry maps a menu item to the FormID passed to
//! `ReadNewERM` (ObjNo values with ObjTypeNo = 826).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErmForm {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErmFormCatalog {
    forms: Vec<ErmForm>,
}

impl Default for ErmFormCatalog {
    fn default() -> Self {
        let forms = [
            (3002443, "Stakeholder", "Stakeholder", "👥"),
            (3003751, "Product", "Product", "📦"),
            (3004196, "Business Process", "BusinessProcess", "⚙️"),
            (3000825, "Resource", "Resource", "🔧"),
            (3001603, "Look-ups", "LookUps", "🔍"),
            (3003754, "Share Register", "ShareRegister", "📋"),
            (3003752, "Related Party", "RelatedParty", "🤝"),
            (3000650, "Addresses", "Addresses", "📍"),
            (3001488, "Documents", "Documents", "📄"),
            (3000743, "Account", "Account", "💳"),
            (3003725, "Account Setup", "AccountSetUp", "🔧"),
            (3004095, "Specific Fees", "SpecificFees", "💰"),
            (3000152, "Bank Transaction", "BankTransaction", "🏦"),
            (3000214, "Journals", "Journals", "📓"),
            (3003744, "General Ledgers", "GeneralLedgers", "📊"),
            (3003756, "Sub-Product", "SubProduct", "📦"),
            (3004120, "Sub-Product Detail", "SubProductDetail", "📋"),
            (3003745, "Global Fees", "GlobalFees", "🌐"),
            (3000908, "Equipment", "Equipment", "🖥️"),
            (3001231, "Master Tasks", "MasterTasks", "✅"),
        ]
        .into_iter()
        .map(|(id, name, code, icon)| ErmForm {
            id,
            name: name.to_string(),
            code: code.to_string(),
            icon: icon.to_string(),
        })
        .collect();

        Self { forms }
    }
}

impl ErmFormCatalog {
    pub fn new(forms: Vec<ErmForm>) -> Self {
        Self { forms }
    }

    /// YAML list of `{id, name, code, icon}` entries.
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

    pub fn forms(&self) -> &[ErmForm] {
        &self.forms
    }

    pub fn find(&self, form_id: i64) -> Option<&ErmForm> {
        self.forms.iter().find(|f| f.id == form_id)
    }
}
