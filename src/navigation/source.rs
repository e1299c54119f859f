//! Where navigation rows come from

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::types::{NavChild, NavModule};
use crate::error::{PortalError, Result};
use crate::models::RawRow;

pub const READ_NAVIGATION: &str = "ReadNavigation";

/// The two `ReadNavigation` result sets, modules first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationData {
    pub modules: Vec<NavModule>,
    pub children: Vec<NavChild>,
}

impl NavigationData {
    /// Decode raw result sets. Set 0 is modules, set 1 is children; missing
    /// sets read as empty, extra sets are ignored.
    pub fn from_result_sets(result_sets: Vec<Vec<RawRow>>) -> Result<Self> {
        let mut sets = result_sets.into_iter();
        let modules = decode_rows(sets.next().unwrap_or_default(), "navigation module")?;
        let children = decode_rows(sets.next().unwrap_or_default(), "navigation child")?;
        Ok(Self { modules, children })
    }
}

fn decode_rows<T: serde::de::DeserializeOwned>(
    rows: Vec<RawRow>,
    kind: &'static str,
) -> Result<Vec<T>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::to_value(&row)
                .and_then(serde_json::from_value)
                .map_err(|source| PortalError::RowDecode {
                    kind,
                    index,
                    source,
                })
        })
        .collect()
}

/// Fetches the navigation result sets.
#[async_trait]
pub trait NavigationSource: Send + Sync {
    async fn fetch_navigation(&self) -> Result<NavigationData>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::ObjNo;

    #[test]
    fn test_from_result_sets() {
        let modules = vec![RawRow::new()
            .with("ObjNo", 3003721)
            .with("Code", "ERM")
            .with("Name", "ERM")
            .with("Description", Option::<String>::None)
            .with("Icon", "E")
            .with("SortOrder", 1)
            .with("StatusNo", 1)
            .with("IsActive", 1)];
        let children = vec![RawRow::new()
            .with("ObjNo", 1)
            .with("Code", "Stakeholder")
            .with("Name", "Stakeholder")
            .with("ParentObjNo", 3003721)
            .with("ObjTypeNo", 826)
            .with("SortOrder", 1)
            .with("StatusNo", 1)
            .with("FormID", 55)];

        let data = NavigationData::from_result_sets(vec![modules, children, vec![]]).unwrap();
        assert_eq!(data.modules.len(), 1);
        assert!(data.modules[0].is_active());
        assert_eq!(data.children[0].form_id, Some(ObjNo::from(55)));
    }

    #[test]
    fn test_missing_sets_are_empty() {
        let data = NavigationData::from_result_sets(vec![]).unwrap();
        assert_eq!(data, NavigationData::default());
    }

    #[test]
    fn test_bad_row_reports_index() {
        let children = vec![RawRow::new().with("Code", "no ids")];
        let err = NavigationData::from_result_sets(vec![vec![], children]).unwrap_err();
        assert!(matches!(
            err,
            PortalError::RowDecode { kind: "navigation child", index: 0, .. }
        ));
    }
}
