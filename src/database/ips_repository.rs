//! Procedure-backed sources for the ERM grid and navigation

use async_trait::async_trait;

use super::procedures::{ProcedureParam, ProcedureRunner};
use crate::erm::{ErmQuery, ErmSource, READ_NEW_ERM};
use crate::error::Result;
use crate::models::{RawRow, ScalarValue};
use crate::navigation::{NavigationData, NavigationSource, READ_NAVIGATION};

#[derive(Clone)]
pub struct IpsRepository {
    runner: ProcedureRunner,
}

impl IpsRepository {
    pub fn new(runner: ProcedureRunner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &ProcedureRunner {
        &self.runner
    }
}

/// Positional arguments for `ReadNewERM(FormID, ObjTypeList, RequiredDate)`.
pub fn erm_params(query: &ErmQuery) -> [ProcedureParam; 3] {
    [
        ProcedureParam::new("FormID", query.form_id),
        ProcedureParam::new("ObjTypeList", query.obj_type_list.as_str()),
        ProcedureParam::new(
            "RequiredDate",
            query
                .required_date
                .map(ScalarValue::DateTime)
                .unwrap_or(ScalarValue::Null),
        ),
    ]
}

#[async_trait]
impl ErmSource for IpsRepository {
    async fn fetch_erm_result(&self, query: &ErmQuery) -> Result<Vec<RawRow>> {
        self.runner
            .call_procedure(READ_NEW_ERM, &erm_params(query))
            .await
    }
}

#[async_trait]
impl NavigationSource for IpsRepository {
    async fn fetch_navigation(&self) -> Result<NavigationData> {
        let sets = self.runner.call_procedure_multi(READ_NAVIGATION, &[]).await?;
        NavigationData::from_result_sets(sets)
    }
}
