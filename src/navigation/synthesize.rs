//! Two-level navigation tree built from the flat `ReadNavigation` sets

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::overrides::FormIdOverrideTable;
use super::types::{NavChild, NavModule, NavRoute, ObjNo};

/// Modules plus children grouped by parent. Immutable once built; a reload
/// replaces the whole tree.
#[derive(Debug, Clone, Default)]
pub struct NavigationTree {
    modules: Vec<NavModule>,
    children_by_parent: HashMap<ObjNo, Vec<NavChild>>,
    erm_parent: Option<ObjNo>,
}

/// Build the tree.
///
/// Children of the ERM parent are deduplicated by `ObjNo` (first row wins)
/// and get their `FormID` from `overrides`, or `None` when the code is not in
/// the table. All other children pass through untouched. Order within each
/// parent follows input order.
pub fn synthesize(
    modules: Vec<NavModule>,
    children: Vec<NavChild>,
    overrides: &FormIdOverrideTable,
) -> NavigationTree {
    let erm_parent = overrides.erm_parent();
    let mut children_by_parent: HashMap<ObjNo, Vec<NavChild>> = HashMap::new();
    let mut seen: HashSet<ObjNo> = HashSet::new();

    for mut child in children {
        if child.parent_obj_no == erm_parent {
            if !seen.insert(child.obj_no.clone()) {
                continue;
            }
            child.form_id = overrides.lookup(&child.code);
        }

        children_by_parent
            .entry(child.parent_obj_no.clone())
            .or_default()
            .push(child);
    }

    NavigationTree {
        modules,
        children_by_parent,
        erm_parent: Some(erm_parent),
    }
}

impl NavigationTree {
    /// Modules with `IsActive == 1`, in source order.
    pub fn active_modules(&self) -> Vec<&NavModule> {
        self.modules.iter().filter(|m| m.is_active()).collect()
    }

    pub fn all_modules(&self) -> &[NavModule] {
        &self.modules
    }

    pub fn children_of(&self, parent: &ObjNo) -> &[NavChild] {
        self.children_by_parent
            .get(parent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn erm_children(&self) -> &[NavChild] {
        match &self.erm_parent {
            Some(parent) => self.children_of(parent),
            None => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.children_by_parent.is_empty()
    }

    /// Active modules with their children, ready to render as a menu.
    pub fn menu(&self) -> Vec<MenuModule> {
        self.active_modules()
            .into_iter()
            .map(|module| MenuModule {
                module: module.clone(),
                children: self
                    .children_of(&module.obj_no)
                    .iter()
                    .map(MenuChild::from)
                    .collect(),
            })
            .collect()
    }
}

/// Serialized view of one menu module.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MenuModule {
    #[serde(flatten)]
    pub module: NavModule,
    pub children: Vec<MenuChild>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MenuChild {
    #[serde(flatten)]
    pub child: NavChild,
    pub route: NavRoute,
}

impl From<&NavChild> for MenuChild {
    fn from(child: &NavChild) -> Self {
        Self {
            child: child.clone(),
            route: child.route(),
        }
    }
}
