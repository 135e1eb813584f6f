//! Categorical row filtering for the decomposition view. The front-end's
//! multi-selects report chosen values; this module turns them into a row
//! subset. An empty selection means an empty table, never select-all.

use anyhow::Result;
use std::collections::BTreeSet;

use crate::table::MetricTable;

pub const COL_METHOD: &str = "Method";
pub const COL_BACKBONE: &str = "Backbone";
pub const COL_AUGMENTATION: &str = "Data Augmentation";

/// Selected values per categorical column.
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub methods: BTreeSet<String>,
    pub backbones: BTreeSet<String>,
    pub augmentations: BTreeSet<String>,
}

impl FilterSelection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every distinct value of every filter column — the default page state.
    pub fn select_all(table: &MetricTable) -> Result<Self> {
        Ok(Self {
            methods: table.text(COL_METHOD)?.into_iter().collect(),
            backbones: table.text(COL_BACKBONE)?.into_iter().collect(),
            augmentations: table.text(COL_AUGMENTATION)?.into_iter().collect(),
        })
    }

    pub fn with_methods<I: IntoIterator<Item = S>, S: Into<String>>(mut self, values: I) -> Self {
        self.methods = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_backbones<I: IntoIterator<Item = S>, S: Into<String>>(mut self, values: I) -> Self {
        self.backbones = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_augmentations<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        values: I,
    ) -> Self {
        self.augmentations = values.into_iter().map(Into::into).collect();
        self
    }

    /// Rows whose Method, Backbone, and Data Augmentation are all members of
    /// the corresponding selected sets, in original order.
    pub fn apply(&self, table: &MetricTable) -> Result<MetricTable> {
        let methods = table.text(COL_METHOD)?;
        let backbones = table.text(COL_BACKBONE)?;
        let augmentations = table.text(COL_AUGMENTATION)?;

        let keep: Vec<bool> = methods
            .iter()
            .zip(&backbones)
            .zip(&augmentations)
            .map(|((m, b), a)| {
                self.methods.contains(m)
                    && self.backbones.contains(b)
                    && self.augmentations.contains(a)
            })
            .collect();
        table.subset(&keep)
    }
}
