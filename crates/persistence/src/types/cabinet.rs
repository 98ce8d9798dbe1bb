//! Cabinet records.

use serde::{Deserialize, Serialize};

use super::RecordMeta;
use crate::core::{Patch, Record};
use crate::validation::{Validate, Validator};

/// A room where lessons take place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cabinet {
    /// Persistence metadata.
    #[serde(flatten)]
    pub meta: RecordMeta,

    /// Display name.
    pub name: String,

    /// Street address.
    #[serde(default)]
    pub address: String,
}

impl Cabinet {
    /// Creates an unsaved cabinet.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            meta: RecordMeta::default(),
            name: name.into(),
            address: address.into(),
        }
    }
}

impl Validate for Cabinet {
    fn validate(&self, v: &mut Validator) {
        v.check(!self.name.is_empty(), "name", "must be provided");
        v.check(
            self.name.len() <= 200,
            "name",
            "must not be more than 200 bytes long",
        );
        v.check(
            self.address.len() <= 500,
            "address",
            "must not be more than 500 bytes long",
        );
    }
}

impl Record for Cabinet {
    const RESOURCE: &'static str = "cabinet";

    const SORT_SAFELIST: &'static [&'static str] =
        &["id", "name", "address", "-id", "-name", "-address"];

    type Filter = ();

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

/// Partial update of a cabinet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetPatch {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New address.
    #[serde(default)]
    pub address: Option<String>,
}

impl Patch<Cabinet> for CabinetPatch {
    fn apply(self, cabinet: &mut Cabinet) {
        if let Some(name) = self.name {
            cabinet.name = name;
        }
        if let Some(address) = self.address {
            cabinet.address = address;
        }
    }
}
