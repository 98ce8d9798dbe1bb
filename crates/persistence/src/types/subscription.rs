//! Subscription records.
//!
//! A subscription is either time-based ([`SubscriptionKind::Monthly`]) or
//! count-based ([`SubscriptionKind::Visits`]). Each kind owns a disjoint set
//! of optional counts and validation rejects the other kind's fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ParseEnumError, RecordMeta, deserialize_some};
use crate::core::{Patch, Record};
use crate::validation::{Validate, Validator};

/// Subscription category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionKind {
    /// Unlimited lessons for a number of months.
    Monthly,
    /// A fixed number of lessons valid for a number of months.
    Visits,
}

impl SubscriptionKind {
    /// Returns the stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionKind::Monthly => "monthly",
            SubscriptionKind::Visits => "visits",
        }
    }
}

impl fmt::Display for SubscriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(SubscriptionKind::Monthly),
            "visits" => Ok(SubscriptionKind::Visits),
            _ => Err(ParseEnumError::new("subscription type", s)),
        }
    }
}

/// A purchasable subscription plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Persistence metadata.
    #[serde(flatten)]
    pub meta: RecordMeta,

    /// Display name.
    pub name: String,

    /// Price in minor currency units.
    pub price: i32,

    /// Category.
    #[serde(rename = "type")]
    pub kind: SubscriptionKind,

    /// Length of a monthly plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<i16>,

    /// Number of lessons in a visits plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sessions_count: Option<i16>,

    /// How long a visits plan stays usable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_months: Option<i16>,
}

impl Subscription {
    /// Creates an unsaved monthly plan.
    pub fn monthly(name: impl Into<String>, price: i32, duration_months: Option<i16>) -> Self {
        Self {
            meta: RecordMeta::default(),
            name: name.into(),
            price,
            kind: SubscriptionKind::Monthly,
            duration_months,
            sessions_count: None,
            validity_months: None,
        }
    }

    /// Creates an unsaved visits plan.
    pub fn visits(
        name: impl Into<String>,
        price: i32,
        sessions_count: Option<i16>,
        validity_months: Option<i16>,
    ) -> Self {
        Self {
            meta: RecordMeta::default(),
            name: name.into(),
            price,
            kind: SubscriptionKind::Visits,
            duration_months: None,
            sessions_count,
            validity_months,
        }
    }
}

fn check_count(v: &mut Validator, value: Option<i16>, field: &str) {
    if let Some(count) = value {
        v.check(count > 0, field, "must be greater than zero");
    }
}

impl Validate for Subscription {
    fn validate(&self, v: &mut Validator) {
        v.check(!self.name.is_empty(), "name", "must be provided");
        v.check(
            self.name.len() <= 200,
            "name",
            "must not be more than 200 bytes long",
        );
        v.check(self.price > 0, "price", "must be greater than zero");

        check_count(v, self.duration_months, "duration_months");
        check_count(v, self.sessions_count, "sessions_count");
        check_count(v, self.validity_months, "validity_months");

        match self.kind {
            SubscriptionKind::Monthly => {
                v.check(
                    self.validity_months.is_none(),
                    "validity_months",
                    "must not be set for a monthly subscription",
                );
                v.check(
                    self.sessions_count.is_none(),
                    "sessions_count",
                    "must not be set for a monthly subscription",
                );
            }
            SubscriptionKind::Visits => {
                v.check(
                    self.duration_months.is_none(),
                    "duration_months",
                    "must not be set for a visits subscription",
                );
            }
        }
    }
}

impl Record for Subscription {
    const RESOURCE: &'static str = "subscription";

    const SORT_SAFELIST: &'static [&'static str] = &[
        "id", "name", "price", "type", "-id", "-name", "-price", "-type",
    ];

    type Filter = SubscriptionFilter;

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }
}

/// Filters accepted when listing subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    /// Exact category.
    #[serde(default, rename = "type")]
    pub kind: Option<SubscriptionKind>,
}

/// Partial update of a subscription.
///
/// Count fields distinguish an absent key (leave unchanged) from an explicit
/// `null` (clear the value).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPatch {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New price.
    #[serde(default)]
    pub price: Option<i32>,
    /// New category.
    #[serde(default, rename = "type")]
    pub kind: Option<SubscriptionKind>,
    /// New or cleared duration.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub duration_months: Option<Option<i16>>,
    /// New or cleared session count.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub sessions_count: Option<Option<i16>>,
    /// New or cleared validity.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub validity_months: Option<Option<i16>>,
}

impl Patch<Subscription> for SubscriptionPatch {
    fn apply(self, sub: &mut Subscription) {
        if let Some(name) = self.name {
            sub.name = name;
        }
        if let Some(price) = self.price {
            sub.price = price;
        }
        if let Some(kind) = self.kind {
            sub.kind = kind;
        }
        if let Some(duration_months) = self.duration_months {
            sub.duration_months = duration_months;
        }
        if let Some(sessions_count) = self.sessions_count {
            sub.sessions_count = sessions_count;
        }
        if let Some(validity_months) = self.validity_months {
            sub.validity_months = validity_months;
        }
    }
}
