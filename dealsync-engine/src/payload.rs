//! Outbound payload construction.
//!
//! Three sources are merged into [`DealAttributes`]:
//! - the five user-chosen classification fields (validated up front),
//! - deal context fields looked up by fixed keys,
//! - values derived from deal metadata (`exclusive`, `offer`, `teamDeal`,
//!   `owningSide`).
//!
//! Optional context-backed fields go through [`present`]: a field whose
//! context is absent stays `None` and is omitted from the serialized body.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use dealsync_core::{
    AddressAttributes, ContextValue, Deal, DealAttributes, Direction, RemoteProfile,
};

use crate::classify::decide_owning_side;
use crate::error::ValidationError;

pub const FULL_ADDRESS: &str = "full_address";
pub const CITY: &str = "city";
pub const STATE: &str = "state";
pub const POSTAL_CODE: &str = "postal_code";
pub const SALES_PRICE: &str = "sales_price";
pub const CLOSING_DATE: &str = "closing_date";
pub const POSSESSION_DATE: &str = "possession_date";
pub const BLOCK_NUMBER: &str = "block_number";
pub const LOT_NUMBER: &str = "lot_number";
pub const MLS_NUMBER: &str = "mls_number";

// ---------------------------------------------------------------------------
// Form selections
// ---------------------------------------------------------------------------

/// Raw classification choices as picked by the user; any may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormSelections {
    #[serde(default)]
    pub deal_type: Option<String>,
    #[serde(default)]
    pub deal_sub_type: Option<String>,
    #[serde(default)]
    pub lead_source: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub sale_status: Option<String>,
}

/// All five selections, each present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSelections {
    deal_type: String,
    deal_sub_type: String,
    lead_source: String,
    property_type: String,
    sale_status: String,
}

impl FormSelections {
    /// Check selections in form order and report the first missing one.
    pub fn validate(&self) -> Result<ValidatedSelections, ValidationError> {
        Ok(ValidatedSelections {
            deal_type: required(&self.deal_type, ValidationError::MissingDealType)?,
            deal_sub_type: required(&self.deal_sub_type, ValidationError::MissingDealSubType)?,
            lead_source: required(&self.lead_source, ValidationError::MissingLeadSource)?,
            property_type: required(&self.property_type, ValidationError::MissingPropertyType)?,
            sale_status: required(&self.sale_status, ValidationError::MissingSaleStatus)?,
        })
    }
}

impl ValidatedSelections {
    pub fn deal_type(&self) -> &str {
        &self.deal_type
    }

    pub fn deal_sub_type(&self) -> &str {
        &self.deal_sub_type
    }

    pub fn lead_source(&self) -> &str {
        &self.lead_source
    }

    pub fn property_type(&self) -> &str {
        &self.property_type
    }

    pub fn sale_status(&self) -> &str {
        &self.sale_status
    }
}

fn required(value: &Option<String>, missing: ValidationError) -> Result<String, ValidationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or(missing)
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Build the deal attributes sent on both create and update.
pub fn build_deal_payload(
    deal: &Deal,
    agent: &RemoteProfile,
    selections: &ValidatedSelections,
) -> DealAttributes {
    let closed_at = present(deal, CLOSING_DATE, |v| v.date.map(format_timestamp));

    DealAttributes {
        deal_type: selections.deal_type.clone(),
        deal_sub_type: selections.deal_sub_type.clone(),
        lead_source: selections.lead_source.clone(),
        property_type: selections.property_type.clone(),
        sale_status: selections.sale_status.clone(),
        exclusive: !deal.is_listing,
        offer: deal.direction == Direction::Buying,
        team_deal: deal.is_team_deal(),
        owning_side: decide_owning_side(deal),
        primary_agent_id: agent.id.clone(),
        sell_price: present(deal, SALES_PRICE, ContextValue::as_number),
        sold_at: closed_at.clone(),
        closed_at,
        possession_at: present(deal, POSSESSION_DATE, |v| v.date.map(format_timestamp)),
        block: present(deal, BLOCK_NUMBER, ContextValue::as_text),
        lot: present(deal, LOT_NUMBER, ContextValue::as_text),
        mls_number: present(deal, MLS_NUMBER, ContextValue::as_text),
    }
}

/// Build the address attributes; every field is optional.
pub fn build_address_payload(deal: &Deal) -> AddressAttributes {
    AddressAttributes {
        address_line1: present(deal, FULL_ADDRESS, ContextValue::as_text),
        city: present(deal, CITY, ContextValue::as_text),
        province: present(deal, STATE, ContextValue::as_text),
        postal_code: present(deal, POSTAL_CODE, ContextValue::as_text),
    }
}

/// Conditional-inclusion rule shared by every optional field: the value is
/// `Some` only when the context exists and `read` extracts something from it.
fn present<T>(deal: &Deal, key: &str, read: impl FnOnce(&ContextValue) -> Option<T>) -> Option<T> {
    deal.context(key).and_then(read)
}

/// ISO-8601 timestamp with an explicit numeric offset (`+02:00`, never `Z`),
/// in the local offset at the time of formatting.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
