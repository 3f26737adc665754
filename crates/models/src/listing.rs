use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::id::opaque_id;
use crate::nullable::null_as_default;

pub const TABLE: &str = "listings";

/// Inbound create-listing body.
///
/// Missing and `null` fields default to empty so validation, not
/// deserialization, reports them. There is no seller field: ownership comes
/// from the resolved identity, and any `seller_id` the client sends is dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateListingInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub starting_bid: Decimal,
    #[serde(default)]
    pub buy_now_price: Option<Decimal>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub auction_end_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
}

/// A create-listing payload that passed validation, not yet owned by anyone.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub starting_bid: Decimal,
    pub buy_now_price: Option<Decimal>,
    pub auction_end_time: DateTime<FixedOffset>,
    pub location: String,
}

impl CreateListingInput {
    pub fn validate(self) -> Result<ListingDraft, ModelError> {
        if self.title.is_empty()
            || self.description.is_empty()
            || self.category.is_empty()
            || self.images.is_empty()
            || self.starting_bid.is_zero()
            || self.auction_end_time.is_empty()
            || self.location.is_empty()
        {
            return Err(ModelError::MissingFields);
        }

        let auction_end_time = DateTime::parse_from_rfc3339(&self.auction_end_time)
            .map_err(|_| ModelError::InvalidAuctionEndTime)?;

        Ok(ListingDraft {
            title: self.title,
            description: self.description,
            category: self.category,
            images: self.images,
            starting_bid: self.starting_bid,
            buy_now_price: self.buy_now_price,
            auction_end_time,
            location: self.location,
        })
    }
}

/// A `listings` row as written to the store.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Listing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub starting_bid: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_now_price: Option<Decimal>,
    pub auction_end_time: DateTime<FixedOffset>,
    pub location: String,
    pub seller_id: String,
}

impl Listing {
    pub fn owned_by(draft: ListingDraft, seller_id: impl Into<String>) -> Self {
        Self {
            id: None,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            images: draft.images,
            starting_bid: draft.starting_bid,
            buy_now_price: draft.buy_now_price,
            auction_end_time: draft.auction_end_time,
            location: draft.location,
            seller_id: seller_id.into(),
        }
    }
}

/// The part of an echoed insert this service reads back.
#[derive(Debug, Clone, Deserialize)]
pub struct InsertedRow {
    #[serde(default, deserialize_with = "opaque_id")]
    pub id: Option<String>,
}
