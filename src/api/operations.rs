//! Catalog of provider operations and how each is exposed.

use crate::error::ApiError;
use std::fmt;
use std::str::FromStr;

/// Every operation the provider has published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    BrowseNodeLookup,
    CartAdd,
    CartClear,
    CartCreate,
    CartGet,
    CartModify,
    ItemLookup,
    ItemSearch,
    SimilarityLookup,
    SellerLookup,
    SellerListingLookup,
    SellerListingSearch,
    CustomerContentLookup,
    CustomerContentSearch,
    Help,
    ListLookup,
    ListSearch,
    TagLookup,
    TransactionLookup,
    VehiclePartLookup,
    VehiclePartSearch,
    VehicleSearch,
}

/// How an operation is exposed on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    /// A dedicated method exists.
    Implemented,
    /// No dedicated method yet; reachable through `ApiClient::call`.
    NotYetImplemented,
    /// Retired by the provider on 2010-10-15; calls fail locally.
    Deprecated,
}

impl Operation {
    /// Name used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::BrowseNodeLookup => "BrowseNodeLookup",
            Operation::CartAdd => "CartAdd",
            Operation::CartClear => "CartClear",
            Operation::CartCreate => "CartCreate",
            Operation::CartGet => "CartGet",
            Operation::CartModify => "CartModify",
            Operation::ItemLookup => "ItemLookup",
            Operation::ItemSearch => "ItemSearch",
            Operation::SimilarityLookup => "SimilarityLookup",
            Operation::SellerLookup => "SellerLookup",
            Operation::SellerListingLookup => "SellerListingLookup",
            Operation::SellerListingSearch => "SellerListingSearch",
            Operation::CustomerContentLookup => "CustomerContentLookup",
            Operation::CustomerContentSearch => "CustomerContentSearch",
            Operation::Help => "Help",
            Operation::ListLookup => "ListLookup",
            Operation::ListSearch => "ListSearch",
            Operation::TagLookup => "TagLookup",
            Operation::TransactionLookup => "TransactionLookup",
            Operation::VehiclePartLookup => "VehiclePartLookup",
            Operation::VehiclePartSearch => "VehiclePartSearch",
            Operation::VehicleSearch => "VehicleSearch",
        }
    }

    /// Name of the `ApiClient` method for this operation.
    pub fn method_name(&self) -> &'static str {
        match self {
            Operation::BrowseNodeLookup => "browse_node_lookup",
            Operation::CartAdd => "cart_add",
            Operation::CartClear => "cart_clear",
            Operation::CartCreate => "cart_create",
            Operation::CartGet => "cart_get",
            Operation::CartModify => "cart_modify",
            Operation::ItemLookup => "item_lookup",
            Operation::ItemSearch => "item_search",
            Operation::SimilarityLookup => "similarity_lookup",
            Operation::SellerLookup => "seller_lookup",
            Operation::SellerListingLookup => "seller_listing_lookup",
            Operation::SellerListingSearch => "seller_listing_search",
            Operation::CustomerContentLookup => "customer_content_lookup",
            Operation::CustomerContentSearch => "customer_content_search",
            Operation::Help => "help",
            Operation::ListLookup => "list_lookup",
            Operation::ListSearch => "list_search",
            Operation::TagLookup => "tag_lookup",
            Operation::TransactionLookup => "transaction_lookup",
            Operation::VehiclePartLookup => "vehicle_part_lookup",
            Operation::VehiclePartSearch => "vehicle_part_search",
            Operation::VehicleSearch => "vehicle_search",
        }
    }

    pub fn support(&self) -> Support {
        match self {
            Operation::BrowseNodeLookup
            | Operation::CartAdd
            | Operation::CartClear
            | Operation::CartCreate
            | Operation::CartGet
            | Operation::CartModify
            | Operation::ItemLookup
            | Operation::ItemSearch
            | Operation::SimilarityLookup => Support::Implemented,
            Operation::SellerLookup
            | Operation::SellerListingLookup
            | Operation::SellerListingSearch => Support::NotYetImplemented,
            Operation::CustomerContentLookup
            | Operation::CustomerContentSearch
            | Operation::Help
            | Operation::ListLookup
            | Operation::ListSearch
            | Operation::TagLookup
            | Operation::TransactionLookup
            | Operation::VehiclePartLookup
            | Operation::VehiclePartSearch
            | Operation::VehicleSearch => Support::Deprecated,
        }
    }

    pub fn is_deprecated(&self) -> bool {
        self.support() == Support::Deprecated
    }

    /// Returns all operations.
    pub fn all() -> &'static [Operation] {
        &[
            Operation::BrowseNodeLookup,
            Operation::CartAdd,
            Operation::CartClear,
            Operation::CartCreate,
            Operation::CartGet,
            Operation::CartModify,
            Operation::ItemLookup,
            Operation::ItemSearch,
            Operation::SimilarityLookup,
            Operation::SellerLookup,
            Operation::SellerListingLookup,
            Operation::SellerListingSearch,
            Operation::CustomerContentLookup,
            Operation::CustomerContentSearch,
            Operation::Help,
            Operation::ListLookup,
            Operation::ListSearch,
            Operation::TagLookup,
            Operation::TransactionLookup,
            Operation::VehiclePartLookup,
            Operation::VehiclePartSearch,
            Operation::VehicleSearch,
        ]
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = ApiError;

    /// Accepts either the wire name or the method name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::all()
            .iter()
            .find(|op| op.name() == s || op.method_name() == s)
            .copied()
            .ok_or_else(|| ApiError::UnknownOperation(s.to_string()))
    }
}
