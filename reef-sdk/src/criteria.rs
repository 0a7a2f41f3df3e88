//! Search criteria: the filter/ordering/pagination value objects that drive
//! every paged query.
//!
//! All criteria share the same [`Paging`] block and differ only in their
//! filter fields; pagination semantics never change per entity kind. They
//! are plain values with structural equality and hashing, so a criteria can
//! be used as a cache key or compared against a recorded request.

use std::fmt;

use crate::ids::{MosaicId, NamespaceId, UnresolvedId};
use crate::model::{Address, PublicKey, TransactionGroup, TransactionType};

/// Sort direction requested from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    /// The wire value of the `order` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// The pagination block every criteria carries.
///
/// A default-constructed value has every field absent; absent fields are not
/// sent to the server, which then applies its own defaults. `offset` is an
/// opaque resume cursor and can be used instead of `page_number`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Paging {
    pub order: Option<Order>,
    pub page_size: Option<u32>,
    pub page_number: Option<u32>,
    pub offset: Option<String>,
}

impl Paging {
    /// The pagination query pairs for a REST page fetch; absent fields are
    /// skipped entirely.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page_size) = self.page_size {
            pairs.push(("pageSize", page_size.to_string()));
        }
        if let Some(page_number) = self.page_number {
            pairs.push(("pageNumber", page_number.to_string()));
        }
        if let Some(offset) = &self.offset {
            pairs.push(("offset", offset.clone()));
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.as_str().to_owned()));
        }
        pairs
    }
}

/// Common behavior of all search criteria.
///
/// The streamer only ever touches the paging block: it clones the criteria
/// and bumps `page_number`, leaving every filter untouched, which is what
/// makes a [`Searcher`](crate::streamer::Searcher) idempotent per value.
pub trait SearchCriteria: Clone + fmt::Debug + Send + Sync {
    fn paging(&self) -> &Paging;

    fn paging_mut(&mut self) -> &mut Paging;

    fn page_number(&self) -> Option<u32> {
        self.paging().page_number
    }

    fn with_order(mut self, order: Order) -> Self
    where
        Self: Sized,
    {
        self.paging_mut().order = Some(order);
        self
    }

    fn with_page_size(mut self, page_size: u32) -> Self
    where
        Self: Sized,
    {
        self.paging_mut().page_size = Some(page_size);
        self
    }

    fn with_page_number(mut self, page_number: u32) -> Self
    where
        Self: Sized,
    {
        self.paging_mut().page_number = Some(page_number);
        self
    }

    fn with_offset(mut self, offset: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.paging_mut().offset = Some(offset.into());
        self
    }
}

/// Filters for account searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AccountSearchCriteria {
    pub paging: Paging,
    /// Only accounts holding this mosaic.
    pub mosaic_id: Option<MosaicId>,
}

impl AccountSearchCriteria {
    pub fn mosaic_id(mut self, mosaic_id: MosaicId) -> Self {
        self.mosaic_id = Some(mosaic_id);
        self
    }
}

impl SearchCriteria for AccountSearchCriteria {
    fn paging(&self) -> &Paging {
        &self.paging
    }

    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}

/// Filters for block searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BlockSearchCriteria {
    pub paging: Paging,
    pub signer_public_key: Option<PublicKey>,
    pub beneficiary_address: Option<Address>,
}

impl BlockSearchCriteria {
    pub fn signer_public_key(mut self, key: PublicKey) -> Self {
        self.signer_public_key = Some(key);
        self
    }

    pub fn beneficiary_address(mut self, address: Address) -> Self {
        self.beneficiary_address = Some(address);
        self
    }
}

impl SearchCriteria for BlockSearchCriteria {
    fn paging(&self) -> &Paging {
        &self.paging
    }

    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}

/// Filters for mosaic searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MosaicSearchCriteria {
    pub paging: Paging,
    pub owner_address: Option<Address>,
}

impl MosaicSearchCriteria {
    pub fn owner_address(mut self, address: Address) -> Self {
        self.owner_address = Some(address);
        self
    }
}

impl SearchCriteria for MosaicSearchCriteria {
    fn paging(&self) -> &Paging {
        &self.paging
    }

    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}

/// Filters for namespace searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NamespaceSearchCriteria {
    pub paging: Paging,
    pub owner_address: Option<Address>,
    /// Restrict to subtrees of this root namespace.
    pub level0: Option<NamespaceId>,
}

impl NamespaceSearchCriteria {
    pub fn owner_address(mut self, address: Address) -> Self {
        self.owner_address = Some(address);
        self
    }

    pub fn level0(mut self, level0: NamespaceId) -> Self {
        self.level0 = Some(level0);
        self
    }
}

impl SearchCriteria for NamespaceSearchCriteria {
    fn paging(&self) -> &Paging {
        &self.paging
    }

    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}

/// Filters for transaction searches.
///
/// `address` cannot be combined with `recipient_address` or
/// `signer_public_key`; the server rejects such queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TransactionSearchCriteria {
    pub paging: Paging,
    pub group: Option<TransactionGroup>,
    /// Any account involved in the transaction (sender, recipient, cosigner).
    pub address: Option<Address>,
    pub recipient_address: Option<Address>,
    pub signer_public_key: Option<PublicKey>,
    pub height: Option<u64>,
    pub transaction_types: Vec<TransactionType>,
    /// Also return transactions embedded inside aggregates.
    pub embedded: Option<bool>,
}

impl TransactionSearchCriteria {
    pub fn group(mut self, group: TransactionGroup) -> Self {
        self.group = Some(group);
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn recipient_address(mut self, address: Address) -> Self {
        self.recipient_address = Some(address);
        self
    }

    pub fn signer_public_key(mut self, key: PublicKey) -> Self {
        self.signer_public_key = Some(key);
        self
    }

    pub fn height(mut self, height: u64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn transaction_types(mut self, types: Vec<TransactionType>) -> Self {
        self.transaction_types = types;
        self
    }

    pub fn embedded(mut self, embedded: bool) -> Self {
        self.embedded = Some(embedded);
        self
    }
}

impl SearchCriteria for TransactionSearchCriteria {
    fn paging(&self) -> &Paging {
        &self.paging
    }

    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}

/// Filters for metadata searches. The target id spans both identifier
/// spaces, see [`UnresolvedId`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MetadataSearchCriteria {
    pub paging: Paging,
    pub source_address: Option<Address>,
    pub target_address: Option<Address>,
    pub scoped_metadata_key: Option<u64>,
    pub target_id: Option<UnresolvedId>,
}

impl MetadataSearchCriteria {
    pub fn source_address(mut self, address: Address) -> Self {
        self.source_address = Some(address);
        self
    }

    pub fn target_address(mut self, address: Address) -> Self {
        self.target_address = Some(address);
        self
    }

    pub fn scoped_metadata_key(mut self, key: u64) -> Self {
        self.scoped_metadata_key = Some(key);
        self
    }

    pub fn target_id(mut self, target_id: UnresolvedId) -> Self {
        self.target_id = Some(target_id);
        self
    }
}

impl SearchCriteria for MetadataSearchCriteria {
    fn paging(&self) -> &Paging {
        &self.paging
    }

    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}

/// Filters for mosaic restriction searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MosaicRestrictionSearchCriteria {
    pub paging: Paging,
    pub mosaic_id: Option<MosaicId>,
    pub target_address: Option<Address>,
}

impl MosaicRestrictionSearchCriteria {
    pub fn mosaic_id(mut self, mosaic_id: MosaicId) -> Self {
        self.mosaic_id = Some(mosaic_id);
        self
    }

    pub fn target_address(mut self, address: Address) -> Self {
        self.target_address = Some(address);
        self
    }
}

impl SearchCriteria for MosaicRestrictionSearchCriteria {
    fn paging(&self) -> &Paging {
        &self.paging
    }

    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}

/// Filters for resolution-statement searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResolutionStatementSearchCriteria {
    pub paging: Paging,
    pub height: Option<u64>,
}

impl ResolutionStatementSearchCriteria {
    pub fn height(mut self, height: u64) -> Self {
        self.height = Some(height);
        self
    }
}

impl SearchCriteria for ResolutionStatementSearchCriteria {
    fn paging(&self) -> &Paging {
        &self.paging
    }

    fn paging_mut(&mut self) -> &mut Paging {
        &mut self.paging
    }
}
