//! Domain data types.

pub mod marketplace;
pub mod product;
pub mod sync;
pub mod token;

pub use marketplace::{
    ItemAttribute, ItemDescription, ItemPicture, ItemUpdate, NewItemPayload, RemoteAuthTokens,
    RemoteItem, RemoteUserInfo,
};
pub use product::Product;
pub use sync::{SyncAction, SyncResult};
pub use token::MarketplaceToken;
