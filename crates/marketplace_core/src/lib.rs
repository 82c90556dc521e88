pub mod domain;
pub mod impact;
pub mod payouts;
pub mod ports;

pub use domain::{
    Creator, CreatorUpdate, NewCreator, NewProduct, NewReview, NewTransaction, Product,
    ProductUpdate, Review, Transaction, TransactionStatus,
};
pub use impact::{calculate_impact, ImpactBreakdown};
pub use payouts::{CreatorPaymentSummary, Distribution, ImpactBonus, MarketplaceStats};
pub use ports::{MarketplaceStore, PortError, PortResult};
