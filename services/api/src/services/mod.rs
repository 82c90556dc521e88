pub mod creators;
pub mod payments;

pub use creators::CreatorService;
pub use payments::PaymentService;
