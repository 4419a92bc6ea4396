//! Business operations that span more than one store.

pub mod cart;
pub mod orders;

pub use cart::CartService;
pub use orders::OrderService;
