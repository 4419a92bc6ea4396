//! Aggregates module
pub mod address_book;
pub mod cart;
pub mod order;
pub mod product;
pub mod support_query;
pub mod user;

pub use address_book::{flexible_bool, AddressBook, SavedAddress, ShippingAddress};
pub use cart::{Cart, CartError, CartView, LineItem, ResolvedLineItem};
pub use order::{NewOrder, Order, OrderAction, OrderError, OrderStatus, OrderView, PaymentConfirmation, PaymentMethod, ProductSummary, TransitionRejected};
pub use product::{Gender, NewProduct, Product, ProductError};
pub use support_query::{SupportQuery, SupportQueryError};
pub use user::{ProfileUpdate, User};
