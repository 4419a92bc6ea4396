//! Storefront domain: aggregates, value objects, events and catalog search.
pub mod aggregates;
pub mod events;
pub mod search;
pub mod value_objects;
