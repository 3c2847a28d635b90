//! Domain types shared across redcart components.

mod id;
mod product;
mod profile;
mod proxy;

pub use product::{StockEvent, TargetProduct};
pub use profile::{Address, Payment, Profile};
pub use proxy::Proxy;

// IDs are defined via the `define_id!` macro in `id.rs` and exported from
// the crate root by `#[macro_export]`.
pub use id::{CartId, OrderId};
