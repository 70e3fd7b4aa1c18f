// storefront/src/models/mod.rs

//! Records of the four storefront tables plus their value types.

pub mod cart_line;
pub mod order;
pub mod order_line;
pub mod pizza;
pub mod topping;
pub mod user;

pub use cart_line::{CartLine, CartLineKey};
pub use order::{CustomerInfo, Order, OrderStatus, OrderWithLines};
pub use order_line::OrderLine;
pub use pizza::{NewPizza, Pizza};
pub use topping::{canonicalize_toppings, TOPPING_MENU};
pub use user::UserId;
