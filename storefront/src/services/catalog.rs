// storefront/src/services/catalog.rs

//! Menu catalog: the seeded pizza list and the option tables a client prices with.

use crate::errors::Result;
use crate::models::{NewPizza, Pizza, TOPPING_MENU};
use crate::pricing::{format_currency, topping_price, PizzaSize};
use crate::store::Store;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

/// `(name, description, base price in cents, category)`
const SEED_PIZZAS: [(&str, &str, i64, &str); 6] = [
  ("Margherita", "Fresh mozzarella, tomato sauce, and basil", 1299, "Classic"),
  ("Pepperoni", "Pepperoni, mozzarella cheese, and tomato sauce", 1499, "Classic"),
  (
    "Supreme",
    "Pepperoni, sausage, bell peppers, onions, and mushrooms",
    1899,
    "Specialty",
  ),
  ("Hawaiian", "Ham, pineapple, and mozzarella cheese", 1699, "Specialty"),
  ("Meat Lovers", "Pepperoni, sausage, ham, and bacon", 1999, "Specialty"),
  (
    "Veggie Deluxe",
    "Bell peppers, onions, mushrooms, olives, and tomatoes",
    1799,
    "Vegetarian",
  ),
];

const SEED_IMAGE: &str = "🍕";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
  Seeded(usize),
  AlreadySeeded,
}

pub fn seed_pizzas() -> Vec<NewPizza> {
  SEED_PIZZAS
    .iter()
    .map(|(name, description, cents, category)| NewPizza {
      name: (*name).to_string(),
      description: (*description).to_string(),
      base_price: Decimal::new(*cents, 2),
      image: SEED_IMAGE.to_string(),
      category: (*category).to_string(),
    })
    .collect()
}

/// Inserts the fixed menu unless the catalog already holds any pizza.
#[instrument(name = "catalog::seed_catalog", skip_all, err(Display))]
pub async fn seed_catalog(store: &dyn Store) -> Result<SeedOutcome> {
  let mut tx = store.begin().await?;
  tx.lock_catalog().await?;
  if tx.count_pizzas().await? > 0 {
    info!("Catalog already seeded; nothing to do.");
    return Ok(SeedOutcome::AlreadySeeded);
  }

  let mut inserted = 0;
  for pizza in seed_pizzas() {
    tx.insert_pizza(pizza).await?;
    inserted += 1;
  }
  tx.commit().await?;

  info!(inserted, "Catalog seeded.");
  Ok(SeedOutcome::Seeded(inserted))
}

#[instrument(name = "catalog::list_pizzas", skip_all, err(Display))]
pub async fn list_pizzas(store: &dyn Store) -> Result<Vec<Pizza>> {
  store.available_pizzas().await
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeOption {
  pub key: PizzaSize,
  pub label: &'static str,
  pub multiplier: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuOptions {
  pub sizes: Vec<SizeOption>,
  pub toppings: Vec<&'static str>,
  pub topping_price: Decimal,
  pub topping_price_display: String,
}

pub fn menu_options() -> MenuOptions {
  MenuOptions {
    sizes: PizzaSize::ALL
      .iter()
      .map(|size| SizeOption {
        key: *size,
        label: size.label(),
        multiplier: size.multiplier(),
      })
      .collect(),
    toppings: TOPPING_MENU.to_vec(),
    topping_price: topping_price(),
    topping_price_display: format_currency(topping_price()),
  }
}
