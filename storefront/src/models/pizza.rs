// storefront/src/models/pizza.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Pizza {
  pub id: Uuid,
  pub name: String,
  pub description: String,
  pub base_price: Decimal,
  /// Short image tag rendered by the menu (an emoji in the seeded catalog).
  pub image: String,
  pub category: String,
  /// The only field that may change after seeding.
  pub available: bool,
}

/// A catalog entry before it has been given an id.
#[derive(Debug, Clone)]
pub struct NewPizza {
  pub name: String,
  pub description: String,
  pub base_price: Decimal,
  pub image: String,
  pub category: String,
}

impl NewPizza {
  pub fn into_pizza(self, id: Uuid) -> Pizza {
    Pizza {
      id,
      name: self.name,
      description: self.description,
      base_price: self.base_price,
      image: self.image,
      category: self.category,
      available: true,
    }
  }
}
