// storefront/src/models/topping.rs

//! The topping menu and the canonical form toppings are stored and compared in.

use crate::errors::{AppError, Result};

pub const TOPPING_MENU: [&str; 10] = [
  "Extra Cheese",
  "Pepperoni",
  "Mushrooms",
  "Bell Peppers",
  "Onions",
  "Sausage",
  "Ham",
  "Bacon",
  "Olives",
  "Tomatoes",
];

/// Trims, validates against the menu, sorts and deduplicates a topping selection.
///
/// Two selections with the same toppings in a different order canonicalise to the
/// same list, which is what cart merging compares. Matching against the menu is
/// case-insensitive; the stored spelling is the menu's.
pub fn canonicalize_toppings(raw: &[String]) -> Result<Vec<String>> {
  let mut toppings = Vec::with_capacity(raw.len());
  for entry in raw {
    let wanted = entry.trim();
    if wanted.is_empty() {
      return Err(AppError::validation("Topping names must not be blank."));
    }
    let known = TOPPING_MENU
      .iter()
      .find(|menu_item| menu_item.eq_ignore_ascii_case(wanted))
      .ok_or_else(|| AppError::validation(format!("Unknown topping '{}'.", wanted)))?;
    toppings.push((*known).to_string());
  }
  toppings.sort();
  toppings.dedup();
  Ok(toppings)
}
