// storefront/tests/cart_tests.rs
mod common;

use common::*;
use futures_util::future::join_all;
use pizzeria::config::AppConfig;
use pizzeria::errors::AppError;
use pizzeria::pricing::{line_price, PizzaSize};
use pizzeria::services::identity::Caller;
use pizzeria::services::storefront;
use pizzeria::store::MemoryStore;
use rust_decimal::Decimal;
use serial_test::serial;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn adding_the_same_selection_twice_merges_into_one_line() {
  let state = seeded_state().await;
  let ada = customer("ada");
  let margherita = pizza_named(&state, "Margherita").await;

  let first = storefront::add_to_cart(&state, &ada, selection(&margherita, PizzaSize::Medium, &["Olives"], 1))
    .await
    .unwrap();
  assert!(!first.merged);
  let second = storefront::add_to_cart(&state, &ada, selection(&margherita, PizzaSize::Medium, &["Olives"], 2))
    .await
    .unwrap();
  assert!(second.merged);
  assert_eq!(second.line.id, first.line.id);

  let cart = storefront::get_cart(&state, &ada).await.unwrap();
  assert_eq!(cart.len(), 1);
  assert_eq!(cart[0].quantity, 3);
  let expected = line_price(margherita.base_price, PizzaSize::Medium, 1, 1).unwrap()
    + line_price(margherita.base_price, PizzaSize::Medium, 1, 2).unwrap();
  assert_eq!(cart[0].price, expected);
}

#[tokio::test]
#[serial]
async fn topping_order_does_not_prevent_merging() {
  let state = seeded_state().await;
  let ada = customer("ada");
  let supreme = pizza_named(&state, "Supreme").await;

  storefront::add_to_cart(&state, &ada, selection(&supreme, PizzaSize::Large, &["Onions", "Bacon"], 1))
    .await
    .unwrap();
  let again = storefront::add_to_cart(&state, &ada, selection(&supreme, PizzaSize::Large, &["Bacon", "Onions"], 1))
    .await
    .unwrap();

  assert!(again.merged);
  let cart = storefront::get_cart(&state, &ada).await.unwrap();
  assert_eq!(cart.len(), 1);
  assert_eq!(cart[0].toppings, vec!["Bacon", "Onions"]);
  assert_eq!(cart[0].quantity, 2);
}

#[tokio::test]
#[serial]
async fn different_sizes_or_toppings_stay_separate_lines() {
  let state = seeded_state().await;
  let ada = customer("ada");
  let pepperoni = pizza_named(&state, "Pepperoni").await;

  for input in [
    selection(&pepperoni, PizzaSize::Small, &[], 1),
    selection(&pepperoni, PizzaSize::Large, &[], 1),
    selection(&pepperoni, PizzaSize::Large, &["Ham"], 1),
  ] {
    storefront::add_to_cart(&state, &ada, input).await.unwrap();
  }

  let cart = storefront::get_cart(&state, &ada).await.unwrap();
  assert_eq!(cart.len(), 3);
  assert_eq!(cart[0].size, PizzaSize::Small);
  assert!(cart.iter().all(|line| line.pizza_name == "Pepperoni"));
}

#[tokio::test]
#[serial]
async fn carts_are_isolated_per_user() {
  let state = seeded_state().await;
  let hawaiian = pizza_named(&state, "Hawaiian").await;

  storefront::add_to_cart(&state, &customer("ada"), selection(&hawaiian, PizzaSize::Small, &[], 1))
    .await
    .unwrap();

  assert!(storefront::get_cart(&state, &customer("grace")).await.unwrap().is_empty());
  assert_eq!(storefront::get_cart(&state, &customer("ada")).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn anonymous_callers_cannot_mutate_and_read_an_empty_cart() {
  let state = seeded_state().await;
  let anonymous = Caller::anonymous();
  let margherita = pizza_named(&state, "Margherita").await;

  let err = storefront::add_to_cart(&state, &anonymous, selection(&margherita, PizzaSize::Small, &[], 1))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Unauthenticated(_)));

  let err = storefront::update_cart_item(&state, &anonymous, Uuid::new_v4(), 1, dec("12.99"))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Unauthenticated(_)));

  assert!(matches!(
    storefront::clear_cart(&state, &anonymous).await,
    Err(AppError::Unauthenticated(_))
  ));
  assert!(storefront::get_cart(&state, &anonymous).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn invalid_selections_are_rejected_before_any_write() {
  let state = seeded_state().await;
  let ada = customer("ada");
  let margherita = pizza_named(&state, "Margherita").await;

  let mut zero_quantity = selection(&margherita, PizzaSize::Small, &[], 1);
  zero_quantity.quantity = 0;
  let mut negative_price = selection(&margherita, PizzaSize::Small, &[], 1);
  negative_price.price = dec("-1");
  let mut unknown_size = selection(&margherita, PizzaSize::Small, &[], 1);
  unknown_size.size = "family".to_string();
  let mut unknown_topping = selection(&margherita, PizzaSize::Small, &[], 1);
  unknown_topping.toppings = vec!["Anchovies".to_string()];
  let mut wrong_price = selection(&margherita, PizzaSize::Small, &[], 1);
  wrong_price.price = dec("1.00");

  for input in [zero_quantity, negative_price, unknown_size, unknown_topping, wrong_price] {
    let err = storefront::add_to_cart(&state, &ada, input).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "unexpected error: {:?}", err);
  }
  assert!(storefront::get_cart(&state, &ada).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn unknown_pizza_is_not_found() {
  let state = seeded_state().await;
  let margherita = pizza_named(&state, "Margherita").await;
  let mut input = selection(&margherita, PizzaSize::Small, &[], 1);
  input.pizza_id = Uuid::new_v4();

  let err = storefront::add_to_cart(&state, &customer("ada"), input).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[serial]
async fn stored_name_comes_from_the_catalog() {
  let state = seeded_state().await;
  let veggie = pizza_named(&state, "Veggie Deluxe").await;
  let mut input = selection(&veggie, PizzaSize::Small, &[], 1);
  input.pizza_name = "Free Pizza".to_string();

  let added = storefront::add_to_cart(&state, &customer("ada"), input).await.unwrap();
  assert_eq!(added.line.pizza_name, "Veggie Deluxe");
}

#[tokio::test]
#[serial]
async fn unverified_prices_are_stored_verbatim_when_verification_is_off() {
  let config = AppConfig {
    verify_prices: false,
    ..test_config()
  };
  let state = seeded_state_with(Arc::new(MemoryStore::new()), config).await;
  let margherita = pizza_named(&state, "Margherita").await;
  let mut input = selection(&margherita, PizzaSize::Small, &[], 1);
  input.price = dec("1.00");

  let added = storefront::add_to_cart(&state, &customer("ada"), input).await.unwrap();
  assert_eq!(added.line.price, dec("1.00"));
}

#[tokio::test]
#[serial]
async fn merging_a_price_past_the_decimal_range_is_rejected() {
  let config = AppConfig {
    verify_prices: false,
    ..test_config()
  };
  let state = seeded_state_with(Arc::new(MemoryStore::new()), config).await;
  let ada = customer("ada");
  let margherita = pizza_named(&state, "Margherita").await;
  let mut input = selection(&margherita, PizzaSize::Small, &[], 1);
  input.price = Decimal::MAX;

  storefront::add_to_cart(&state, &ada, input.clone()).await.unwrap();
  let err = storefront::add_to_cart(&state, &ada, input).await.unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));

  let cart = storefront::get_cart(&state, &ada).await.unwrap();
  assert_eq!(cart.len(), 1);
  assert_eq!(cart[0].quantity, 1);
  assert_eq!(cart[0].price, Decimal::MAX);
}

#[tokio::test]
#[serial]
async fn update_with_zero_or_negative_quantity_deletes_the_line() {
  let state = seeded_state().await;
  let ada = customer("ada");
  let margherita = pizza_named(&state, "Margherita").await;
  let pepperoni = pizza_named(&state, "Pepperoni").await;

  let first = storefront::add_to_cart(&state, &ada, selection(&margherita, PizzaSize::Small, &[], 1))
    .await
    .unwrap();
  let second = storefront::add_to_cart(&state, &ada, selection(&pepperoni, PizzaSize::Small, &[], 1))
    .await
    .unwrap();

  let removed = storefront::update_cart_item(&state, &ada, first.line.id, 0, dec("-5"))
    .await
    .unwrap();
  assert!(removed.is_none());
  let removed = storefront::update_cart_item(&state, &ada, second.line.id, -3, dec("0"))
    .await
    .unwrap();
  assert!(removed.is_none());

  assert!(storefront::get_cart(&state, &ada).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn update_with_positive_quantity_overwrites_quantity_and_price() {
  let state = seeded_state().await;
  let ada = customer("ada");
  let meat = pizza_named(&state, "Meat Lovers").await;

  let added = storefront::add_to_cart(&state, &ada, selection(&meat, PizzaSize::Medium, &["Bacon"], 1))
    .await
    .unwrap();
  let new_price = line_price(meat.base_price, PizzaSize::Medium, 1, 4).unwrap();

  let updated = storefront::update_cart_item(&state, &ada, added.line.id, 4, new_price)
    .await
    .unwrap()
    .expect("line kept");
  assert_eq!(updated.quantity, 4);
  assert_eq!(updated.price, new_price);

  let cart = storefront::get_cart(&state, &ada).await.unwrap();
  assert_eq!(cart[0].quantity, 4);
  assert_eq!(cart[0].price, new_price);

  let err = storefront::update_cart_item(&state, &ada, added.line.id, 2, dec("0.01"))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
#[serial]
async fn updating_someone_elses_line_is_forbidden() {
  let state = seeded_state().await;
  let margherita = pizza_named(&state, "Margherita").await;
  let added = storefront::add_to_cart(&state, &customer("ada"), selection(&margherita, PizzaSize::Small, &[], 1))
    .await
    .unwrap();

  let err = storefront::update_cart_item(&state, &customer("mallory"), added.line.id, 0, dec("0"))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Forbidden(_)));
  assert_eq!(storefront::get_cart(&state, &customer("ada")).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn updating_a_missing_line_is_not_found() {
  let state = seeded_state().await;
  let err = storefront::update_cart_item(&state, &customer("ada"), Uuid::new_v4(), 2, dec("10"))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[serial]
async fn clearing_is_idempotent_and_scoped_to_the_caller() {
  let state = seeded_state().await;
  let margherita = pizza_named(&state, "Margherita").await;
  for key in ["ada", "grace"] {
    storefront::add_to_cart(&state, &customer(key), selection(&margherita, PizzaSize::Small, &[], 1))
      .await
      .unwrap();
  }

  assert_eq!(storefront::clear_cart(&state, &customer("ada")).await.unwrap(), 1);
  assert_eq!(storefront::clear_cart(&state, &customer("ada")).await.unwrap(), 0);
  assert_eq!(storefront::get_cart(&state, &customer("grace")).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn concurrent_identical_additions_end_up_in_one_line() {
  let state = seeded_state().await;
  let ada = customer("ada");
  let margherita = pizza_named(&state, "Margherita").await;

  let additions = (0..10).map(|_| {
    let state = state.clone();
    let ada = ada.clone();
    let input = selection(&margherita, PizzaSize::Large, &["Mushrooms"], 1);
    async move { storefront::add_to_cart(&state, &ada, input).await }
  });
  let results = join_all(additions).await;
  assert!(results.iter().all(|r| r.is_ok()));
  assert_eq!(results.iter().filter(|r| matches!(r, Ok(a) if !a.merged)).count(), 1);

  let cart = storefront::get_cart(&state, &ada).await.unwrap();
  assert_eq!(cart.len(), 1);
  assert_eq!(cart[0].quantity, 10);
  assert_eq!(
    cart[0].price,
    line_price(margherita.base_price, PizzaSize::Large, 1, 1).unwrap() * rust_decimal::Decimal::from(10)
  );
}
