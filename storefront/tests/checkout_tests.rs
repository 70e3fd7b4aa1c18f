// storefront/tests/checkout_tests.rs
mod common;

use common::*;
use pizzeria::errors::AppError;
use pizzeria::models::{CustomerInfo, OrderStatus};
use pizzeria::pricing::{format_currency, PizzaSize};
use pizzeria::services::identity::Caller;
use pizzeria::services::storefront;
use pizzeria::state::AppState;
use pizzeria::store::MemoryStore;
use rust_decimal::Decimal;
use serial_test::serial;
use std::sync::Arc;

async fn fill_cart(state: &AppState, caller: &Caller) {
  let margherita = pizza_named(state, "Margherita").await;
  let pepperoni = pizza_named(state, "Pepperoni").await;
  storefront::add_to_cart(state, caller, selection(&margherita, PizzaSize::Medium, &[], 1))
    .await
    .unwrap();
  storefront::add_to_cart(
    state,
    caller,
    selection(&pepperoni, PizzaSize::Large, &["Extra Cheese", "Mushrooms"], 2),
  )
  .await
  .unwrap();
}

#[tokio::test]
#[serial]
async fn margherita_and_pepperoni_checkout() {
  let state = seeded_state().await;
  let ada = customer("ada");
  fill_cart(&state, &ada).await;

  let cart = storefront::get_cart(&state, &ada).await.unwrap();
  assert_eq!(cart[0].price, dec("16.887"));
  assert_eq!(cart[1].price, dec("53.968"));
  let total = storefront::cart_total(&cart).unwrap();
  assert_eq!(total, dec("70.855"));

  let order_id = storefront::create_order(&state, &ada, customer_info(), lines_from_cart(&cart), total)
    .await
    .unwrap();

  let placed = storefront::get_order(&state, &ada, order_id).await.unwrap();
  assert_eq!(placed.order.status, OrderStatus::Pending);
  assert_eq!(placed.order.total_amount, dec("70.855"));
  assert_eq!(format_currency(placed.order.total_amount), "$70.86");
  assert_eq!(placed.items.len(), 2);
  assert_eq!(placed.order.customer_name, "Ada Lovelace");
  assert!(storefront::get_cart(&state, &ada).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn order_total_equals_sum_of_line_prices() {
  let state = seeded_state().await;
  let ada = customer("ada");
  fill_cart(&state, &ada).await;
  let cart = storefront::get_cart(&state, &ada).await.unwrap();

  // A client rounding to cents is still accepted; the stored total is the exact sum.
  let order_id = storefront::create_order(&state, &ada, customer_info(), lines_from_cart(&cart), dec("70.86"))
    .await
    .unwrap();

  let placed = storefront::get_order(&state, &ada, order_id).await.unwrap();
  let line_sum: Decimal = placed.items.iter().map(|line| line.price).sum();
  assert_eq!(placed.order.total_amount, line_sum);
  assert!(placed.items.iter().all(|line| line.order_id == order_id));
}

#[tokio::test]
#[serial]
async fn empty_cart_checkout_is_rejected_and_writes_nothing() {
  let state = seeded_state().await;
  let ada = customer("ada");

  let err = storefront::create_order(&state, &ada, customer_info(), Vec::new(), Decimal::ZERO)
    .await
    .unwrap_err();
  match err {
    AppError::Validation(message) => assert_eq!(message, "Cart is empty"),
    other => panic!("expected a validation error, got {:?}", other),
  }
  assert!(storefront::get_user_orders(&state, &ada).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn mismatched_total_and_blank_customer_fields_are_rejected() {
  let state = seeded_state().await;
  let ada = customer("ada");
  fill_cart(&state, &ada).await;
  let cart = storefront::get_cart(&state, &ada).await.unwrap();

  let err = storefront::create_order(&state, &ada, customer_info(), lines_from_cart(&cart), dec("60.00"))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));

  let blank_address = CustomerInfo {
    customer_address: "   ".to_string(),
    ..customer_info()
  };
  let err = storefront::create_order(&state, &ada, blank_address, lines_from_cart(&cart), dec("70.855"))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));

  assert_eq!(storefront::get_cart(&state, &ada).await.unwrap().len(), 2);
  assert!(storefront::get_user_orders(&state, &ada).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn line_prices_summing_past_the_decimal_range_are_rejected() {
  let state = seeded_state().await;
  let ada = customer("ada");
  fill_cart(&state, &ada).await;
  let margherita = pizza_named(&state, "Margherita").await;

  let mut huge = selection(&margherita, PizzaSize::Small, &[], 1);
  huge.price = Decimal::MAX;
  let err = storefront::create_order(&state, &ada, customer_info(), vec![huge.clone(), huge], Decimal::MAX)
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));

  assert_eq!(storefront::get_cart(&state, &ada).await.unwrap().len(), 2);
  assert!(storefront::get_user_orders(&state, &ada).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn checkout_lines_need_a_pizza_name() {
  let state = seeded_state().await;
  let ada = customer("ada");
  fill_cart(&state, &ada).await;
  let cart = storefront::get_cart(&state, &ada).await.unwrap();

  let mut submitted = lines_from_cart(&cart);
  submitted[1].pizza_name = "  ".to_string();
  let err = storefront::create_order(&state, &ada, customer_info(), submitted, dec("70.855"))
    .await
    .unwrap_err();
  assert!(matches!(err, AppError::Validation(_)));

  assert_eq!(storefront::get_cart(&state, &ada).await.unwrap().len(), 2);
  assert!(storefront::get_user_orders(&state, &ada).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn checkout_clears_the_stored_cart_even_if_it_differs_from_the_submission() {
  let state = seeded_state().await;
  let ada = customer("ada");
  fill_cart(&state, &ada).await;
  let cart = storefront::get_cart(&state, &ada).await.unwrap();

  let submitted = lines_from_cart(&cart[..1]);
  let order_id = storefront::create_order(&state, &ada, customer_info(), submitted, dec("16.887"))
    .await
    .unwrap();

  let placed = storefront::get_order(&state, &ada, order_id).await.unwrap();
  assert_eq!(placed.items.len(), 1);
  assert!(storefront::get_cart(&state, &ada).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn anonymous_checkout_is_unauthenticated_and_reads_are_empty() {
  let state = seeded_state().await;
  let anonymous = Caller::anonymous();
  let margherita = pizza_named(&state, "Margherita").await;

  let err = storefront::create_order(
    &state,
    &anonymous,
    customer_info(),
    vec![selection(&margherita, PizzaSize::Small, &[], 1)],
    dec("12.99"),
  )
  .await
  .unwrap_err();
  assert!(matches!(err, AppError::Unauthenticated(_)));
  assert!(storefront::get_user_orders(&state, &anonymous).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn orders_are_listed_newest_first_and_only_for_their_owner() {
  let state = seeded_state().await;
  let ada = customer("ada");
  let margherita = pizza_named(&state, "Margherita").await;

  let mut placed = Vec::new();
  for quantity in 1..=3 {
    let line = selection(&margherita, PizzaSize::Small, &[], quantity);
    let total = line.price;
    placed.push(
      storefront::create_order(&state, &ada, customer_info(), vec![line], total)
        .await
        .unwrap(),
    );
  }

  let history = storefront::get_user_orders(&state, &ada).await.unwrap();
  let listed: Vec<_> = history.iter().map(|o| o.order.id).collect();
  placed.reverse();
  assert_eq!(listed, placed);
  assert!(history.iter().all(|o| o.items.len() == 1));

  assert!(storefront::get_user_orders(&state, &customer("grace")).await.unwrap().is_empty());
  assert!(matches!(
    storefront::get_order(&state, &customer("grace"), listed[0]).await,
    Err(AppError::NotFound(_))
  ));
}

async fn assert_fault_leaves_no_trace(fault: FaultPoint) {
  let memory = MemoryStore::new();
  let healthy = seeded_state_with(Arc::new(memory.clone()), test_config()).await;
  let ada = customer("ada");
  fill_cart(&healthy, &ada).await;
  let cart = storefront::get_cart(&healthy, &ada).await.unwrap();

  let faulty = pizzeria::state::AppState::build(Arc::new(FaultyStore::new(memory.clone(), fault)), test_config());
  let result = storefront::create_order(&faulty, &ada, customer_info(), lines_from_cart(&cart), dec("70.855")).await;

  match (fault, result) {
    (FaultPoint::Commit, Err(AppError::Transaction(_))) => {}
    (FaultPoint::Commit, other) => panic!("expected a transaction failure, got {:?}", other),
    (_, Err(_)) => {}
    (_, Ok(order_id)) => panic!("checkout unexpectedly succeeded with order {}", order_id),
  }

  assert!(storefront::get_user_orders(&healthy, &ada).await.unwrap().is_empty());
  assert_eq!(storefront::get_cart(&healthy, &ada).await.unwrap(), cart);
}

#[tokio::test]
#[serial]
async fn failure_while_writing_order_lines_leaves_cart_intact() {
  setup_tracing();
  assert_fault_leaves_no_trace(FaultPoint::InsertOrderLine).await;
}

#[tokio::test]
#[serial]
async fn failure_while_clearing_the_cart_leaves_no_order() {
  setup_tracing();
  assert_fault_leaves_no_trace(FaultPoint::DeleteCartLine).await;
}

#[tokio::test]
#[serial]
async fn commit_failure_surfaces_as_transaction_failure() {
  setup_tracing();
  assert_fault_leaves_no_trace(FaultPoint::Commit).await;
}
