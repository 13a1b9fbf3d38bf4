//! Integration tests for `SqliteStore` and the core operations running on
//! top of it, against an in-memory database.

mod complements;
mod guard;
mod settings;

use chrono::Utc;
use rust_decimal::Decimal;
use storefront_core::{
  catalog::{NewCategory, NewComplementGroup, NewProduct, OptionInput},
  order::{ComplementInput, CustomerInfo, NewOrder, NewOrderItem},
  repo::{Repository, Write},
  service,
  tenant::Store,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A store created the normal way, with its settings row.
async fn tenant(s: &SqliteStore, name: &str) -> Uuid {
  let (store, _) = service::stores::create_store(s, Uuid::new_v4(), name)
    .await
    .unwrap();
  store.id
}

/// A store row without settings, as left behind by older data.
async fn bare_tenant(s: &SqliteStore, subdomain: &str) -> Uuid {
  let store = Store {
    id:          Uuid::new_v4(),
    user_id:     Uuid::new_v4(),
    name:        subdomain.to_owned(),
    subdomain:   subdomain.to_owned(),
    description: None,
    logo_url:    None,
    cover_image: None,
    address:     None,
    created_at:  Utc::now(),
  };
  s.apply(Write::InsertStore(store.clone())).await.unwrap();
  store.id
}

async fn category(s: &SqliteStore, store_id: Uuid, name: &str) -> Uuid {
  let input = NewCategory { name: name.to_owned(), products: vec![] };
  service::catalog::create_category(s, store_id, input)
    .await
    .unwrap()
    .category
    .id
}

fn new_product(category_id: Uuid, name: &str, cents: i64) -> NewProduct {
  NewProduct {
    name: name.to_owned(),
    description: None,
    price_in_cents: cents,
    category_id,
    image_url: None,
    active: None,
    complements: vec![],
  }
}

async fn product(s: &SqliteStore, store_id: Uuid, category_id: Uuid, name: &str) -> Uuid {
  service::catalog::create_product(s, store_id, new_product(category_id, name, 1000))
    .await
    .unwrap()
    .product
    .id
}

fn option(name: &str, cents: i64) -> OptionInput {
  OptionInput {
    name: name.to_owned(),
    price: Some(Decimal::new(cents, 2)),
    ..Default::default()
  }
}

async fn group(s: &SqliteStore, store_id: Uuid, name: &str) -> Uuid {
  let input = NewComplementGroup {
    name:        name.to_owned(),
    description: None,
    required:    None,
    min:         None,
    max:         Some(3),
    kind:        None,
    options:     vec![option("Cheese", 200), option("Bacon", 350)],
  };
  service::complements::create_complement_group(s, store_id, input)
    .await
    .unwrap()
    .group
    .id
}

fn line(product_id: Uuid, quantity: u32, unit_cents: i64) -> NewOrderItem {
  NewOrderItem {
    product_id,
    quantity: Some(quantity),
    unit_price: Decimal::new(unit_cents, 2),
    complements: vec![],
  }
}

fn extra(name: &str, quantity: u32, cents: i64) -> ComplementInput {
  ComplementInput {
    option_name: Some(name.to_owned()),
    group_title: Some("Extras".to_owned()),
    quantity:    Some(quantity),
    price_delta: Some(Decimal::new(cents, 2)),
  }
}

fn order_of(items: Vec<NewOrderItem>, phone: Option<&str>) -> NewOrder {
  NewOrder {
    customer: phone.map(|p| CustomerInfo {
      name:    Some("Ana".to_owned()),
      phone:   Some(p.to_owned()),
      address: Some("Rua A, 10, Centro".to_owned()),
    }),
    items,
    payment_method: Some("pix".to_owned()),
    delivery_fee: Some(Decimal::new(500, 2)),
    total: Decimal::new(2900, 2),
  }
}
