use storefront_core::{
  ErrorKind,
  repo::ProductFilter,
  service::{
    guard::{delete_category, delete_product, replace_complement_links},
    orders::{create_order, get_order},
  },
};

use super::*;

#[tokio::test]
async fn referenced_product_cannot_be_deleted() {
  let s = store().await;
  let id = tenant(&s, "Guard Shop").await;
  let c = category(&s, id, "Mains").await;
  let g = group(&s, id, "Sides").await;
  let p = product(&s, id, c, "Lasagna").await;
  replace_complement_links(&s, id, p, &[g]).await.unwrap();

  let order = create_order(&s, id, order_of(vec![line(p, 1, 2400)], None))
    .await
    .unwrap();

  let err = delete_product(&s, id, p).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  assert!(s.get_product(id, p).await.unwrap().is_some());
  assert_eq!(s.list_product_complements(vec![p]).await.unwrap().len(), 1);
  let still = get_order(&s, id, order.id).await.unwrap();
  assert_eq!(still.items.len(), 1);
  assert_eq!(still.items[0].product_id, p);
}

#[tokio::test]
async fn unreferenced_product_is_deleted_with_links() {
  let s = store().await;
  let id = tenant(&s, "Clean Shop").await;
  let c = category(&s, id, "Mains").await;
  let g = group(&s, id, "Sides").await;
  let p = product(&s, id, c, "Risotto").await;
  replace_complement_links(&s, id, p, &[g]).await.unwrap();

  delete_product(&s, id, p).await.unwrap();

  assert!(s.get_product(id, p).await.unwrap().is_none());
  assert!(s.list_product_complements(vec![p]).await.unwrap().is_empty());
  assert!(s.get_complement_group(id, g).await.unwrap().is_some());

  let err = delete_product(&s, id, p).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn other_stores_cannot_delete() {
  let s = store().await;
  let id = tenant(&s, "Owner Shop").await;
  let intruder = tenant(&s, "Intruder Shop").await;
  let c = category(&s, id, "Mains").await;
  let p = product(&s, id, c, "Soup").await;

  let err = delete_product(&s, intruder, p).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  let err = delete_category(&s, intruder, c).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert!(s.get_product(id, p).await.unwrap().is_some());
}

#[tokio::test]
async fn empty_category_is_deleted() {
  let s = store().await;
  let id = tenant(&s, "Tidy Shop").await;
  let c = category(&s, id, "Nothing Here").await;

  delete_category(&s, id, c).await.unwrap();
  assert!(s.get_category(id, c).await.unwrap().is_none());
}

#[tokio::test]
async fn category_delete_cascades_to_products_and_links() {
  let s = store().await;
  let id = tenant(&s, "Cascade Shop").await;
  let c = category(&s, id, "Drinks").await;
  let neighbour = category(&s, id, "Food").await;
  let g = group(&s, id, "Ice").await;
  let a = product(&s, id, c, "Cola").await;
  let b = product(&s, id, c, "Tea").await;
  let kept = product(&s, id, neighbour, "Toast").await;
  replace_complement_links(&s, id, a, &[g]).await.unwrap();

  delete_category(&s, id, c).await.unwrap();

  assert!(s.get_category(id, c).await.unwrap().is_none());
  let left: Vec<_> = s
    .list_products(ProductFilter::store(id))
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.id)
    .collect();
  assert_eq!(left, vec![kept]);
  assert!(s.list_product_complements(vec![a, b]).await.unwrap().is_empty());
  assert!(s.get_complement_group(id, g).await.unwrap().is_some());
}

#[tokio::test]
async fn category_with_referenced_product_is_kept_whole() {
  let s = store().await;
  let id = tenant(&s, "Whole Shop").await;
  let c = category(&s, id, "Combos").await;
  let g = group(&s, id, "Drinks").await;
  let sold = product(&s, id, c, "Combo 1").await;
  let unsold = product(&s, id, c, "Combo 2").await;
  replace_complement_links(&s, id, unsold, &[g]).await.unwrap();

  create_order(&s, id, order_of(vec![line(sold, 2, 1500)], Some("555-0101")))
    .await
    .unwrap();

  let err = delete_category(&s, id, c).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  assert!(s.get_category(id, c).await.unwrap().is_some());
  assert!(s.get_product(id, sold).await.unwrap().is_some());
  assert!(s.get_product(id, unsold).await.unwrap().is_some());
  assert_eq!(s.list_product_complements(vec![unsold]).await.unwrap().len(), 1);
}

#[tokio::test]
async fn link_replacement_rejects_unknown_groups() {
  let s = store().await;
  let id = tenant(&s, "Strict Links Shop").await;
  let c = category(&s, id, "Mains").await;
  let g = group(&s, id, "Sides").await;
  let p = product(&s, id, c, "Fish").await;
  replace_complement_links(&s, id, p, &[g]).await.unwrap();

  let err = replace_complement_links(&s, id, p, &[g, Uuid::new_v4()])
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
  assert_eq!(s.list_product_complements(vec![p]).await.unwrap().len(), 1);

  let linked = replace_complement_links(&s, id, p, &[g, g]).await.unwrap();
  assert_eq!(linked, vec![g]);
}
