use storefront_core::{
  ErrorKind,
  catalog::{ComplementGroupPatch, SelectionKind},
  service::{
    catalog::get_product,
    complements::{create_complement_group, list_complement_groups, update_complement_group},
    guard::{delete_complement_group, delete_complement_item, replace_complement_links},
  },
};

use super::*;

#[tokio::test]
async fn create_group_applies_defaults() {
  let s = store().await;
  let id = tenant(&s, "Group Shop").await;

  let created = create_complement_group(&s, id, NewComplementGroup {
    name:        "Sides".into(),
    description: None,
    required:    None,
    min:         None,
    max:         None,
    kind:        None,
    options:     vec![option("Fries", 900)],
  })
  .await
  .unwrap();

  assert_eq!(created.group.min, 0);
  assert_eq!(created.group.max, 1);
  assert!(!created.group.required);
  assert_eq!(created.group.kind, SelectionKind::Multiple);
  assert_eq!(created.items.len(), 1);
  assert_eq!(created.items[0].price, Decimal::new(900, 2));

  let listed = list_complement_groups(&s, id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].items[0].name, "Fries");
}

#[tokio::test]
async fn group_bounds_are_checked() {
  let s = store().await;
  let id = tenant(&s, "Bounds Shop").await;

  let err = create_complement_group(&s, id, NewComplementGroup {
    name:        "Broken".into(),
    description: None,
    required:    Some(true),
    min:         Some(3),
    max:         Some(1),
    kind:        Some(SelectionKind::Single),
    options:     vec![],
  })
  .await
  .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidInput);

  let g = group(&s, id, "Fine").await;
  let err = update_complement_group(&s, id, g, ComplementGroupPatch {
    min: Some(4),
    ..Default::default()
  })
  .await
  .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn update_options_diffs_against_existing() {
  let s = store().await;
  let id = tenant(&s, "Diff Shop").await;
  let g = group(&s, id, "Extras").await;
  let before = s.list_complement_items(vec![g]).await.unwrap();
  let cheese = before.iter().find(|i| i.name == "Cheese").unwrap().clone();

  let updated = update_complement_group(&s, id, g, ComplementGroupPatch {
    name: Some("More Extras".into()),
    options: Some(vec![
      OptionInput {
        id: Some(cheese.id.to_string()),
        ..option("Double Cheese", 300)
      },
      OptionInput { id: Some("tmp-1".into()), ..option("Egg", 150) },
    ]),
    ..Default::default()
  })
  .await
  .unwrap();

  assert_eq!(updated.group.name, "More Extras");
  assert_eq!(updated.items.len(), 2);

  let kept = updated.items.iter().find(|i| i.id == cheese.id).unwrap();
  assert_eq!(kept.name, "Double Cheese");
  assert_eq!(kept.price, Decimal::new(300, 2));
  assert_eq!(kept.created_at, cheese.created_at);

  let egg = updated.items.iter().find(|i| i.name == "Egg").unwrap();
  assert_ne!(egg.id, cheese.id);
  assert!(!updated.items.iter().any(|i| i.name == "Bacon"));
}

#[tokio::test]
async fn update_without_options_leaves_items() {
  let s = store().await;
  let id = tenant(&s, "Keep Shop").await;
  let g = group(&s, id, "Extras").await;

  let updated = update_complement_group(&s, id, g, ComplementGroupPatch {
    active: Some(false),
    ..Default::default()
  })
  .await
  .unwrap();
  assert!(!updated.group.active);
  assert_eq!(updated.items.len(), 2);
}

#[tokio::test]
async fn delete_group_removes_links_and_options() {
  let s = store().await;
  let id = tenant(&s, "Drop Shop").await;
  let c = category(&s, id, "Mains").await;
  let g = group(&s, id, "Sauces").await;
  let keep = group(&s, id, "Drinks").await;
  let p = product(&s, id, c, "Steak").await;
  replace_complement_links(&s, id, p, &[g, keep]).await.unwrap();

  delete_complement_group(&s, id, g).await.unwrap();

  assert!(s.get_complement_group(id, g).await.unwrap().is_none());
  assert!(s.list_complement_items(vec![g]).await.unwrap().is_empty());
  let detail = get_product(&s, id, p).await.unwrap();
  assert_eq!(detail.group_ids(), vec![keep]);

  let err = delete_complement_group(&s, id, g).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn delete_single_option() {
  let s = store().await;
  let id = tenant(&s, "Option Shop").await;
  let other = tenant(&s, "Nosy Shop").await;
  let g = group(&s, id, "Extras").await;
  let items = s.list_complement_items(vec![g]).await.unwrap();

  let err = delete_complement_item(&s, other, items[0].id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  delete_complement_item(&s, id, items[0].id).await.unwrap();
  let left = s.list_complement_items(vec![g]).await.unwrap();
  assert_eq!(left.len(), 1);
  assert_eq!(left[0].id, items[1].id);
  assert!(s.get_complement_group(id, g).await.unwrap().is_some());
}
