use rust_decimal::Decimal;
use storefront_core::{
  ErrorKind,
  repo::Repository,
  service::settings::{get_or_create_settings, settings_for_subdomain, update_settings},
  tenant::{DEFAULT_CLOSE_TIME, DEFAULT_OPEN_TIME, SettingsPatch},
};
use uuid::Uuid;

use super::*;

#[tokio::test]
async fn first_read_provisions_defaults() {
  let s = store().await;
  let store_id = bare_tenant(&s, "old-shop").await;
  assert!(s.find_settings(store_id).await.unwrap().is_none());

  let settings = get_or_create_settings(&s, store_id).await.unwrap();
  assert!(settings.is_open);
  assert_eq!(settings.open_time, DEFAULT_OPEN_TIME);
  assert_eq!(settings.close_time, DEFAULT_CLOSE_TIME);
  assert_eq!(settings.delivery_fee, Decimal::ZERO);
  assert!(settings.whatsapp.is_none());

  let again = get_or_create_settings(&s, store_id).await.unwrap();
  assert_eq!(again.id, settings.id);
}

#[tokio::test]
async fn concurrent_first_reads_share_one_row() {
  let s = store().await;
  let store_id = bare_tenant(&s, "busy-shop").await;

  let (a, b, c) = tokio::join!(
    get_or_create_settings(&s, store_id),
    get_or_create_settings(&s, store_id),
    get_or_create_settings(&s, store_id),
  );
  let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
  assert_eq!(a.id, b.id);
  assert_eq!(b.id, c.id);

  let stored = s.find_settings(store_id).await.unwrap().unwrap();
  assert_eq!(stored.id, a.id);
}

#[tokio::test]
async fn settings_of_unknown_store_is_not_found() {
  let s = store().await;
  let err = get_or_create_settings(&s, Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn update_merges_only_given_fields() {
  let s = store().await;
  let store_id = tenant(&s, "Merge Shop").await;

  let first = update_settings(&s, store_id, SettingsPatch {
    delivery_fee: Some(Decimal::new(750, 2)),
    whatsapp: Some("+55 11 99999-0000".into()),
    ..Default::default()
  })
  .await
  .unwrap();
  assert_eq!(first.delivery_fee, Decimal::new(750, 2));
  assert_eq!(first.open_time, DEFAULT_OPEN_TIME);

  let second = update_settings(&s, store_id, SettingsPatch {
    is_open: Some(false),
    whatsapp: Some("  ".into()),
    ..Default::default()
  })
  .await
  .unwrap();
  assert!(!second.is_open);
  assert_eq!(second.delivery_fee, Decimal::new(750, 2));
  assert!(second.whatsapp.is_none());
  assert_eq!(second.id, first.id);

  let stored = s.find_settings(store_id).await.unwrap().unwrap();
  assert_eq!(stored.delivery_fee, Decimal::new(750, 2));
  assert!(!stored.is_open);
}

#[tokio::test]
async fn update_without_row_creates_defaults_plus_patch() {
  let s = store().await;
  let store_id = bare_tenant(&s, "fresh-shop").await;

  let created = update_settings(&s, store_id, SettingsPatch {
    close_time: Some("23:30".into()),
    ..Default::default()
  })
  .await
  .unwrap();
  assert_eq!(created.close_time, "23:30");
  assert_eq!(created.open_time, DEFAULT_OPEN_TIME);

  let stored = s.find_settings(store_id).await.unwrap().unwrap();
  assert_eq!(stored.id, created.id);
}

#[tokio::test]
async fn update_rejects_bad_values() {
  let s = store().await;
  let store_id = tenant(&s, "Strict Shop").await;

  let err = update_settings(&s, store_id, SettingsPatch {
    open_time: Some("25:99".into()),
    ..Default::default()
  })
  .await
  .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidInput);

  let err = update_settings(&s, store_id, SettingsPatch {
    min_order_value: Some(Decimal::new(-1, 0)),
    ..Default::default()
  })
  .await
  .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn public_settings_by_subdomain() {
  let s = store().await;
  bare_tenant(&s, "corner-cafe").await;

  let (public, settings) = settings_for_subdomain(&s, "corner-cafe").await.unwrap();
  assert_eq!(public.subdomain, "corner-cafe");
  assert_eq!(settings.store_id, public.id);

  let err = settings_for_subdomain(&s, "nowhere").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}
