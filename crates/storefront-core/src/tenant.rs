//! Tenants ("stores") and their one-to-one settings row.

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
  pub id:          Uuid,
  pub user_id:     Uuid,
  pub name:        String,
  /// Unique, URL-safe; see [`validate_subdomain`].
  pub subdomain:   String,
  pub description: Option<String>,
  pub logo_url:    Option<String>,
  pub cover_image: Option<String>,
  pub address:     Option<String>,
  pub created_at:  DateTime<Utc>,
}

/// The subset of [`Store`] shown on the public menu.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicStore {
  pub id:          Uuid,
  pub name:        String,
  pub subdomain:   String,
  pub description: Option<String>,
  pub logo_url:    Option<String>,
  pub cover_image: Option<String>,
}

impl From<&Store> for PublicStore {
  fn from(s: &Store) -> Self {
    Self {
      id:          s.id,
      name:        s.name.clone(),
      subdomain:   s.subdomain.clone(),
      description: s.description.clone(),
      logo_url:    s.logo_url.clone(),
      cover_image: s.cover_image.clone(),
    }
  }
}

/// Partial update of the store's display fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProfilePatch {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub logo_url:    Option<String>,
  pub cover_image: Option<String>,
  pub address:     Option<String>,
}

// ─── Subdomains ──────────────────────────────────────────────────────────────

const SUBDOMAIN_MIN: usize = 3;
const SUBDOMAIN_MAX: usize = 63;

/// Check that `s` is a usable DNS label: 3 to 63 chars of `[a-z0-9-]`, not
/// starting or ending with a hyphen.
pub fn validate_subdomain(s: &str) -> Result<()> {
  let ok_len = (SUBDOMAIN_MIN..=SUBDOMAIN_MAX).contains(&s.len());
  let ok_chars = s
    .bytes()
    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
  if !ok_len || !ok_chars || s.starts_with('-') || s.ends_with('-') {
    return Err(Error::invalid(format!("malformed subdomain: {s:?}")));
  }
  Ok(())
}

/// Derive a subdomain from a store's display name.
///
/// Latin accents are folded, every other non-alphanumeric run becomes a
/// single hyphen, and short results are padded with `-store`.
pub fn subdomain_from_name(name: &str) -> String {
  let mut out = String::with_capacity(name.len());
  for c in name.chars().flat_map(char::to_lowercase) {
    let c = fold_accent(c);
    if c.is_ascii_alphanumeric() {
      out.push(c);
    } else if !out.is_empty() && !out.ends_with('-') {
      out.push('-');
    }
  }
  out.truncate(SUBDOMAIN_MAX);
  let mut out = out.trim_end_matches('-').to_owned();

  if out.len() < SUBDOMAIN_MIN {
    if !out.is_empty() {
      out.push('-');
    }
    out.push_str("store");
  }
  out
}

fn fold_accent(c: char) -> char {
  match c {
    'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
    'é' | 'è' | 'ê' | 'ë' => 'e',
    'í' | 'ì' | 'î' | 'ï' => 'i',
    'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
    'ú' | 'ù' | 'û' | 'ü' => 'u',
    'ç' => 'c',
    'ñ' => 'n',
    other => other,
  }
}

// ─── Settings ────────────────────────────────────────────────────────────────

pub const DEFAULT_OPEN_TIME: &str = "13:00";
pub const DEFAULT_CLOSE_TIME: &str = "22:00";
pub const DEFAULT_ESTIMATED_TIME: &str = "30-45 min";

/// Per-store operating configuration. Exactly one row per store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSettings {
  pub id:              Uuid,
  pub store_id:        Uuid,
  pub is_open:         bool,
  /// `HH:MM`, local to the store.
  pub open_time:       String,
  pub close_time:      String,
  pub delivery_fee:    Decimal,
  pub min_order_value: Decimal,
  pub estimated_time:  String,
  /// Contact number shown to customers.
  pub whatsapp:        Option<String>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl StoreSettings {
  /// The fixed default set used when a store's settings are first read.
  pub fn defaults(store_id: Uuid) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      store_id,
      is_open: true,
      open_time: DEFAULT_OPEN_TIME.to_owned(),
      close_time: DEFAULT_CLOSE_TIME.to_owned(),
      delivery_fee: Decimal::ZERO,
      min_order_value: Decimal::ZERO,
      estimated_time: DEFAULT_ESTIMATED_TIME.to_owned(),
      whatsapp: None,
      created_at: now,
      updated_at: now,
    }
  }

  /// Overlay the fields present in `patch`.
  pub fn merged(mut self, patch: &SettingsPatch) -> Self {
    if let Some(v) = patch.is_open {
      self.is_open = v;
    }
    if let Some(v) = &patch.open_time {
      self.open_time = v.clone();
    }
    if let Some(v) = &patch.close_time {
      self.close_time = v.clone();
    }
    if let Some(v) = patch.delivery_fee {
      self.delivery_fee = v;
    }
    if let Some(v) = patch.min_order_value {
      self.min_order_value = v;
    }
    if let Some(v) = &patch.estimated_time {
      self.estimated_time = v.clone();
    }
    if let Some(v) = &patch.whatsapp {
      self.whatsapp = non_empty(v);
    }
    self
  }
}

/// Partial settings update. An empty `whatsapp` string clears the contact.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
  pub is_open:         Option<bool>,
  pub open_time:       Option<String>,
  pub close_time:      Option<String>,
  pub delivery_fee:    Option<Decimal>,
  pub min_order_value: Option<Decimal>,
  pub estimated_time:  Option<String>,
  pub whatsapp:        Option<String>,
}

impl SettingsPatch {
  pub fn validate(&self) -> Result<()> {
    for t in [&self.open_time, &self.close_time].into_iter().flatten() {
      NaiveTime::parse_from_str(t, "%H:%M")
        .map_err(|_| Error::invalid(format!("expected HH:MM, got {t:?}")))?;
    }
    for (field, v) in [
      ("deliveryFee", self.delivery_fee),
      ("minOrderValue", self.min_order_value),
    ] {
      if v.is_some_and(|v| v.is_sign_negative()) {
        return Err(Error::invalid(format!("{field} must not be negative")));
      }
    }
    Ok(())
  }
}

pub(crate) fn non_empty(s: &str) -> Option<String> {
  let t = s.trim();
  (!t.is_empty()).then(|| t.to_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slug_folds_accents_and_collapses_separators() {
    assert_eq!(subdomain_from_name("Pizzaria São João"), "pizzaria-sao-joao");
    assert_eq!(subdomain_from_name("  Burger & Co.  "), "burger-co");
  }

  #[test]
  fn slug_pads_short_names() {
    assert_eq!(subdomain_from_name("A"), "a-store");
    assert_eq!(subdomain_from_name("!!!"), "store");
  }

  #[test]
  fn derived_slugs_validate() {
    for name in ["Açaí da Praia", "X", "Très Bon Café 24h"] {
      validate_subdomain(&subdomain_from_name(name)).unwrap();
    }
  }

  #[test]
  fn subdomain_rules() {
    assert!(validate_subdomain("my-store").is_ok());
    assert!(validate_subdomain("ab").is_err());
    assert!(validate_subdomain("-edge").is_err());
    assert!(validate_subdomain("edge-").is_err());
    assert!(validate_subdomain("Upper").is_err());
    assert!(validate_subdomain("has space").is_err());
  }

  #[test]
  fn defaults_match_first_read_set() {
    let s = StoreSettings::defaults(Uuid::nil());
    assert!(s.is_open);
    assert_eq!(s.open_time, "13:00");
    assert_eq!(s.close_time, "22:00");
    assert_eq!(s.delivery_fee, Decimal::ZERO);
    assert_eq!(s.min_order_value, Decimal::ZERO);
    assert_eq!(s.estimated_time, "30-45 min");
    assert!(s.whatsapp.is_none());
  }

  #[test]
  fn merge_only_touches_present_fields() {
    let base = StoreSettings::defaults(Uuid::nil());
    let patch = SettingsPatch {
      delivery_fee: Some(Decimal::new(550, 2)),
      whatsapp: Some("5511999990000".into()),
      ..Default::default()
    };
    let merged = base.clone().merged(&patch);
    assert_eq!(merged.delivery_fee, Decimal::new(550, 2));
    assert_eq!(merged.whatsapp.as_deref(), Some("5511999990000"));
    assert_eq!(merged.open_time, base.open_time);
    assert_eq!(merged.is_open, base.is_open);

    let cleared = merged.merged(&SettingsPatch {
      whatsapp: Some(String::new()),
      ..Default::default()
    });
    assert!(cleared.whatsapp.is_none());
  }

  #[test]
  fn patch_validation() {
    let bad_time = SettingsPatch { open_time: Some("25:00".into()), ..Default::default() };
    assert!(bad_time.validate().is_err());

    let negative = SettingsPatch {
      min_order_value: Some(Decimal::new(-1, 0)),
      ..Default::default()
    };
    assert!(negative.validate().is_err());

    let ok = SettingsPatch { close_time: Some("23:30".into()), ..Default::default() };
    assert!(ok.validate().is_ok());
  }
}
