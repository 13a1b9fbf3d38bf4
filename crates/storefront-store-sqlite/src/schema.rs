//! SQL schema for the storefront SQLite store.
//!
//! Executed once at connection startup. No foreign keys are declared: link
//! rows and dependents are removed explicitly by the core's integrity guard.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS stores (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    name        TEXT NOT NULL,
    subdomain   TEXT NOT NULL UNIQUE,
    description TEXT,
    logo_url    TEXT,
    cover_image TEXT,
    address     TEXT,
    created_at  TEXT NOT NULL
);

-- One row per store, created lazily on first read.
CREATE TABLE IF NOT EXISTS store_settings (
    id              TEXT PRIMARY KEY,
    store_id        TEXT NOT NULL UNIQUE,
    is_open         INTEGER NOT NULL,
    open_time       TEXT NOT NULL,
    close_time      TEXT NOT NULL,
    delivery_fee    TEXT NOT NULL,   -- decimal string
    min_order_value TEXT NOT NULL,
    estimated_time  TEXT NOT NULL,
    whatsapp        TEXT,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id         TEXT PRIMARY KEY,
    store_id   TEXT NOT NULL,
    name       TEXT NOT NULL,
    active     INTEGER NOT NULL,
    position   INTEGER NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    id          TEXT PRIMARY KEY,
    store_id    TEXT NOT NULL,
    category_id TEXT NOT NULL,
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    price       TEXT NOT NULL,
    image_url   TEXT,
    active      INTEGER NOT NULL,
    position    INTEGER NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS complement_groups (
    id          TEXT PRIMARY KEY,
    store_id    TEXT NOT NULL,
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    required    INTEGER NOT NULL,
    min_select  INTEGER NOT NULL,
    max_select  INTEGER NOT NULL,
    kind        TEXT NOT NULL,      -- 'single' | 'multiple'
    active      INTEGER NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS complement_items (
    id          TEXT PRIMARY KEY,
    group_id    TEXT NOT NULL,
    name        TEXT NOT NULL,
    price       TEXT NOT NULL,
    active      INTEGER NOT NULL,
    image_url   TEXT,
    description TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS product_complements (
    id         TEXT PRIMARY KEY,
    product_id TEXT NOT NULL,
    group_id   TEXT NOT NULL,
    position   INTEGER NOT NULL,
    active     INTEGER NOT NULL
);

-- Phone is a lookup key, deliberately not UNIQUE.
CREATE TABLE IF NOT EXISTS customers (
    id         TEXT PRIMARY KEY,
    store_id   TEXT NOT NULL,
    name       TEXT NOT NULL,
    phone      TEXT NOT NULL,
    address    TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    id             TEXT PRIMARY KEY,
    store_id       TEXT NOT NULL,
    customer_id    TEXT,
    status         TEXT NOT NULL,   -- 'NEW' | 'PREPARING' | ...
    total          TEXT NOT NULL,
    payment_method TEXT,
    delivery_fee   TEXT NOT NULL,
    created_at     TEXT NOT NULL,
    finalized_at   TEXT,
    canceled_at    TEXT,
    cancel_reason  TEXT,
    canceled_by    TEXT
);

-- Items are written once; `complements` is the JSON snapshot.
CREATE TABLE IF NOT EXISTS order_items (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    id          TEXT NOT NULL UNIQUE,
    order_id    TEXT NOT NULL,
    product_id  TEXT NOT NULL,
    quantity    INTEGER NOT NULL CHECK (quantity >= 1),
    unit_price  TEXT NOT NULL,
    complements TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS categories_store_idx     ON categories(store_id, position);
CREATE INDEX IF NOT EXISTS products_store_idx       ON products(store_id, category_id);
CREATE INDEX IF NOT EXISTS groups_store_idx         ON complement_groups(store_id);
CREATE INDEX IF NOT EXISTS items_group_idx          ON complement_items(group_id);
CREATE INDEX IF NOT EXISTS links_product_idx        ON product_complements(product_id);
CREATE INDEX IF NOT EXISTS links_group_idx          ON product_complements(group_id);
CREATE INDEX IF NOT EXISTS customers_phone_idx      ON customers(store_id, phone);
CREATE INDEX IF NOT EXISTS orders_store_idx         ON orders(store_id, created_at);
CREATE INDEX IF NOT EXISTS order_items_order_idx    ON order_items(order_id);
CREATE INDEX IF NOT EXISTS order_items_product_idx  ON order_items(product_id);

PRAGMA user_version = 1;
";
