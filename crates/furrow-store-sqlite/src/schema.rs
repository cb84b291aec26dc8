//! Retail schema for local SQLite deployments.
//!
//! Column names match the built-in registry exactly; discovery against a
//! freshly initialised database reports no drift.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const RETAIL_SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS categories (
    id          TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    name        TEXT NOT NULL,
    description TEXT,
    sort_order  INTEGER,
    is_active   BOOLEAN NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    updated_at  TEXT
);

CREATE TABLE IF NOT EXISTS brands (
    id          TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    name        TEXT NOT NULL,
    description TEXT,
    is_active   BOOLEAN NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    updated_at  TEXT
);

CREATE TABLE IF NOT EXISTS suppliers (
    id             TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    name           TEXT NOT NULL,
    contact_person TEXT,
    email          TEXT,
    phone          TEXT,
    address        TEXT,
    is_active      BOOLEAN NOT NULL DEFAULT 1,
    created_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    updated_at     TEXT
);

CREATE TABLE IF NOT EXISTS products (
    id              TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    name            TEXT NOT NULL,
    sku             TEXT UNIQUE,
    description     TEXT,
    category_id     TEXT REFERENCES categories(id),
    brand_id        TEXT REFERENCES brands(id),
    supplier_id     TEXT REFERENCES suppliers(id),
    unit            TEXT,                        -- 'bag' | 'kg' | 'litre' ...
    unit_price      REAL NOT NULL,
    cost_price      REAL,
    stock_quantity  INTEGER NOT NULL DEFAULT 0,
    min_stock_level INTEGER,
    is_active       BOOLEAN NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    updated_at      TEXT
);

CREATE TABLE IF NOT EXISTS customers (
    id            TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    name          TEXT NOT NULL,
    email         TEXT,
    phone         TEXT,
    address       TEXT,
    customer_type TEXT,                          -- 'retail' | 'wholesale'
    credit_limit  REAL,
    is_active     BOOLEAN NOT NULL DEFAULT 1,
    created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    updated_at    TEXT
);

CREATE TABLE IF NOT EXISTS profiles (
    id          TEXT PRIMARY KEY,
    email       TEXT NOT NULL UNIQUE,
    full_name   TEXT,
    role        TEXT,                            -- 'admin' | 'manager' | 'cashier'
    is_active   BOOLEAN NOT NULL DEFAULT 1,
    preferences JSON,
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    updated_at  TEXT
);

CREATE TABLE IF NOT EXISTS sales (
    id              TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    sale_number     TEXT UNIQUE,
    customer_id     TEXT REFERENCES customers(id),
    sale_date       TEXT NOT NULL,
    subtotal        REAL,
    tax_amount      REAL,
    discount_amount REAL,
    total_amount    REAL NOT NULL,
    payment_method  TEXT,
    payment_status  TEXT,
    notes           TEXT,
    created_by      TEXT REFERENCES profiles(id),
    created_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    updated_at      TEXT
);

CREATE TABLE IF NOT EXISTS sale_items (
    id          TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    sale_id     TEXT NOT NULL REFERENCES sales(id),
    product_id  TEXT NOT NULL REFERENCES products(id),
    quantity    INTEGER NOT NULL,
    unit_price  REAL NOT NULL,
    total_price REAL NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

CREATE TABLE IF NOT EXISTS purchases (
    id                TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    purchase_number   TEXT UNIQUE,
    supplier_id       TEXT NOT NULL REFERENCES suppliers(id),
    purchase_date     TEXT NOT NULL,
    expected_delivery TEXT,
    total_amount      REAL NOT NULL,
    status            TEXT,                      -- 'pending' | 'received' | 'cancelled'
    notes             TEXT,
    metadata          JSON,
    created_by        TEXT REFERENCES profiles(id),
    created_at        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    updated_at        TEXT
);

CREATE TABLE IF NOT EXISTS purchase_items (
    id          TEXT PRIMARY KEY DEFAULT (lower(hex(randomblob(16)))),
    purchase_id TEXT NOT NULL REFERENCES purchases(id),
    product_id  TEXT NOT NULL REFERENCES products(id),
    quantity    INTEGER NOT NULL,
    unit_cost   REAL NOT NULL,
    total_cost  REAL NOT NULL,
    created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);

CREATE INDEX IF NOT EXISTS products_category_idx ON products(category_id);
CREATE INDEX IF NOT EXISTS sale_items_sale_idx   ON sale_items(sale_id);
CREATE INDEX IF NOT EXISTS sales_date_idx        ON sales(sale_date);
";
