#![warn(clippy::missing_docs_in_private_items)]

/// Create settings table SQL.
pub(crate) const DB_CREATE_SETTINGS: &str = "
CREATE TABLE IF NOT EXISTS settings (
    name VARCHAR[24] UNIQUE PRIMARY KEY NOT NULL,
    value TEXT
);
";

/// Create customers table SQL.
pub(crate) const DB_CREATE_CUSTOMERS: &str = "
CREATE TABLE IF NOT EXISTS customers (
    customer_id INTEGER PRIMARY KEY NOT NULL,
    first_name TEXT,
    last_name TEXT,
    nickname TEXT
);
";

/// Create payments table SQL.
pub(crate) const DB_CREATE_PAYMENTS: &str = "
CREATE TABLE IF NOT EXISTS payments (
    payment_id INTEGER PRIMARY KEY NOT NULL,
    customer_id INTEGER NOT NULL,
    stamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    description TEXT NOT NULL,
    balance_change INTEGER NOT NULL
);
";

/// Create order line items table SQL. The line total is a generated
/// column so it can never drift from its factors.
pub(crate) const DB_CREATE_ORDER_ITEMS: &str = "
CREATE TABLE IF NOT EXISTS order_items (
    order_id INTEGER PRIMARY KEY NOT NULL,
    payment_id INTEGER NOT NULL,
    item_name TEXT,
    item_cost INTEGER NOT NULL,
    count INTEGER NOT NULL CHECK (count >= 1),
    cost_total INTEGER GENERATED ALWAYS AS (item_cost * count),
    FOREIGN KEY (payment_id) REFERENCES payments(payment_id) ON DELETE CASCADE
);
";
