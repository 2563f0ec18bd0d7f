pub mod gateway;
pub mod prepare_env;

pub use gateway::MemoryGateway;
use recon_common::Money;

use crate::db_types::{CustomerInfo, LineItem, NewOrder};

pub fn customer(name: &str, email: &str) -> CustomerInfo {
    CustomerInfo { name: name.to_string(), email: email.to_string(), phone: None, shipping_address: None }
}

pub fn line_item(product_id: &str, price: i64, quantity: u32) -> LineItem {
    LineItem {
        product_id: product_id.to_string(),
        name: format!("Product {product_id}"),
        unit_price: Money::from(price),
        quantity,
    }
}

/// A standard order: subtotal 100.00, shipping 5.00, total 105.00.
pub fn standard_order() -> NewOrder {
    NewOrder::new(
        customer("Alice Example", "alice@example.com"),
        vec![line_item("sku-100", 5_000, 2)],
        Money::from(500),
        "usd",
    )
    .expect("standard order amounts are representable")
}
