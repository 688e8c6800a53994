//! Plain-text views of catalog, cart, session and order data.
//!
//! Every function returns a `String` so the commands decide where output goes
//! and the formatting can be tested without a terminal.

use std::fmt::Write as _;

use millet_market_client::api::Order;
use millet_market_client::{CartSnapshot, Session};
use millet_market_core::{CatalogProduct, OrderStatus, Price};

/// One row per product: id, name, price, supplier, stock note.
#[must_use]
pub fn product_table(products: &[CatalogProduct]) -> String {
    if products.is_empty() {
        return "No products listed.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:>5}  {:<28} {:>10}  {}", "ID", "PRODUCT", "PRICE", "SUPPLIER");
    for product in products {
        let _ = writeln!(
            out,
            "{:>5}  {:<28} {:>10}  {}{}",
            product.id,
            product.display_name,
            price_per_unit(product),
            product.supplier_or_default(),
            if product.is_out_of_stock() {
                " (out of stock)"
            } else {
                ""
            }
        );
    }
    out
}

/// Detail view of a single product.
#[must_use]
pub fn product_detail(product: &CatalogProduct) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", product.display_name, product.id);
    let _ = writeln!(out, "  Price:    {}", price_per_unit(product));
    let _ = writeln!(out, "  Supplier: {}", product.supplier_or_default());
    if let Some(category) = &product.category {
        let _ = writeln!(out, "  Category: {category}");
    }
    if let Some(stock) = product.stock {
        let _ = writeln!(out, "  In stock: {stock}");
    }
    out
}

fn price_per_unit(product: &CatalogProduct) -> String {
    let price = Price::inr(product.unit_price);
    product
        .unit
        .as_deref()
        .map_or_else(|| price.to_string(), |unit| format!("{price}/{unit}"))
}

/// Cart lines with line totals and the subtotal.
#[must_use]
pub fn cart(snapshot: &CartSnapshot) -> String {
    if snapshot.is_empty() {
        return "Cart is empty.\n".to_string();
    }

    let mut out = String::new();
    for line in snapshot.lines() {
        let _ = writeln!(
            out,
            "{:>5}  {:<24} {:>4} x {:>9} = {:>10}  [{}]",
            line.product_id,
            line.display_name,
            line.quantity,
            Price::inr(line.unit_price).to_string(),
            Price::inr(line.line_total()).to_string(),
            line.supplier_name
        );
    }
    let _ = writeln!(out, "{}", cart_summary(snapshot));
    out
}

/// One-line summary, e.g. `Cart: 5 items, subtotal ₹250.00`.
#[must_use]
pub fn cart_summary(snapshot: &CartSnapshot) -> String {
    let count = snapshot.item_count();
    format!(
        "Cart: {count} item{}, subtotal {}",
        if count == 1 { "" } else { "s" },
        snapshot.subtotal_price()
    )
}

/// Who is signed in, with profile fields.
#[must_use]
pub fn session(session: &Session) -> String {
    if !session.is_authenticated() {
        return "Not signed in.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Signed in as {}",
        session
            .user_name
            .as_deref()
            .or(session.email.as_deref())
            .unwrap_or("(unknown)")
    );
    let fields = [
        ("Email", session.email.as_deref()),
        ("Role", session.role.as_deref()),
        ("Mobile", session.mobile.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            let _ = writeln!(out, "  {label:<8}{value}");
        }
    }
    if let Some(address) = session.shipping_address() {
        let _ = writeln!(out, "  {:<8}{address}", "Address");
    }
    out
}

/// Table of orders, newest first as returned by the API.
#[must_use]
pub fn order_list(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders yet.\n".to_string();
    }

    let mut out = String::new();
    for order in orders {
        let placed = order
            .created_at
            .map_or_else(String::new, |t| t.format("%Y-%m-%d").to_string());
        let _ = writeln!(
            out,
            "#{:<6} {:<10} {:>4} items {:>10}  {}",
            order.id,
            placed,
            order.item_count(),
            Price::inr(order.total).to_string(),
            order.status.label()
        );
    }
    out
}

/// Order detail with a tracking timeline.
#[must_use]
pub fn order_tracking(order: &Order) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Order #{} - {}", order.id, order.status.label());
    for item in &order.items {
        let _ = writeln!(
            out,
            "  {:>4} x {:<24} {:>9}",
            item.quantity,
            item.display_name,
            Price::inr(item.unit_price).to_string()
        );
    }
    let _ = writeln!(out, "  Total:   {}", Price::inr(order.total));
    let _ = writeln!(out, "  Payment: {}", order.payment_method);
    if let Some(address) = &order.shipping_address {
        let _ = writeln!(out, "  Ship to: {address}");
    }

    out.push_str(&timeline(order.status));
    out
}

fn timeline(status: OrderStatus) -> String {
    let Some(current) = status.stage_index() else {
        return "  [x] Cancelled\n".to_string();
    };

    let mut out = String::new();
    for (i, stage) in OrderStatus::TRACKING_STAGES.iter().enumerate() {
        let mark = if i <= current { "x" } else { " " };
        let _ = writeln!(out, "  [{mark}] {}", stage.label());
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use millet_market_client::CartManager;
    use millet_market_client::api::OrderItem;
    use millet_market_core::{OrderId, PaymentMethod, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    fn foxtail() -> CatalogProduct {
        CatalogProduct {
            id: ProductId::new(1),
            display_name: "Foxtail".to_string(),
            unit_price: Decimal::new(50, 0),
            supplier_name: None,
            image_url: None,
            category: Some("Millet grain".to_string()),
            unit: Some("kg".to_string()),
            stock: Some(0),
        }
    }

    #[test]
    fn test_product_table() {
        let table = product_table(&[foxtail()]);
        assert!(table.contains("Foxtail"));
        assert!(table.contains("₹50.00/kg"));
        assert!(table.contains("SHG"));
        assert!(table.contains("(out of stock)"));
        assert_eq!(product_table(&[]), "No products listed.\n");
    }

    #[test]
    fn test_cart_summary_pluralises() {
        let mut cart = CartManager::new();
        cart.add_item(&foxtail(), 1, "").unwrap();
        assert_eq!(cart_summary(&cart.snapshot()), "Cart: 1 item, subtotal ₹50.00");

        cart.update_quantity(ProductId::new(1), 5);
        assert_eq!(
            cart_summary(&cart.snapshot()),
            "Cart: 5 items, subtotal ₹250.00"
        );
    }

    #[test]
    fn test_cart_lists_lines() {
        let mut cart = CartManager::new();
        assert_eq!(super::cart(&cart.snapshot()), "Cart is empty.\n");

        cart.add_item(&foxtail(), 2, "").unwrap();
        let view = super::cart(&cart.snapshot());
        assert!(view.contains("₹100.00"));
        assert!(view.contains("[SHG]"));
    }

    #[test]
    fn test_session_view() {
        assert_eq!(session(&Session::default()), "Not signed in.\n");

        let view = session(&Session {
            token: Some("jwt".to_string()),
            user_name: Some("Meena".to_string()),
            role: Some("shg_fpo".to_string()),
            city: Some("Anantapur".to_string()),
            ..Session::default()
        });
        assert!(view.starts_with("Signed in as Meena"));
        assert!(view.contains("shg_fpo"));
        assert!(view.contains("Anantapur"));
        assert!(!view.contains("jwt"));
    }

    #[test]
    fn test_order_tracking_marks_reached_stages() {
        let order = Order {
            id: OrderId::new(31),
            items: vec![OrderItem {
                product_id: ProductId::new(1),
                display_name: "Foxtail".to_string(),
                quantity: 2,
                unit_price: Decimal::new(50, 0),
            }],
            total: Decimal::new(100, 0),
            status: OrderStatus::Packed,
            payment_method: PaymentMethod::Upi,
            shipping_address: None,
            created_at: None,
        };

        let view = order_tracking(&order);
        assert!(view.contains("[x] Confirmed by seller"));
        assert!(view.contains("[x] Packed"));
        assert!(view.contains("[ ] Shipped"));
        assert!(view.contains("Payment: UPI"));
    }

    #[test]
    fn test_cancelled_timeline() {
        assert_eq!(timeline(OrderStatus::Cancelled), "  [x] Cancelled\n");
    }
}
