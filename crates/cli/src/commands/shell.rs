//! Interactive cart shell.
//!
//! The cart only lives as long as the process, so building an order happens
//! inside one long-running shell session:
//!
//! ```text
//! > list
//! > add 1 2
//! Cart: 2 items, subtotal ₹100.00
//! > qty 1 5
//! Cart: 5 items, subtotal ₹250.00
//! > checkout upi
//! ```
//!
//! The shell subscribes to the cart and prints the summary after every
//! change, whichever command caused it.

#![allow(clippy::print_stdout)]

use std::io::Write as _;

use millet_market_client::{AppContext, Result};
use millet_market_core::{PaymentMethod, ProductId};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::render;

const HELP: &str = "\
Commands:
  list                     list products
  show <id>                show one product
  add <id> [qty]           add to cart (default qty 1)
  remove <id>              remove from cart
  qty <id> <n>             set quantity
  cart                     show cart
  clear                    empty cart
  checkout <cod|upi|card>  place order
  orders                   list your orders
  help                     this text
  quit                     leave the shell
";

/// A parsed shell line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Show(ProductId),
    Add { id: ProductId, quantity: u32 },
    Remove(ProductId),
    Quantity { id: ProductId, quantity: u32 },
    Cart,
    Clear,
    Checkout(PaymentMethod),
    Orders,
    Help,
    Quit,
}

/// Why a shell line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("missing argument <{0}>")]
    MissingArgument(&'static str),
    #[error("invalid <{name}>: '{value}'")]
    InvalidArgument { name: &'static str, value: String },
}

/// Parse one line of shell input.
///
/// # Errors
///
/// Returns `ParseError` for blank lines, unknown commands, and missing or
/// malformed arguments.
pub fn parse(line: &str) -> std::result::Result<ShellCommand, ParseError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Err(ParseError::Empty);
    };

    let command = match command.to_ascii_lowercase().as_str() {
        "list" | "ls" | "products" => ShellCommand::List,
        "show" => ShellCommand::Show(arg(words.next(), "id")?),
        "add" => ShellCommand::Add {
            id: arg(words.next(), "id")?,
            quantity: words.next().map_or(Ok(1), |q| arg(Some(q), "qty"))?,
        },
        "remove" | "rm" => ShellCommand::Remove(arg(words.next(), "id")?),
        "qty" => ShellCommand::Quantity {
            id: arg(words.next(), "id")?,
            quantity: arg(words.next(), "n")?,
        },
        "cart" => ShellCommand::Cart,
        "clear" => ShellCommand::Clear,
        "checkout" => ShellCommand::Checkout(arg(words.next(), "payment")?),
        "orders" => ShellCommand::Orders,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn arg<T: std::str::FromStr>(
    word: Option<&str>,
    name: &'static str,
) -> std::result::Result<T, ParseError> {
    let word = word.ok_or(ParseError::MissingArgument(name))?;
    word.parse().map_err(|_| ParseError::InvalidArgument {
        name,
        value: word.to_string(),
    })
}

/// Run the shell until `quit` or end of input.
///
/// # Errors
///
/// Command failures are reported inline and do not end the shell; this only
/// returns an error for failures outside a command.
pub async fn run(ctx: &mut AppContext) -> Result<()> {
    let subscription = ctx
        .cart_mut()
        .subscribe_fn(|snapshot| println!("{}", render::cart_summary(snapshot)));

    print!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read input");
                break;
            }
        };

        let command = match parse(&line) {
            Ok(command) => command,
            Err(ParseError::Empty) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }

        match execute(ctx, command).await {
            Ok(output) => print!("{output}"),
            Err(e) => {
                println!("error: {e}");
                if e.needs_login() {
                    println!("(sign in with `mm-cli login` first)");
                }
            }
        }
    }

    ctx.cart_mut().unsubscribe(subscription);
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// Run one command and return the text to show for it.
///
/// Cart changes themselves are announced by the subscription set up in
/// [`run`]; the returned text only covers listings and notices.
async fn execute(ctx: &mut AppContext, command: ShellCommand) -> Result<String> {
    let output = match command {
        ShellCommand::List => render::product_table(&ctx.api().list_products().await?),
        ShellCommand::Show(id) => render::product_detail(&ctx.api().get_product(id).await?),
        ShellCommand::Add { id, quantity } => add(ctx, id, quantity).await?,
        ShellCommand::Remove(id) => {
            if ctx.cart_mut().remove_item(id) {
                String::new()
            } else {
                format!("Product {id} is not in the cart.\n")
            }
        }
        ShellCommand::Quantity { id, quantity } => {
            if quantity == 0 {
                format!("Quantity must be at least 1; use `remove {id}` to drop the line.\n")
            } else if ctx.cart().line(id).is_none() {
                format!("Product {id} is not in the cart.\n")
            } else {
                ctx.cart_mut().update_quantity(id, quantity);
                String::new()
            }
        }
        ShellCommand::Cart => render::cart(&ctx.cart().snapshot()),
        ShellCommand::Clear => {
            ctx.cart_mut().clear();
            String::new()
        }
        ShellCommand::Checkout(payment) => render::order_tracking(&ctx.checkout(payment).await?),
        ShellCommand::Orders => render::order_list(&ctx.api().list_orders().await?),
        ShellCommand::Help => HELP.to_string(),
        ShellCommand::Quit => String::new(),
    };
    Ok(output)
}

/// Add to the cart without going past the reported stock, counting what the
/// cart already holds. Products without a stock figure are not limited.
async fn add(ctx: &mut AppContext, id: ProductId, quantity: u32) -> Result<String> {
    let product = ctx.api().get_product(id).await?;
    let image = product.image_url.clone().unwrap_or_default();

    let Some(stock) = product.stock else {
        ctx.cart_mut().add_item(&product, quantity, image)?;
        return Ok(String::new());
    };

    let in_cart = ctx.cart().line(id).map_or(0, |line| line.quantity);
    let available = stock.saturating_sub(in_cart);
    if available == 0 {
        return Ok(if in_cart == 0 {
            format!("{} is out of stock.\n", product.display_name)
        } else {
            format!(
                "All {stock} available {} are already in the cart.\n",
                product.display_name
            )
        });
    }

    let added = quantity.min(available);
    ctx.cart_mut().add_item(&product, added, image)?;
    if added < quantity {
        Ok(format!(
            "Only {available} more {} available; added {added}.\n",
            product.display_name
        ))
    } else {
        Ok(String::new())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use millet_market_client::{ApiError, AppError, CartError, MemorySessionStore};
    use millet_market_integration_tests::{FakeMarketplace, TEST_EMAIL, TEST_PASSWORD};
    use rust_decimal::Decimal;
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_parse_add_defaults_quantity() {
        assert_eq!(
            parse("add 3"),
            Ok(ShellCommand::Add {
                id: ProductId::new(3),
                quantity: 1
            })
        );
        assert_eq!(
            parse("  ADD 3 4 "),
            Ok(ShellCommand::Add {
                id: ProductId::new(3),
                quantity: 4
            })
        );
    }

    #[test]
    fn test_parse_quantity_accepts_zero() {
        assert_eq!(
            parse("qty 1 0"),
            Ok(ShellCommand::Quantity {
                id: ProductId::new(1),
                quantity: 0
            })
        );
    }

    #[test]
    fn test_parse_checkout() {
        assert_eq!(
            parse("checkout cod"),
            Ok(ShellCommand::Checkout(PaymentMethod::CashOnDelivery))
        );
        assert_eq!(
            parse("checkout"),
            Err(ParseError::MissingArgument("payment"))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("buy 1"), Err(ParseError::Unknown("buy".to_string())));
        assert_eq!(parse("remove"), Err(ParseError::MissingArgument("id")));
        assert_eq!(
            parse("add one"),
            Err(ParseError::InvalidArgument {
                name: "id",
                value: "one".to_string()
            })
        );
        assert_eq!(
            parse("qty 1 -2"),
            Err(ParseError::InvalidArgument {
                name: "n",
                value: "-2".to_string()
            })
        );
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(parse("ls"), Ok(ShellCommand::List));
        assert_eq!(parse("rm 2"), Ok(ShellCommand::Remove(ProductId::new(2))));
        assert_eq!(parse("exit"), Ok(ShellCommand::Quit));
    }

    // =========================================================================
    // Execution
    // =========================================================================

    const FOXTAIL: ProductId = ProductId::new(1);
    const RAGI_FLOUR: ProductId = ProductId::new(2);
    const KODO: ProductId = ProductId::new(3);

    async fn shell_context() -> (FakeMarketplace, AppContext) {
        let server = FakeMarketplace::start().await;
        let ctx = AppContext::new(server.config(), Box::new(MemorySessionStore::new("shell")))
            .await
            .unwrap();
        (server, ctx)
    }

    async fn run_line(ctx: &mut AppContext, line: &str) -> Result<String> {
        execute(ctx, parse(line).unwrap()).await
    }

    fn quantity_of(ctx: &AppContext, id: ProductId) -> Option<u32> {
        ctx.cart().line(id).map(|line| line.quantity)
    }

    #[tokio::test]
    async fn test_add_merges_into_one_line() {
        let (_server, mut ctx) = shell_context().await;

        assert_eq!(run_line(&mut ctx, "add 1 2").await.unwrap(), "");
        assert_eq!(run_line(&mut ctx, "add 1 3").await.unwrap(), "");

        assert_eq!(ctx.cart().len(), 1);
        assert_eq!(quantity_of(&ctx, FOXTAIL), Some(5));
        assert_eq!(ctx.cart().subtotal(), Decimal::new(250, 0));
    }

    #[tokio::test]
    async fn test_add_refuses_out_of_stock() {
        let (_server, mut ctx) = shell_context().await;

        let output = run_line(&mut ctx, "add 3").await.unwrap();

        assert_eq!(output, "Kodo is out of stock.\n");
        assert_eq!(quantity_of(&ctx, KODO), None);
        assert!(ctx.cart().is_empty());
    }

    #[tokio::test]
    async fn test_add_caps_quantity_at_stock() {
        let (_server, mut ctx) = shell_context().await;

        let output = run_line(&mut ctx, "add 2 50").await.unwrap();
        assert_eq!(output, "Only 40 more Ragi flour available; added 40.\n");
        assert_eq!(quantity_of(&ctx, RAGI_FLOUR), Some(40));

        let output = run_line(&mut ctx, "add 2").await.unwrap();
        assert_eq!(
            output,
            "All 40 available Ragi flour are already in the cart.\n"
        );
        assert_eq!(quantity_of(&ctx, RAGI_FLOUR), Some(40));
    }

    #[tokio::test]
    async fn test_add_counts_quantity_already_in_cart() {
        let (_server, mut ctx) = shell_context().await;
        run_line(&mut ctx, "add 2 30").await.unwrap();

        let output = run_line(&mut ctx, "add 2 15").await.unwrap();

        assert_eq!(output, "Only 10 more Ragi flour available; added 10.\n");
        assert_eq!(quantity_of(&ctx, RAGI_FLOUR), Some(40));
    }

    #[tokio::test]
    async fn test_add_errors_leave_cart_unchanged() {
        let (_server, mut ctx) = shell_context().await;
        run_line(&mut ctx, "add 1").await.unwrap();

        let missing = run_line(&mut ctx, "add 99").await.unwrap_err();
        assert!(matches!(missing, AppError::Api(ApiError::NotFound(_))));

        let zero = run_line(&mut ctx, "add 1 0").await.unwrap_err();
        assert!(matches!(zero, AppError::Cart(CartError::InvalidQuantity(0))));

        assert_eq!(ctx.cart().len(), 1);
        assert_eq!(quantity_of(&ctx, FOXTAIL), Some(1));
    }

    #[tokio::test]
    async fn test_quantity_zero_keeps_line_and_hints() {
        let (_server, mut ctx) = shell_context().await;
        run_line(&mut ctx, "add 1 2").await.unwrap();

        let output = run_line(&mut ctx, "qty 1 0").await.unwrap();

        assert!(output.contains("use `remove 1`"));
        assert_eq!(quantity_of(&ctx, FOXTAIL), Some(2));
    }

    #[tokio::test]
    async fn test_quantity_updates_existing_line_only() {
        let (_server, mut ctx) = shell_context().await;
        run_line(&mut ctx, "add 1 2").await.unwrap();

        assert_eq!(run_line(&mut ctx, "qty 1 5").await.unwrap(), "");
        assert_eq!(quantity_of(&ctx, FOXTAIL), Some(5));

        let output = run_line(&mut ctx, "qty 2 5").await.unwrap();
        assert_eq!(output, "Product 2 is not in the cart.\n");
        assert_eq!(ctx.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_absent_is_a_no_op() {
        let (_server, mut ctx) = shell_context().await;
        run_line(&mut ctx, "add 1 2").await.unwrap();
        let revision = ctx.cart().snapshot().revision();

        let output = run_line(&mut ctx, "remove 2").await.unwrap();

        assert_eq!(output, "Product 2 is not in the cart.\n");
        assert_eq!(ctx.cart().snapshot().revision(), revision);
        assert_eq!(quantity_of(&ctx, FOXTAIL), Some(2));

        assert_eq!(run_line(&mut ctx, "remove 1").await.unwrap(), "");
        assert!(ctx.cart().is_empty());
    }

    #[tokio::test]
    async fn test_cart_and_clear() {
        let (_server, mut ctx) = shell_context().await;
        run_line(&mut ctx, "add 1 2").await.unwrap();

        let view = run_line(&mut ctx, "cart").await.unwrap();
        assert!(view.contains("Foxtail"));
        assert!(view.contains("Cart: 2 items, subtotal ₹100.00"));

        run_line(&mut ctx, "clear").await.unwrap();
        assert_eq!(run_line(&mut ctx, "cart").await.unwrap(), "Cart is empty.\n");
    }

    #[tokio::test]
    async fn test_checkout_requires_login_and_keeps_cart() {
        let (server, mut ctx) = shell_context().await;
        run_line(&mut ctx, "add 1 5").await.unwrap();

        let err = run_line(&mut ctx, "checkout upi").await.unwrap_err();
        assert!(err.needs_login());
        assert_eq!(quantity_of(&ctx, FOXTAIL), Some(5));

        ctx.login(TEST_EMAIL, &SecretString::from(TEST_PASSWORD))
            .await
            .unwrap();
        let output = run_line(&mut ctx, "checkout upi").await.unwrap();

        assert!(output.contains("Total:   ₹250.00"));
        assert!(output.contains("Payment: UPI"));
        assert!(ctx.cart().is_empty());
        assert_eq!(server.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_list_renders_catalog() {
        let (_server, mut ctx) = shell_context().await;

        let output = run_line(&mut ctx, "list").await.unwrap();

        assert!(output.contains("Ragi flour"));
        assert!(output.contains("(out of stock)"));
    }
}
