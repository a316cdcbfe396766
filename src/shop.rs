// =============================================================================
// SHOP MODULE
// =============================================================================
// The storefront context: one catalog controller plus one shopping cart,
// created once at startup and handed to the command loop.
//
// LEARNING NOTES:
// - Console input is parsed into a typed Command first; bad numbers are
//   rejected here and never reach the cart
// - dispatch() is the single entry point the event loop calls
// =============================================================================

use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use crate::api::CatalogApi;
use crate::cart::ShoppingCart;
use crate::catalog::CatalogController;
use crate::error::ShopResult;
use crate::models::PageDirection;
use crate::view::{CartView, CatalogView};

/// Help text printed by the `help` command
pub const HELP: &str = "\
Commands:
  search [TEXT]       list products whose name matches TEXT (all when empty)
  category [NAME]     list products in a category (all when empty)
  categories          show the available categories
  first | prev | next | last
  page N              jump to result page N
  show ID             product details
  buy ID [QTY]        add a product on this page to the cart (QTY defaults to 1)
  qty ID N            change a cart quantity (0 removes the product)
  remove ID           remove a product from the cart
  cart                show the cart
  checkout            record the purchase (nothing is charged)
  quit";

// =============================================================================
// COMMANDS
// =============================================================================

/// One line of user input, parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Category(String),
    Categories,
    Page(PageDirection),
    Goto(u32),
    Show(i64),
    Buy { product_id: i64, quantity: i32 },
    Quantity { product_id: i64, quantity: i32 },
    Remove(i64),
    Cart,
    Checkout,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("empty input")]
    Empty,

    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("'{command}' needs {what}")]
    Missing {
        command: &'static str,
        what: &'static str,
    },

    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, ParseCommandError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();

        let command = match word.to_lowercase().as_str() {
            "" => return Err(ParseCommandError::Empty),
            "search" | "s" => Command::Search(rest.to_string()),
            "category" | "c" => Command::Category(rest.to_string()),
            "categories" => Command::Categories,
            "first" => Command::Page(PageDirection::First),
            "prev" | "p" => Command::Page(PageDirection::Prev),
            "next" | "n" => Command::Page(PageDirection::Next),
            "last" => Command::Page(PageDirection::Last),
            "page" | "goto" => Command::Goto(number(args.next(), "page", "a page number")?),
            "show" => Command::Show(number(args.next(), "show", "a product id")?),
            "buy" => Command::Buy {
                product_id: number(args.next(), "buy", "a product id")?,
                quantity: match args.next() {
                    Some(qty) => parse_number(qty)?,
                    None => 1,
                },
            },
            "qty" => Command::Quantity {
                product_id: number(args.next(), "qty", "a product id")?,
                quantity: number(args.next(), "qty", "a quantity")?,
            },
            "remove" | "rm" => Command::Remove(number(args.next(), "remove", "a product id")?),
            "cart" => Command::Cart,
            "checkout" => Command::Checkout,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

fn number<T: FromStr>(
    arg: Option<&str>,
    command: &'static str,
    what: &'static str,
) -> Result<T, ParseCommandError> {
    match arg {
        Some(arg) => parse_number(arg),
        None => Err(ParseCommandError::Missing { command, what }),
    }
}

fn parse_number<T: FromStr>(arg: &str) -> Result<T, ParseCommandError> {
    arg.parse()
        .map_err(|_| ParseCommandError::InvalidNumber(arg.to_string()))
}

// =============================================================================
// WEBSHOP CONTEXT
// =============================================================================

/// What the event loop should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Everything was already rendered
    Done,
    /// Show this message to the user
    Notice(String),
    /// Leave the loop
    Quit,
}

pub struct Webshop<A: CatalogApi, CV: CatalogView, KV: CartView> {
    pub catalog: CatalogController<A, CV>,
    pub cart: ShoppingCart<KV>,
}

impl<A: CatalogApi, CV: CatalogView, KV: CartView> Webshop<A, CV, KV> {
    pub fn new(catalog: CatalogController<A, CV>, cart: ShoppingCart<KV>) -> Self {
        Self { catalog, cart }
    }

    /// Purchase form on a product card: add a product from the current page.
    ///
    /// Returns false when the product is not on the page or the quantity is
    /// rejected by the cart.
    pub fn purchase(&mut self, product_id: i64, quantity: i32) -> bool {
        match self.catalog.find_product(product_id) {
            Some(product) => {
                self.cart
                    .add_line(product.id, &product.title, quantity, product.price)
            }
            None => {
                warn!(product_id, "Purchase of a product that is not on the current page");
                false
            }
        }
    }

    /// Run one command.
    ///
    /// API failures are returned as errors; the caller alerts the user and
    /// the previous page stays as it was.
    pub async fn dispatch(&mut self, command: Command) -> ShopResult<Reply> {
        match command {
            Command::Search(text) => {
                self.catalog.query_by_name(&text).await?;
            }
            Command::Category(category) => {
                self.catalog.query_by_category(&category).await?;
            }
            Command::Categories => {
                self.catalog.load_categories().await?;
            }
            Command::Page(direction) => {
                self.catalog.goto_relative_page(direction).await?;
            }
            Command::Goto(page_number) => {
                self.catalog.goto_absolute_page(page_number).await?;
            }
            Command::Show(product_id) => {
                if !self.catalog.show_product(product_id) {
                    return Ok(not_on_page(product_id));
                }
            }
            Command::Buy {
                product_id,
                quantity,
            } => {
                if self.catalog.find_product(product_id).is_none() {
                    return Ok(not_on_page(product_id));
                }
                if !self.purchase(product_id, quantity) {
                    return Ok(Reply::Notice(format!("Cannot buy {} of #{}", quantity, product_id)));
                }
            }
            Command::Quantity {
                product_id,
                quantity,
            } => self.cart.apply_quantity_input(product_id, quantity),
            Command::Remove(product_id) => self.cart.remove_line(product_id),
            Command::Cart => self.cart.show(),
            Command::Checkout => {
                return Ok(match self.cart.checkout() {
                    Some(intent) => Reply::Notice(format!(
                        "Order {} recorded, total ${:.2}. Nothing was charged.",
                        intent.id, intent.total
                    )),
                    None => Reply::Notice("Your cart is empty.".to_string()),
                });
            }
            Command::Help => return Ok(Reply::Notice(HELP.to_string())),
            Command::Quit => return Ok(Reply::Quit),
        }

        Ok(Reply::Done)
    }
}

fn not_on_page(product_id: i64) -> Reply {
    Reply::Notice(format!("Product #{} is not on this page", product_id))
}
