// =============================================================================
// STOREFRONT - Main Entry Point
// =============================================================================
// WHAT THIS PROGRAM DOES:
// - Fetches products from a remote catalog API (dummyjson.com by default)
// - Shows them page by page, with search and category filters
// - Keeps a shopping cart for the session and records checkouts locally
// - Optionally exposes Prometheus metrics while it runs
//
// The display goes to stdout, JSON logs go to stderr:
//   RUST_LOG=debug storefront 2> storefront.log
// =============================================================================

use std::io;
use std::num::NonZeroU32;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::api::RestApi;
use storefront::cart::ShoppingCart;
use storefront::catalog::CatalogController;
use storefront::config::Config;
use storefront::handlers;
use storefront::metrics::setup_metrics;
use storefront::shop::{Command, ParseCommandError, Reply, Webshop};
use storefront::view::ConsoleView;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -------------------------------------------------------------------------
    // STEP 1: Load environment variables
    // -------------------------------------------------------------------------
    dotenvy::dotenv().ok(); // .ok() ignores errors (file might not exist)

    // -------------------------------------------------------------------------
    // STEP 2: Initialize logging/tracing
    // -------------------------------------------------------------------------
    // JSON to stderr so the storefront output on stdout stays readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
        .init();

    // -------------------------------------------------------------------------
    // STEP 3: Load configuration
    // -------------------------------------------------------------------------
    let config = Config::from_env()?;
    info!(api_url = %config.api_url, page_size = config.page_size, "Configuration loaded");

    // -------------------------------------------------------------------------
    // STEP 4: Optional metrics endpoint
    // -------------------------------------------------------------------------
    if let Some(port) = config.metrics_port {
        let metrics_handle = setup_metrics()?;
        let addr = format!("0.0.0.0:{}", port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind metrics listener on {}", addr))?;

        info!(address = %addr, "Metrics endpoint is listening");
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, handlers::router(metrics_handle)).await {
                error!(error = %err, "Metrics server stopped");
            }
        });
    }

    // -------------------------------------------------------------------------
    // STEP 5: Build the shop
    // -------------------------------------------------------------------------
    let api = RestApi::new(&config.api_url, &config.api_url_suffix, config.api_timeout)
        .context("Failed to create the catalog API client")?;
    let page_size =
        NonZeroU32::new(config.page_size).context("Page size must be greater than zero")?;

    let mut shop = Webshop::new(
        CatalogController::new(
            api,
            ConsoleView::new(io::stdout(), config.low_stock_threshold),
            page_size,
        ),
        ShoppingCart::new(ConsoleView::new(io::stdout(), config.low_stock_threshold)),
    );

    // First page of the full catalog, like opening the shop's front page
    for command in [Command::Categories, Command::Search(String::new())] {
        if let Err(err) = shop.dispatch(command).await {
            error!(error = %err, "Failed to load the catalog");
            shop.catalog.view_mut().alert(&err.to_string());
        }
    }
    shop.catalog
        .view_mut()
        .line(format_args!("Type 'help' for a list of commands."));

    // -------------------------------------------------------------------------
    // STEP 6: Event loop
    // -------------------------------------------------------------------------
    // One command at a time: each runs to completion (including its fetch)
    // before the next line is read.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(ParseCommandError::Empty) => continue,
            Err(err) => {
                shop.catalog.view_mut().alert(&err.to_string());
                continue;
            }
        };

        match shop.dispatch(command).await {
            Ok(Reply::Done) => {}
            Ok(Reply::Notice(text)) => shop.catalog.view_mut().line(format_args!("{}", text)),
            Ok(Reply::Quit) => break,
            Err(err) => {
                error!(error = %err, "Command failed");
                shop.catalog.view_mut().alert(&err.to_string());
            }
        }
    }

    info!("Storefront closed");
    Ok(())
}
