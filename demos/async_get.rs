//! Fetch a URL through areq and print what came back.
//!
//! Usage:
//!   `cargo run --example async_get -- https://httpbin.org/get`

use areq::RequestOptions;
use futures::future::join_all;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "areq=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let urls: Vec<String> = std::env::args().skip(1).collect();
    let urls = if urls.is_empty() {
        vec!["https://httpbin.org/get".to_string()]
    } else {
        urls
    };

    // Each call opens its own transport, so they can run side by side.
    let responses = join_all(urls.iter().map(|url| areq::get(url, RequestOptions::new()))).await;

    for (url, result) in urls.iter().zip(responses) {
        let response = result?;
        println!("{url} -> {response} {}", response.reason());
        for (name, value) in response.headers().iter() {
            println!("  {name}: {value}");
        }
        println!("{}", response.text());
    }

    Ok(())
}
