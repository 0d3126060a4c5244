//! Show how common failures are classified.
//!
//! Usage:
//!   `cargo run --example compare_errors`

use areq::{CompatKind, ErrorCategory, RequestOptions};
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cases = [
        ("not-a-valid-url", RequestOptions::new()),
        ("ftp://example.com/file", RequestOptions::new()),
        ("http://127.0.0.1:1/", RequestOptions::new()),
        (
            "http://10.255.255.1/",
            RequestOptions::new().connect_timeout(Duration::from_millis(300)),
        ),
    ];

    for (url, options) in cases {
        match areq::get(url, options).await {
            Ok(response) => println!("{url}: {response}"),
            Err(err) => {
                println!("{url}: {:?} ({})", err.category(), err.underlying().kind());
                println!("  message:          {err}");
                println!("  RequestException: {}", err.is_compat(CompatKind::RequestException));
                println!("  ConnectionError:  {}", err.is_compat(CompatKind::ConnectionError));
                println!("  Timeout:          {}", err.is(ErrorCategory::Timeout));
                println!("  InvalidURL:       {}", err.is_compat(CompatKind::InvalidUrl));
            }
        }
    }
}
