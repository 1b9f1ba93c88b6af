//! Reads exchange REST responses the way a client library would: check for
//! an error object first, then pull typed fields out of the payload without
//! building a tree.
//!
//! Prices arrive as quoted decimal strings, so they are converted from the
//! raw string text.
//!
//! Run with
//!
//! ```bash
//! cargo run -p flatjson --example ticker
//! ```

use flatjson::{Document, ParseError};

const TICKERS: &str = r#"[
  {"symbol":"BNBBTC","priceChange":"-94.99999800","priceChangePercent":"-95.960",
   "lastPrice":"4.00000200","volume":"8913.30000000","count":76},
  {"symbol":"ETHBTC","priceChange":"0.00012300","priceChangePercent":"0.245",
   "lastPrice":"0.05033100","volume":"102367.12100000","count":1893}
]"#;

const ERROR_REPLY: &str = r#"{"code":-1121,"msg":"Invalid symbol."}"#;

const TRUNCATED: &str = r#"[{"symbol":"BNBBTC","lastPrice":"4.0"#;

#[derive(Debug)]
struct Ticker<'a> {
    symbol: &'a str,
    last_price: f64,
    change_percent: f64,
    trades: u64,
}

#[derive(Debug)]
enum ReplyError {
    Parse(ParseError),
    Api { code: i32, msg: String },
}

fn read_tickers(body: &str) -> Result<Vec<Ticker<'_>>, ReplyError> {
    let mut doc = Document::new();
    doc.load(body.as_bytes()).map_err(ReplyError::Parse)?;

    if doc.is_object() && doc.contains("code") {
        return Err(ReplyError::Api {
            code: doc.get("code").and_then(|c| c.to_int().ok()).unwrap_or_default(),
            msg: doc.get("msg").and_then(|m| m.to_string_value().ok()).unwrap_or_default(),
        });
    }

    let tickers = doc
        .children()
        .filter_map(|t| {
            Some(Ticker {
                symbol: t.get("symbol")?.to_str().ok()?,
                last_price: t.get("lastPrice")?.to_double().ok()?,
                change_percent: t.get("priceChangePercent")?.to_double().ok()?,
                trades: t.get("count")?.to_uint64().ok()?,
            })
        })
        .collect();
    Ok(tickers)
}

fn main() {
    for (name, body) in [("tickers", TICKERS), ("error", ERROR_REPLY), ("truncated", TRUNCATED)] {
        match read_tickers(body) {
            Ok(tickers) => {
                println!("{name}: {} tickers", tickers.len());
                for t in tickers {
                    println!(
                        "  {:<8} last={:<12} change={:>8}% trades={}",
                        t.symbol, t.last_price, t.change_percent, t.trades
                    );
                }
            }
            Err(ReplyError::Api { code, msg }) => println!("{name}: api error {code}: {msg}"),
            Err(ReplyError::Parse(err)) => println!("{name}: {err} ({})", err.code.as_str()),
        }
    }

    let doc = flatjson::parse_str(TICKERS);
    println!("\nfirst ticker, pretty:\n{}", doc.at_index(0).map(|t| t.dump(2)).unwrap_or_default());
}
