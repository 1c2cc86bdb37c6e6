//! Keyword competitor report
//!
//! Usage: cargo run --example keyword_report -- "<keyword>" [target-domain ...]
//!
//! Reads `DATAFORSEO_LOGIN` / `DATAFORSEO_PASSWORD` from the environment or a
//! `.env` file. Set `RUST_LOG=shopping_serp=debug` to watch the poll loop.

use shopping_serp::analysis::{analyze_competitors, domain_stats, title_quality_score};
use shopping_serp::normalize::parse_shopping_results;
use shopping_serp::{ClientConfig, SearchRequest, ShoppingClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(keyword) = args.next() else {
        eprintln!("usage: keyword_report <keyword> [target-domain ...]");
        std::process::exit(2);
    };
    let targets: Vec<String> = args.collect();

    let location_code: i64 = std::env::var("LOCATION_CODE")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(2826);
    let depth: u32 = std::env::var("DEPTH")
        .ok()
        .and_then(|d| d.parse().ok())
        .unwrap_or(50);

    let client = ShoppingClient::from_env(ClientConfig::default())?;
    let request = SearchRequest {
        location_code,
        depth,
        ..SearchRequest::new(keyword.as_str())
    };

    println!("Searching '{keyword}' (location {location_code}, depth {depth})");
    let on_tick = |elapsed: u64, max: u64| eprintln!("  still waiting… {elapsed}s / {max}s");
    let payload = client.search_products(&request, Some(&on_tick)).await?;

    let rows = parse_shopping_results(&payload);
    let Some(analysis) = analyze_competitors(&rows, &targets) else {
        println!("No results found.");
        println!("{}", serde_json::to_string_pretty(payload.raw())?);
        return Ok(());
    };

    println!();
    println!("Total products: {}", analysis.total_products);
    println!("Unique domains: {}", analysis.unique_domains);
    if let Some(avg) = analysis.avg_price {
        println!("Avg price:      {avg:.2}");
    }
    if let (Some(min), Some(max)) = (analysis.price_range.min, analysis.price_range.max) {
        println!("Price range:    {min:.0} – {max:.0}");
    }

    println!();
    println!("Top 10 products");
    for row in rows.iter().take(10) {
        println!(
            "  {:>3}  {:<60}  {:<24}  {}",
            row.position.map(|p| p.to_string()).unwrap_or_default(),
            row.title.as_deref().unwrap_or_default(),
            row.domain.as_deref().unwrap_or_default(),
            row.price.map(|p| format!("{p:.2}")).unwrap_or_default(),
        );
    }

    println!();
    println!("Domains");
    for stats in domain_stats(&rows).iter().take(10) {
        println!(
            "  {:<28} appearances {:>2}  avg pos {:>5}  best {:>3}",
            stats.domain,
            stats.appearances,
            stats
                .avg_position
                .map(|p| format!("{p:.1}"))
                .unwrap_or_default(),
            stats
                .best_position
                .map(|p| p.to_string())
                .unwrap_or_default(),
        );
    }

    for report in &analysis.target_domains {
        println!();
        println!("Target {}: {} appearances", report.domain, report.appearances);
        for row in &report.products {
            let title = row.title.as_deref().unwrap_or_default();
            println!(
                "  #{:<3} [{:>3}] {title}",
                row.position.map(|p| p.to_string()).unwrap_or_default(),
                title_quality_score(title),
            );
        }
    }

    Ok(())
}
