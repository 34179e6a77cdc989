use anime_proxy::{ProxyClient, ProxyConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let client = ProxyClient::new("https://api.jikan.moe/v4", ProxyConfig::default());

    // Three concurrent requests for the same key share one upstream call
    println!("=== Concurrent requests ===");
    let key = "/seasons/now?limit=24";
    let start = std::time::Instant::now();
    let (a, b, c) = tokio::join!(client.fetch(key), client.fetch(key), client.fetch(key));
    println!("Three requests took: {:?}", start.elapsed());

    let a = a?;
    let b = b?;
    let c = c?;
    let shared = Arc::ptr_eq(&a, &b) && Arc::ptr_eq(&b, &c);
    println!("All three share one response: {}", shared);

    // Distinct keys are spaced by the rate governor
    println!("\n=== Distinct keys ===");
    let start = std::time::Instant::now();
    let (top, search) = tokio::join!(
        client.fetch("/top/anime?filter=airing&limit=24"),
        client.fetch("/anime?q=frieren&limit=24")
    );
    println!("Two upstream calls took: {:?}", start.elapsed());
    println!("Top airing ok: {}, search ok: {}", top.is_ok(), search.is_ok());

    // Cached request
    let start = std::time::Instant::now();
    let cached = client.fetch(key).await?;
    println!("\nCached request took: {:?}", start.elapsed());
    println!("Served the stored response: {}", Arc::ptr_eq(&a, &cached));
    println!("Cache stats: {:?}", client.cache_stats());

    Ok(())
}
