//! Relay one translation through the configured proxy pool.
//!
//! ```text
//! PROXY_FILE=proxies.txt cargo run --example relay -- "Guten Morgen" en
//! ```

use deeplx_proxy_pool::{DeepLxClient, ProxyPool, ProxyPoolConfig, RetryBudget, RetryOrchestrator, TranslateRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let text = args.next().ok_or("usage: relay <text> [target_lang] [max_retry]")?;
    let target_lang = args.next().unwrap_or_else(|| "en".to_string());
    let max_retry: i64 = match args.next() {
        Some(value) => value.parse()?,
        None => 10,
    };

    let config = ProxyPoolConfig::from_env()?;
    let pool = ProxyPool::from_config(&config).await?;
    let (total, working) = pool.get_stats();
    println!("Proxy pool ready: {}/{} working", working, total);

    let client = DeepLxClient::from_config(&config)?;
    let orchestrator = RetryOrchestrator::new(pool, client);

    let request = TranslateRequest::new(text, "auto", target_lang)
        .retry_budget(RetryBudget::try_from(max_retry)?);

    let translation = orchestrator.run(&request).await?;
    println!("{}", translation.text);
    for alternative in &translation.alternatives {
        println!("  alt: {}", alternative);
    }

    Ok(())
}
