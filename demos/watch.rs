use liveprops::{InboundMessage, LiveClient, LiveClientOptions};

/// Logs every live property update from a running server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let page_url =
        std::env::var("LIVEPROPS_PAGE_URL").unwrap_or_else(|_| "http://localhost:5096/".to_string());

    println!("📡 Watching live properties of: {}\n", page_url);

    let client = LiveClient::new(&page_url, LiveClientOptions::default())?;
    println!("🔑 Session identity: {}", client.identity());
    println!("🔌 Socket address: {}\n", client.endpoint_url()?);

    client.register("status", |message: &InboundMessage| {
        println!("🚪 status = {}", message.value().unwrap_or(&serde_json::Value::Null));
    });
    client.register("*", |message: &InboundMessage| {
        println!(
            "📦 {} = {}",
            message.property().unwrap_or("?"),
            message.value().unwrap_or(&serde_json::Value::Null)
        );
    });

    if let Err(e) = client.start().await {
        println!("⚠️  First connection attempt failed ({}), retrying in the background", e);
    }

    tokio::signal::ctrl_c().await?;

    println!("\nDisconnecting...");
    client.disconnect().await?;
    println!("Disconnected!");

    Ok(())
}
