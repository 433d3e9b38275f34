use linode::{Config, Filters, LinodeSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;

    let level = if config.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    tracing::info!("Using endpoint {}", config.endpoint);
    let session = LinodeSession::from_config(&config)?;

    for datacenter in session.datacenters().all(Filters::new()).await? {
        println!(
            "datacenter {:>4}  {}",
            datacenter.id()?.unwrap_or_default(),
            datacenter.location()?.unwrap_or_default()
        );
    }

    for node in session.linodes().all(Filters::new()).await? {
        println!(
            "linode     {:>8}  {:<24}  status={}",
            node.id()?.unwrap_or_default(),
            node.label()?.unwrap_or_default(),
            node.status()?.unwrap_or_default()
        );
    }

    Ok(())
}
