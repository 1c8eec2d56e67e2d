use std::net::TcpListener;

use actix_web::web;
use anyhow::Context;
use contact_relay::{email_client::EmailClient, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 遥测初始化
    telemetry::init_subscriber(telemetry::get_subscriber(
        "contact-relay",
        "info",
        std::io::stdout,
    ));

    let config = contact_relay::config::config().context("failed to load config.yaml.")?;
    let listener = TcpListener::bind(config.web.server_address())
        .with_context(|| format!("failed to bind {}.", config.web.server_address()))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    // SMTP配置在启动时校验一次
    let email_client = web::Data::new(
        EmailClient::from_config(&config.email_client)
            .context("failed to build the email client.")?,
    );

    contact_relay::run(listener, email_client)?.await?;
    Ok(())
}
