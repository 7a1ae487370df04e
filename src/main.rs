use actix_web::{App, HttpServer, web};
use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use tracing::info;

use simpleshortener::{api, config, runtime};

#[derive(Parser, Debug)]
#[command(name = "simpleshortener", about = "JSON-driven URL shortener service")]
struct Args {
    /// Path to the configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let cfg = config::init_config(args.config.as_deref()).context("Failed to load configuration")?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&cfg.log.level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let ctx = runtime::prepare_server_startup().await?;

    let scheduler = runtime::spawn_sync_scheduler(
        ctx.sync.clone(),
        Duration::from_secs(cfg.source.refresh_interval_hours * 3600),
    );

    let bind = (cfg.server.host.clone(), cfg.server.port);
    info!("The web app is ready, listening on {}:{}", bind.0, bind.1);

    let sync = ctx.sync.clone();
    let redirect = ctx.redirect.clone();
    let statistics = ctx.statistics.clone();
    let metrics = ctx.metrics.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(sync.clone()))
            .app_data(web::Data::new(redirect.clone()))
            .app_data(web::Data::new(statistics.clone()))
            .app_data(web::Data::new(metrics.clone()))
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    scheduler.abort();
    Ok(())
}
