//! Demo binary: streams Binance klines and logs level draw commands.

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use prevlevels::config::Config;
use prevlevels::levels::{LevelEngine, Timeframe, TzSessionZone};
use prevlevels::market::{BarSubscription, fetch_history, new_binance_client};
use prevlevels::overlay::{DrawCommand, OverlayObject, OverlayState, build_layout};

const CONFIG_PATH: &str = "config.toml";

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = if Path::new(CONFIG_PATH).exists() {
        Config::load(CONFIG_PATH).context("loading config.toml")?
    } else {
        Config::default()
    };

    let zone = config.session_zone()?;
    let engine = LevelEngine::new(config.levels.day_start_hour, TzSessionZone::new(zone))
        .with_value_logging(config.levels.log_values);

    let symbol = config.feed.symbol.clone();
    let primary_timeframe = config.feed.timeframe;

    info!(%symbol, timeframe = %primary_timeframe, "starting previous-level tracker");

    let mut primary = fetch_history(&symbol, primary_timeframe, config.feed.history_bars)
        .await
        .context("backfilling primary series")?;
    let mut hourly = fetch_history(&symbol, Timeframe::H1, config.feed.history_bars)
        .await
        .context("backfilling hourly series")?;

    info!(
        primary_bars = primary.len(),
        hourly_bars = hourly.len(),
        "history loaded"
    );

    let mut client = new_binance_client();
    let mut updates = client.connect().await?;

    client
        .subscribe(BarSubscription::new(&symbol, primary_timeframe))
        .await?;
    if primary_timeframe != Timeframe::H1 {
        client
            .subscribe(BarSubscription::new(&symbol, Timeframe::H1))
            .await?;
    }

    let mut overlay = OverlayState::new();

    while let Some(update) = updates.recv().await {
        if !update.symbol.eq_ignore_ascii_case(&symbol) {
            continue;
        }

        // Forming bars keep the series current; apply routes by timeframe.
        if update.timeframe == primary_timeframe {
            primary.apply(update.bar);
        }
        if update.timeframe == Timeframe::H1 {
            hourly.apply(update.bar);
        }

        // Redraw on closed primary bars only.
        if !(update.is_closed && update.timeframe == primary_timeframe) {
            continue;
        }

        // A closed bar's window rolls over at its close, not its open.
        let now = update.bar.get_open_time()
            + chrono::Duration::seconds(primary_timeframe.to_seconds() as i64);
        let evaluation = engine.evaluate(now, &primary, &hourly);
        let layout = build_layout(&evaluation, &primary, &hourly, &config);

        for command in overlay.apply(layout) {
            log_command(&command);
        }
    }

    warn!("update stream ended");

    Ok(())
}

/// Stands in for a chart renderer: one log line per draw command.
fn log_command(command: &DrawCommand) {
    match command {
        DrawCommand::Upsert { key, object } => match object {
            OverlayObject::Segment { price, start, end, .. } => {
                info!(?key, price, start = %start, end = %end, "draw segment");
            }
            OverlayObject::Text { content, price, .. } => {
                info!(?key, %content, price, "draw label");
            }
            OverlayObject::VerticalLine { at, .. } => {
                info!(?key, at = %at, "draw marker");
            }
            OverlayObject::ScreenText { content, .. } => {
                for line in content.lines() {
                    info!(?key, line, "dashboard");
                }
            }
        },
        DrawCommand::Remove { key } => {
            info!(?key, "remove");
        }
    }
}
