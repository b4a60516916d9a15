//! Точка входа `rmtes-consumer`.
//!
//! Жизненный цикл:
//! - парсинг CLI и разбор View
//! - TCP-соединение и логин (ждём Refresh на логин-поток)
//! - запрос item'а с View; Refresh/Update/Status печатаются в лог
//! - остановка по `Ctrl+C`, по `--run-for-secs` или когда провайдер закрыл соединение

mod cli;
mod config;
mod display;
mod session;
mod view;

use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use rmtes_core::{FieldDictionary, OmmConsumer, ReqMsg, TcpTransport};

fn main() -> anyhow::Result<()> {
    // Логи через RUST_LOG=info/debug
    env_logger::init();

    let shutdown = Arc::new(AtomicBool::new(false));

    // Ctrl+C => ставим shutdown=true
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
            info!("shutting down...");
        })?;
    }

    let args = cli::Args::parse();
    args.validate()?;

    let view = view::load_view(&args)?;

    info!(
        "Starting rmtes-consumer: server={}, user={}, item={} / {}, view={}",
        args.server,
        args.username,
        args.service,
        args.item,
        if view.is_some() { args.view.as_str() } else { "none" }
    );

    let addr = args.server_socket_addr()?;
    let transport = TcpTransport::connect(addr, config::CONNECT_TIMEOUT)
        .with_context(|| format!("connect to {addr}"))?;
    let mut consumer = OmmConsumer::connect(transport, &args.username, rmtes_core::LOGIN_TIMEOUT)
        .context("login")?;

    let mut req = ReqMsg::market_price(args.item.as_str(), args.service.as_str());
    if let Some(v) = &view {
        req = req.with_view(v);
    }

    let client = display::DisplayClient::new(FieldDictionary::market_price());
    let (handle, reason) = session::run_subscription(
        &mut consumer,
        req,
        Box::new(client),
        config::DISPATCH_TICK,
        args.run_for(),
        &shutdown,
    )?;
    info!("stopping: {reason:?}");

    if reason != session::StopReason::ProviderClosed {
        if let Err(e) = consumer.close(handle).and_then(|()| consumer.logout()) {
            warn!("failed to close streams: {e}");
        }
    }

    Ok(())
}
