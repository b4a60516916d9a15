//! Точка входа `rmtes-provider`.
//!
//! Жизненный цикл:
//! - парсинг CLI и загрузка таблицы языков
//! - TCP listener; на каждое соединение свой поток и свой провайдер
//! - в соединении: логин, одна подписка, Refresh и серия Update
//! - корректная остановка по `Ctrl+C`

mod cli;
mod config;
mod generator;
mod languages;
mod server;

use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};

use clap::Parser;
use log::info;

fn main() -> anyhow::Result<()> {
    // Логи через RUST_LOG=info/debug
    env_logger::init();

    let shutdown = Arc::new(AtomicBool::new(false));

    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
            info!("shutting down...");
        })?;
    }

    let args = cli::Args::parse();
    args.validate()?;

    let languages = languages::load_languages(args.languages_file.as_deref())?;

    let cfg = server::FeedConfig {
        view_policy: args.view_policy(),
        updates: args.updates,
        interval: args.interval(),
        dispatch_timeout: args.dispatch_timeout(),
    };

    let listener = server::bind_listener(args.bind)?;
    info!(
        "Starting rmtes-provider: bind={}, languages={}, updates={}, interval={:?}, view={:?}",
        listener.local_addr()?,
        languages.len(),
        cfg.updates,
        cfg.interval,
        cfg.view_policy
    );

    server::run_listener(listener, Arc::new(languages), cfg, shutdown)?;

    Ok(())
}
