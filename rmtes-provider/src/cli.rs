use anyhow::{Context, Result, bail};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use rmtes_core::ViewPolicy;

use crate::config;

/// RMTES Provider - публикует один MarketPrice item с многоязычным RMTES-полем.
///
/// Каждое TCP-соединение - отдельный потребитель: логин, одна подписка,
/// затем серия Update с заданным интервалом.
#[derive(Parser, Debug, Clone)]
#[command(name = "rmtes-provider", version, about)]
pub(crate) struct Args {
    /// TCP bind address, например 0.0.0.0:14002
    #[arg(long, default_value = config::BIND_ADDR)]
    pub(crate) bind: SocketAddr,

    /// Таблица языков: строки `Name | text`, поддержка # комментариев.
    /// По умолчанию - встроенная таблица из пяти языков
    #[arg(long)]
    pub(crate) languages_file: Option<PathBuf>,

    /// Сколько Update отправить после Refresh
    #[arg(long, default_value_t = config::UPDATE_COUNT)]
    pub(crate) updates: u64,

    /// Пауза между Update, мс
    #[arg(long, default_value_t = config::UPDATE_INTERVAL_MS)]
    pub(crate) interval_ms: u64,

    /// Сколько dispatch ждёт входящих, мс
    #[arg(long, default_value_t = config::DISPATCH_TIMEOUT_MS)]
    pub(crate) dispatch_timeout_ms: u64,

    /// Фильтровать Refresh/Update по View из запроса
    #[arg(long)]
    pub(crate) enforce_view: bool,
}

impl Args {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.dispatch_timeout_ms == 0 {
            bail!("--dispatch-timeout-ms must be positive");
        }

        if let Some(path) = &self.languages_file {
            let md = std::fs::metadata(path)
                .with_context(|| format!("languages file not found: {:?}", path))?;
            if !md.is_file() {
                bail!("--languages-file must point to a file: {:?}", path);
            }
        }

        Ok(())
    }

    pub(crate) fn view_policy(&self) -> ViewPolicy {
        if self.enforce_view {
            ViewPolicy::Enforce
        } else {
            ViewPolicy::Ignore
        }
    }

    pub(crate) fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub(crate) fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_ms)
    }
}
