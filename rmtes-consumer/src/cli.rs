use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;

use crate::config;

/// RMTES Consumer - логин к провайдеру и подписка на один MarketPrice item.
///
/// Refresh/Update/Status печатаются в лог (RUST_LOG=info) с декодированными полями.
#[derive(Parser, Debug, Clone)]
#[command(name = "rmtes-consumer", version, about)]
pub(crate) struct Args {
    /// TCP адрес провайдера, например 127.0.0.1:14002 или host.example.com:14002
    #[arg(long, default_value = config::SERVER_ADDR)]
    pub(crate) server: String,

    /// Имя пользователя для логина
    #[arg(long, default_value = config::USERNAME)]
    pub(crate) username: String,

    /// Сервис item'а
    #[arg(long, default_value = rmtes_core::DEFAULT_SERVICE)]
    pub(crate) service: String,

    /// Имя item'а
    #[arg(long, default_value = rmtes_core::DEFAULT_ITEM)]
    pub(crate) item: String,

    /// View: список fid через запятую, например "22,25,1352". Нельзя вместе с --no-view
    #[arg(long, default_value = config::VIEW_FIDS, conflicts_with = "no_view")]
    pub(crate) view: String,

    /// Запрос без View
    #[arg(long)]
    pub(crate) no_view: bool,

    /// Сколько секунд работать; 0 - пока провайдер не закроет соединение или Ctrl+C
    #[arg(long, default_value_t = 0)]
    pub(crate) run_for_secs: u64,
}

impl Args {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.server.trim().is_empty() {
            bail!("--server is empty");
        }
        if !self.server.contains(':') {
            bail!("--server must look like HOST:PORT (got: {})", self.server);
        }
        if self.username.trim().is_empty() {
            bail!("--username is empty");
        }
        if self.item.trim().is_empty() {
            bail!("--item is empty");
        }

        Ok(())
    }

    pub(crate) fn server_socket_addr(&self) -> std::io::Result<SocketAddr> {
        // Берём первый результат резолвинга
        self.server
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no addresses resolved"))
    }

    pub(crate) fn run_for(&self) -> Option<Duration> {
        (self.run_for_secs > 0).then(|| Duration::from_secs(self.run_for_secs))
    }
}
