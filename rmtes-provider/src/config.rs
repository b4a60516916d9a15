use std::time::Duration;

pub(crate) const DEFAULT_LANGUAGES: &str = include_str!("../assets/languages.txt");

pub(crate) const BIND_ADDR: &str = "0.0.0.0:14002";

/// Сколько Update отправить по item'у
pub(crate) const UPDATE_COUNT: u64 = 60;

/// Пауза между Update, мс
pub(crate) const UPDATE_INTERVAL_MS: u64 = 1000;

/// Ожидание входящих в одном dispatch, мс
pub(crate) const DISPATCH_TIMEOUT_MS: u64 = rmtes_core::DEFAULT_DISPATCH_TIMEOUT.as_millis() as u64;

/// Пауза accept-цикла, когда новых соединений нет
pub(crate) const ACCEPT_POLL: Duration = Duration::from_millis(50);

pub(crate) type ConnId = u64;
