use std::time::Duration;

/// Порт провайдера по умолчанию
pub const DEFAULT_PORT: u16 = 14002;

/// Сервис, под которым публикуется item
pub const DEFAULT_SERVICE: &str = "DIRECT_FEED";

/// Item по умолчанию
pub const DEFAULT_ITEM: &str = "/LSEG.L";

/// Сколько один вызов dispatch ждёт входящих
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(1);

/// Сколько потребитель ждёт ответа на логин
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(5);
