use thiserror::Error;

use crate::message::{DomainType, Handle};

/// Верхнеуровневый тип ошибок крейта
#[derive(Debug, Error)]
pub enum CoreError {
    /// Ошибки протокола
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Ошибки сериализации
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Ошибки транспорта
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Ошибки протокола.
///
/// Все варианты восстанавливаются локально: провайдер превращает их
/// в Status-сообщение для запросившей стороны.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Уже есть активная подписка (ёмкость реестра = 1)
    #[error("item capacity exceeded")]
    CapacityExceeded,

    /// Домен запроса не поддерживается
    #[error("unknown domain: {0}")]
    UnknownDomain(DomainType),

    /// Handle не совпадает с активной подпиской
    #[error("unknown handle: {0}")]
    UnknownHandle(Handle),

    /// Неверная RMTES-строка
    #[error("malformed encoding: {0}")]
    MalformedEncoding(MalformedReason),

    /// Запрос до логина
    #[error("login required")]
    NotLoggedIn,

    /// Сессия уже закрыта
    #[error("session closed")]
    SessionClosed,

    /// Не удалось разобрать View
    #[error("invalid view: {0}")]
    InvalidView(String),
}

/// Почему RMTES-буфер не декодируется
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedReason {
    /// Нет escape-префикса `1B 25 30`
    #[error("missing escape prefix")]
    MissingPrefix,

    /// Хвост после префикса не UTF-8
    #[error("invalid utf-8 after prefix at byte {0}")]
    InvalidUtf8(usize),
}

/// Ошибки сериализации
#[derive(Debug, Error)]
pub enum WireError {
    /// Пакет слишком короткий (не соотв. заявленной длине)
    #[error("frame too short")]
    FrameTooShort,

    /// Заявленная длина больше допустимой
    #[error("frame too long: {0} bytes")]
    FrameTooLong(usize),

    /// Неверная версия протокола
    #[error("unsupported wire version: {0}")]
    UnsupportedWireVersion(u8),

    /// Ошибка сериализации/десериализации
    #[error("postcard encode/decode error: {0}")]
    Postcard(#[from] postcard::Error),
}

/// Ошибки транспорта. Только они завершают endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O сокета
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Битый кадр от пира
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Пир закрыл соединение
    #[error("peer disconnected")]
    Disconnected,

    /// Не дождались ответа на логин
    #[error("login timed out")]
    LoginTimeout,

    /// Провайдер отклонил логин
    #[error("login rejected: {0}")]
    LoginRejected(String),
}
