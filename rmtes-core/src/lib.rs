//! # rmtes-core
//!
//! Протокол и endpoint'ы для демонстрационной пары RMTES Provider / Consumer.
//!
//! Этот крейт содержит:
//!
//! - [`codec`] - RMTES-кодек (UTF-8 с escape-префиксом) и типы значений полей
//! - [`field_list`], [`element`], [`dictionary`] - контейнеры и словарь полей
//! - [`view`] - View-дескриптор запроса и политика его применения
//! - [`message`] - сообщения (Request/Refresh/Update/Status/...)
//! - [`session`], [`registry`], [`dispatcher`] - состояние и логика провайдера
//! - [`wire`], [`transport`], [`tcp`] - кадры на проводе и транспорты
//! - [`provider`], [`consumer`] - endpoint'ы поверх транспорта
//! - [`scheduler`] - тики для периодических Update
//! - [`error`] - типы ошибок `rmtes-core`
//!
//! ## Быстрый пример: RMTES
//!
//! ```rust
//! use rmtes_core::codec::{decode_rmtes, encode_rmtes};
//!
//! let bytes = encode_rmtes("AB");
//! assert_eq!(bytes, [0x1B, 0x25, 0x30, 0x41, 0x42]);
//! assert_eq!(decode_rmtes(&bytes).unwrap(), "AB");
//! ```
//!
//! ## Пример: провайдер и потребитель в одном процессе
//!
//! ```rust
//! use std::thread;
//! use std::time::Duration;
//!
//! use rmtes_core::{ChannelTransport, OmmConsumer, OmmProvider, ViewPolicy};
//!
//! let (p, c) = ChannelTransport::pair();
//! let provider = thread::spawn(move || {
//!     let mut provider = OmmProvider::new(p, ViewPolicy::Ignore);
//!     provider.dispatch(Duration::from_secs(1)).unwrap();
//!     provider.session_state()
//! });
//!
//! let consumer = OmmConsumer::connect(c, "user", Duration::from_secs(1)).unwrap();
//! assert_eq!(consumer.login_refresh().state.text, "Login accepted");
//! provider.join().unwrap();
//! ```
//!
//! ## Дизайн
//!
//! Всё синхронное: потоки, crossbeam-каналы, блокирующие сокеты.
//! Ошибки протокола не роняют соединение, а уходят пиру как Status;
//! соединение завершают только ошибки транспорта.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// RMTES-кодек и значения полей.
pub mod codec;

/// Словарь полей (fid -> имя, тип) и enum-таблицы.
pub mod dictionary;

/// Element list (атрибуты и payload запроса).
pub mod element;

/// Field list (payload Refresh/Update).
pub mod field_list;

/// View: какие поля нужны потребителю.
pub mod view;

/// Сообщения протокола.
pub mod message;

/// Состояние логин-сессии.
pub mod session;

/// Реестр подписок провайдера.
pub mod registry;

/// Демонстрационный payload MarketPrice.
pub mod payload;

/// Таблица языков для RMTES-поля.
pub mod languages;

/// Маршрутизация запросов и ответов.
pub mod dispatcher;

/// Кадры на проводе.
pub mod wire;

/// Абстракция транспорта и in-process реализация.
pub mod transport;

/// TCP-транспорт.
pub mod tcp;

/// Периодические тики.
pub mod scheduler;

/// Endpoint провайдера.
pub mod provider;

/// Endpoint потребителя.
pub mod consumer;

/// Ошибки `rmtes-core`.
pub mod error;

/// Общие константы
mod constants;
pub use constants::{
    DEFAULT_DISPATCH_TIMEOUT, DEFAULT_ITEM, DEFAULT_PORT, DEFAULT_SERVICE, LOGIN_TIMEOUT,
};

// --- Re-exports (публичный фасад API) ---

pub use crate::codec::{FieldData, decode_rmtes, encode_rmtes};
pub use crate::consumer::OmmConsumer;
pub use crate::dictionary::FieldDictionary;
pub use crate::dispatcher::ConsumerClient;
pub use crate::error::{CoreError, ProtocolError, TransportError, WireError};
pub use crate::field_list::FieldList;
pub use crate::message::{DomainType, Envelope, Handle, Msg, ReqMsg};
pub use crate::provider::OmmProvider;
pub use crate::tcp::TcpTransport;
pub use crate::transport::{ChannelTransport, Transport};
pub use crate::view::{ViewDescriptor, ViewPolicy};
