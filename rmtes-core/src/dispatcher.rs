//! Маршрутизация сообщений.
//!
//! Провайдер: запрос -> обработчик по домену (таблица [`route`]); ошибка
//! обработчика превращается в Status и уходит обратно запросившему.
//! Потребитель: ответ -> метод [`ConsumerClient`] по виду сообщения.

use log::{debug, warn};

use crate::error::ProtocolError;
use crate::message::{
    AckMsg, DomainType, Envelope, GenericMsg, Handle, Msg, RefreshMsg, ReqMsg, StatusCode,
    StatusMsg, UpdateMsg,
};
use crate::registry::ItemRegistry;
use crate::session::Session;
use crate::view::ViewPolicy;

/// Обработчик запроса одного домена
pub type RequestHandler = fn(&mut ProviderState, Handle, &ReqMsg) -> Result<Msg, ProtocolError>;

/// Состояние провайдера для одного соединения
#[derive(Debug, Default)]
pub struct ProviderState {
    /// Логин-сессия
    pub session: Session,
    /// Подписки
    pub registry: ItemRegistry,
}

impl ProviderState {
    /// Новое состояние: без логина, слот пуст
    pub fn new(view_policy: ViewPolicy) -> Self {
        Self {
            session: Session::new(),
            registry: ItemRegistry::new(view_policy),
        }
    }

    /// Обрабатывает входящее сообщение, возвращает ответ (если он нужен).
    ///
    /// Ошибки протокола сюда не пробрасываются наружу: каждая становится Status.
    pub fn on_message(&mut self, env: &Envelope) -> Option<Envelope> {
        match &env.msg {
            Msg::Request(req) => {
                let handler = route(req.domain);
                let reply = handler(self, env.handle, req).unwrap_or_else(|e| {
                    warn!("request {} ({}) rejected: {e}", env.handle, req.domain);
                    Msg::Status(rejection(&e, req))
                });
                Some(Envelope::new(env.handle, reply))
            }
            Msg::Close(close) if close.domain == DomainType::Login => {
                self.session.close();
                None
            }
            Msg::Close(close) => {
                // отписки нет: слот живёт до конца процесса
                debug!("close for {} ({}) ignored", env.handle, close.domain);
                None
            }
            Msg::Generic(_) | Msg::Post(_) => {
                debug!("{} on {} ignored", env.msg.kind(), env.handle);
                None
            }
            Msg::Refresh(_) | Msg::Update(_) | Msg::Status(_) | Msg::Ack(_) => {
                warn!("unexpected {} from consumer on {}", env.msg.kind(), env.handle);
                None
            }
        }
    }
}

/// Таблица обработчиков по домену
pub fn route(domain: DomainType) -> RequestHandler {
    match domain {
        DomainType::Login => handle_login,
        DomainType::MarketPrice => handle_market_price,
        _ => reject_domain,
    }
}

fn handle_login(state: &mut ProviderState, _handle: Handle, req: &ReqMsg) -> Result<Msg, ProtocolError> {
    state.session.login(req).map(Msg::Refresh)
}

fn handle_market_price(
    state: &mut ProviderState,
    handle: Handle,
    req: &ReqMsg,
) -> Result<Msg, ProtocolError> {
    state.session.ensure_logged_in()?;
    state.registry.request_item(handle, req).map(Msg::Refresh)
}

// неизвестный домен - NotFound в любом состоянии сессии
fn reject_domain(_state: &mut ProviderState, _handle: Handle, req: &ReqMsg) -> Result<Msg, ProtocolError> {
    Err(ProtocolError::UnknownDomain(req.domain))
}

/// Status-отказ для ошибки протокола
pub fn rejection(err: &ProtocolError, req: &ReqMsg) -> StatusMsg {
    match err {
        ProtocolError::CapacityExceeded
        | ProtocolError::UnknownDomain(_)
        | ProtocolError::UnknownHandle(_) => {
            StatusMsg::reject(req, StatusCode::NotFound, "Item not found")
        }
        ProtocolError::NotLoggedIn => StatusMsg::reject(req, StatusCode::NotEntitled, "Login required"),
        ProtocolError::SessionClosed => StatusMsg::reject(req, StatusCode::NotEntitled, "Session closed"),
        ProtocolError::InvalidView(_) | ProtocolError::MalformedEncoding(_) => {
            StatusMsg::reject(req, StatusCode::InvalidArgument, err.to_string())
        }
    }
}

/// Обработчик ответов на стороне потребителя
pub trait ConsumerClient {
    /// Полный снимок
    fn on_refresh(&mut self, handle: Handle, msg: &RefreshMsg);

    /// Инкрементальное обновление
    fn on_update(&mut self, handle: Handle, msg: &UpdateMsg);

    /// Смена состояния потока
    fn on_status(&mut self, handle: Handle, msg: &StatusMsg);

    /// Generic; по умолчанию игнорируется
    fn on_generic(&mut self, _handle: Handle, _msg: &GenericMsg) {}

    /// Подтверждение Post; по умолчанию игнорируется
    fn on_ack(&mut self, _handle: Handle, _msg: &AckMsg) {}
}

/// Передаёт ответ клиенту. `false`, если сообщение не для потребителя.
pub fn dispatch_response<C: ConsumerClient + ?Sized>(client: &mut C, env: &Envelope) -> bool {
    match &env.msg {
        Msg::Refresh(m) => client.on_refresh(env.handle, m),
        Msg::Update(m) => client.on_update(env.handle, m),
        Msg::Status(m) => client.on_status(env.handle, m),
        Msg::Generic(m) => client.on_generic(env.handle, m),
        Msg::Ack(m) => client.on_ack(env.handle, m),
        Msg::Request(_) | Msg::Close(_) | Msg::Post(_) => {
            debug!("{} is not a response, dropped", env.msg.kind());
            return false;
        }
    }
    true
}
