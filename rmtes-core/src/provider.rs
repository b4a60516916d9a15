//! Endpoint провайдера: транспорт + состояние одного соединения.

use std::time::Duration;

use log::{debug, trace};

use crate::dispatcher::ProviderState;
use crate::error::{CoreError, TransportError};
use crate::field_list::FieldList;
use crate::message::{Envelope, Handle, Msg};
use crate::session::SessionState;
use crate::transport::Transport;
use crate::view::ViewPolicy;

/// Провайдер, обслуживающий одного потребителя.
///
/// Весь ввод обрабатывается в потоке, который вызывает [`OmmProvider::dispatch`];
/// ответы отправляются оттуда же, до возврата из вызова.
pub struct OmmProvider<T: Transport> {
    transport: T,
    state: ProviderState,
}

impl<T: Transport> OmmProvider<T> {
    /// Новый провайдер: сессия без логина, пустой реестр
    pub fn new(transport: T, view_policy: ViewPolicy) -> Self {
        Self::with_state(transport, ProviderState::new(view_policy))
    }

    /// Со своим состоянием (например, с другим языком Refresh)
    pub fn with_state(transport: T, state: ProviderState) -> Self {
        Self { transport, state }
    }

    /// Обработать входящие: ждать первое не дольше `timeout`, затем
    /// забрать всё, что уже пришло.
    ///
    /// Возвращает число обработанных сообщений. Ошибки протокола сюда не
    /// доходят (они уходят пиру как Status), ошибка транспорта - конец соединения.
    pub fn dispatch(&mut self, timeout: Duration) -> Result<usize, TransportError> {
        let Some(first) = self.transport.recv_timeout(timeout)? else {
            return Ok(0);
        };

        let mut count = 0;
        let mut next = Some(first);
        while let Some(env) = next {
            trace!("<- {} on {}", env.msg.kind(), env.handle);
            if let Some(reply) = self.state.on_message(&env) {
                trace!("-> {} on {}", reply.msg.kind(), reply.handle);
                self.transport.submit(&reply)?;
            }
            count += 1;
            next = self.transport.try_recv()?;
        }

        Ok(count)
    }

    /// Отправить сообщение в поток `handle`
    pub fn submit(&mut self, handle: Handle, msg: Msg) -> Result<(), TransportError> {
        self.transport.submit(&Envelope::new(handle, msg))
    }

    /// Handle активной подписки
    pub fn item_handle(&self) -> Option<Handle> {
        self.state.registry.active().map(|s| s.handle)
    }

    /// Отправить Update в поток `handle`; он должен быть активной подпиской,
    /// а сессия - в `LoggedIn`
    pub fn emit_update(&mut self, handle: Handle, fields: &FieldList) -> Result<(), CoreError> {
        self.state.session.ensure_logged_in()?;
        let update = self.state.registry.emit_update(handle, fields)?;
        debug!("update on {handle}: {} fields", update.payload.len());
        self.submit(handle, Msg::Update(update))?;
        Ok(())
    }

    /// Состояние логин-сессии
    pub fn session_state(&self) -> SessionState {
        self.state.session.state()
    }

    /// Сессия и реестр целиком
    pub fn state(&self) -> &ProviderState {
        &self.state
    }

    /// Транспорт (например, чтобы узнать адрес пира)
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Exponent;
    use crate::error::ProtocolError;
    use crate::message::{CloseMsg, DomainType, ReqMsg};
    use crate::payload::FID_BID;
    use crate::transport::ChannelTransport;

    fn recv(t: &mut ChannelTransport) -> Envelope {
        t.recv_timeout(Duration::from_secs(1)).unwrap().unwrap()
    }

    #[test]
    fn dispatch_drains_queued_requests_and_replies_in_order() {
        let (p, mut c) = ChannelTransport::pair();
        let mut provider = OmmProvider::new(p, ViewPolicy::Ignore);

        c.submit(&Envelope::new(Handle::LOGIN, Msg::Request(ReqMsg::login("user"))))
            .unwrap();
        c.submit(&Envelope::new(
            Handle(2),
            Msg::Request(ReqMsg::market_price("/LSEG.L", "DIRECT_FEED")),
        ))
        .unwrap();

        assert_eq!(provider.dispatch(Duration::from_millis(100)).unwrap(), 2);
        assert_eq!(provider.session_state(), SessionState::LoggedIn);
        assert_eq!(provider.item_handle(), Some(Handle(2)));

        assert_eq!(recv(&mut c).handle, Handle::LOGIN);
        assert!(matches!(recv(&mut c).msg, Msg::Refresh(_)));
    }

    #[test]
    fn dispatch_timeout_processes_nothing() {
        let (p, _c) = ChannelTransport::pair();
        let mut provider = OmmProvider::new(p, ViewPolicy::Ignore);
        assert_eq!(provider.dispatch(Duration::from_millis(10)).unwrap(), 0);
    }

    #[test]
    fn dispatch_fails_when_consumer_is_gone() {
        let (p, c) = ChannelTransport::pair();
        let mut provider = OmmProvider::new(p, ViewPolicy::Ignore);
        drop(c);

        assert!(matches!(
            provider.dispatch(Duration::from_millis(10)),
            Err(TransportError::Disconnected)
        ));
    }

    #[test]
    fn emit_update_needs_an_active_item() {
        let (p, mut c) = ChannelTransport::pair();
        let mut provider = OmmProvider::new(p, ViewPolicy::Ignore);
        let mut fields = FieldList::new();
        fields.add_real(FID_BID, 3991, Exponent::NEG_2);

        assert!(matches!(
            provider.emit_update(Handle(2), &fields),
            Err(CoreError::Protocol(ProtocolError::UnknownHandle(Handle(2))))
        ));

        c.submit(&Envelope::new(Handle::LOGIN, Msg::Request(ReqMsg::login("user"))))
            .unwrap();
        c.submit(&Envelope::new(
            Handle(2),
            Msg::Request(ReqMsg::market_price("/LSEG.L", "DIRECT_FEED")),
        ))
        .unwrap();
        provider.dispatch(Duration::from_millis(100)).unwrap();
        recv(&mut c);
        recv(&mut c);

        assert!(provider.emit_update(Handle(3), &fields).is_err());
        provider.emit_update(Handle(2), &fields).unwrap();
        let env = recv(&mut c);
        assert_eq!(env.handle, Handle(2));
        assert!(matches!(env.msg, Msg::Update(ref u) if u.payload == fields));
    }

    #[test]
    fn emit_update_is_refused_after_logout() {
        let (p, mut c) = ChannelTransport::pair();
        let mut provider = OmmProvider::new(p, ViewPolicy::Ignore);
        let mut fields = FieldList::new();
        fields.add_real(FID_BID, 3991, Exponent::NEG_2);

        c.submit(&Envelope::new(Handle::LOGIN, Msg::Request(ReqMsg::login("user"))))
            .unwrap();
        c.submit(&Envelope::new(
            Handle(2),
            Msg::Request(ReqMsg::market_price("/LSEG.L", "DIRECT_FEED")),
        ))
        .unwrap();
        c.submit(&Envelope::new(
            Handle::LOGIN,
            Msg::Close(CloseMsg {
                domain: DomainType::Login,
            }),
        ))
        .unwrap();
        assert_eq!(provider.dispatch(Duration::from_millis(100)).unwrap(), 3);
        recv(&mut c);
        recv(&mut c);

        assert_eq!(provider.session_state(), SessionState::Closed);
        assert!(matches!(
            provider.emit_update(Handle(2), &fields),
            Err(CoreError::Protocol(ProtocolError::SessionClosed))
        ));
        assert!(c.try_recv().unwrap().is_none());
    }
}
