//! Endpoint потребителя: логин, подписки, доставка ответов клиентам.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::dispatcher::{ConsumerClient, dispatch_response};
use crate::error::TransportError;
use crate::message::{CloseMsg, DomainType, Envelope, Handle, Msg, RefreshMsg, ReqMsg};
use crate::transport::Transport;

struct Registration {
    domain: DomainType,
    client: Box<dyn ConsumerClient>,
}

/// Потребитель поверх одного соединения.
///
/// Handle'ы выдаются локально, начиная с 2 (1 - логин).
pub struct OmmConsumer<T: Transport> {
    transport: T,
    clients: HashMap<Handle, Registration>,
    next_handle: u64,
    login: RefreshMsg,
}

impl<T: Transport> OmmConsumer<T> {
    /// Отправить логин и дождаться Refresh на него.
    ///
    /// Всё, что пришло до ответа на логин, отбрасывается.
    pub fn connect(
        mut transport: T,
        username: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        transport.submit(&Envelope::new(
            Handle::LOGIN,
            Msg::Request(ReqMsg::login(username)),
        ))?;

        let deadline = Instant::now() + timeout;
        let login = loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Err(TransportError::LoginTimeout);
            }
            let Some(env) = transport.recv_timeout(left)? else {
                return Err(TransportError::LoginTimeout);
            };

            match env.msg {
                Msg::Refresh(r) if env.handle == Handle::LOGIN => break r,
                Msg::Status(s) if env.handle == Handle::LOGIN => {
                    let text = s.state.map(|st| st.text).unwrap_or_default();
                    return Err(TransportError::LoginRejected(text));
                }
                other => debug!("{} on {} before login, dropped", other.kind(), env.handle),
            }
        };

        info!("Logged in as {username}: {}", login.state);

        Ok(Self {
            transport,
            clients: HashMap::new(),
            next_handle: Handle::LOGIN.0 + 1,
            login,
        })
    }

    /// Refresh, полученный на логин
    pub fn login_refresh(&self) -> &RefreshMsg {
        &self.login
    }

    /// Отправить запрос и привязать к нему клиента. Ответы придут в `dispatch`.
    pub fn register_client(
        &mut self,
        req: ReqMsg,
        client: Box<dyn ConsumerClient>,
    ) -> Result<Handle, TransportError> {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;

        let domain = req.domain;
        self.transport
            .submit(&Envelope::new(handle, Msg::Request(req)))?;
        self.clients.insert(handle, Registration { domain, client });

        debug!("registered {domain} request on {handle}");
        Ok(handle)
    }

    /// Ждать входящие не дольше `timeout` и раздать их клиентам.
    ///
    /// Возвращает число доставленных сообщений.
    pub fn dispatch(&mut self, timeout: Duration) -> Result<usize, TransportError> {
        let Some(first) = self.transport.recv_timeout(timeout)? else {
            return Ok(0);
        };

        let mut delivered = 0;
        let mut next = Some(first);
        while let Some(env) = next {
            match self.clients.get_mut(&env.handle) {
                Some(reg) => {
                    if dispatch_response(reg.client.as_mut(), &env) {
                        delivered += 1;
                    }
                }
                None if env.handle == Handle::LOGIN => {
                    debug!("{} on login stream", env.msg.kind());
                }
                None => warn!("{} on unknown handle {}", env.msg.kind(), env.handle),
            }
            next = self.transport.try_recv()?;
        }

        Ok(delivered)
    }

    /// Закрыть поток `handle`. Клиент больше не получает сообщений.
    pub fn close(&mut self, handle: Handle) -> Result<(), TransportError> {
        let Some(reg) = self.clients.remove(&handle) else {
            debug!("close for unknown handle {handle}");
            return Ok(());
        };
        self.transport.submit(&Envelope::new(
            handle,
            Msg::Close(CloseMsg { domain: reg.domain }),
        ))
    }

    /// Закрыть сессию (Close на логин-поток)
    pub fn logout(&mut self) -> Result<(), TransportError> {
        self.clients.clear();
        self.transport.submit(&Envelope::new(
            Handle::LOGIN,
            Msg::Close(CloseMsg {
                domain: DomainType::Login,
            }),
        ))
    }
}
