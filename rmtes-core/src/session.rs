//! Жизненный цикл логина на стороне провайдера:
//! `Unauthenticated -> LoggedIn -> Closed`.

use log::info;

use crate::element::ElementList;
use crate::error::ProtocolError;
use crate::field_list::FieldList;
use crate::message::{DomainType, OmmState, RefreshMsg, ReqMsg};

/// Состояние сессии
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Логина ещё не было
    #[default]
    Unauthenticated,
    /// Логин принят
    LoggedIn,
    /// Терминальное: после Close/разрыва ничего не обрабатываем
    Closed,
}

/// Сессия одного соединения
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    identity: String,
}

impl Session {
    /// Новая сессия без логина
    pub fn new() -> Self {
        Self::default()
    }

    /// Текущее состояние
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Имя пользователя из последнего логина
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Принять логин и построить Login Refresh.
    ///
    /// Учётные данные здесь не проверяются: это точка расширения для
    /// настоящей аутентификации. Повторный логин в `LoggedIn` - reissue,
    /// на него отвечаем тем же Refresh.
    pub fn login(&mut self, req: &ReqMsg) -> Result<RefreshMsg, ProtocolError> {
        if self.state == SessionState::Closed {
            return Err(ProtocolError::SessionClosed);
        }

        self.identity = req.name.clone().unwrap_or_default();
        if self.state == SessionState::Unauthenticated {
            info!("Login request accepted: user={}", self.identity);
        }
        self.state = SessionState::LoggedIn;

        Ok(RefreshMsg {
            domain: DomainType::Login,
            name: Some(self.identity.clone()),
            service_name: None,
            state: OmmState::open_ok("Login accepted"),
            solicited: true,
            complete: true,
            attrib: ElementList::new(),
            payload: FieldList::new(),
        })
    }

    /// Закрыть сессию (Close на логин-потоке или разрыв соединения)
    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            info!("Session closed: user={}", self.identity);
        }
        self.state = SessionState::Closed;
    }

    /// Гейт для всех не-логин сообщений
    pub fn ensure_logged_in(&self) -> Result<(), ProtocolError> {
        match self.state {
            SessionState::LoggedIn => Ok(()),
            SessionState::Unauthenticated => Err(ProtocolError::NotLoggedIn),
            SessionState::Closed => Err(ProtocolError::SessionClosed),
        }
    }
}
