use std::fmt;

use serde::{Deserialize, Serialize};

use crate::element::ElementList;
use crate::field_list::FieldList;
use crate::view::ViewDescriptor;

/// Непрозрачный идентификатор потока (подписки или логина)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(pub u64);

impl Handle {
    /// Поток логина
    pub const LOGIN: Handle = Handle(1);
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Домен сообщения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainType {
    /// Логин
    Login,
    /// Directory (список сервисов)
    Source,
    /// Словарь полей
    Dictionary,
    /// Котировки по item'у
    MarketPrice,
    /// Стакан по заявкам
    MarketByOrder,
    /// Стакан по ценам
    MarketByPrice,
    /// Список инструментов
    SymbolList,
    /// Прочие (пользовательские) домены по номеру
    Other(u8),
}

impl DomainType {
    /// Номер домена (RDM model type)
    pub fn code(self) -> u8 {
        match self {
            DomainType::Login => 1,
            DomainType::Source => 4,
            DomainType::Dictionary => 5,
            DomainType::MarketPrice => 6,
            DomainType::MarketByOrder => 7,
            DomainType::MarketByPrice => 8,
            DomainType::SymbolList => 10,
            DomainType::Other(c) => c,
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainType::Other(c) => write!(f, "Other({c})"),
            known => write!(f, "{known:?}"),
        }
    }
}

/// Состояние потока
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamState {
    /// Поток открыт
    Open,
    /// Только снимок, без Update
    NonStreaming,
    /// Закрыт, можно переоткрыть
    ClosedRecover,
    /// Закрыт
    Closed,
    /// Закрыт, item под другим именем
    ClosedRedirected,
}

/// Состояние данных
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataState {
    /// Без изменений
    NoChange,
    /// Данные актуальны
    Ok,
    /// Данные под вопросом
    Suspect,
}

/// Код статуса
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    /// Без кода
    None,
    /// Item не найден
    NotFound,
    /// Нет прав
    NotEntitled,
    /// Некорректный запрос
    InvalidArgument,
    /// Поток уже открыт
    AlreadyOpen,
}

/// Тройка состояний + текст
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmmState {
    /// Поток
    pub stream: StreamState,
    /// Данные
    pub data: DataState,
    /// Код
    pub code: StatusCode,
    /// Пояснение
    pub text: String,
}

impl OmmState {
    /// Open / Ok / None
    pub fn open_ok(text: impl Into<String>) -> Self {
        Self {
            stream: StreamState::Open,
            data: DataState::Ok,
            code: StatusCode::None,
            text: text.into(),
        }
    }

    /// Closed / Suspect / `code`
    pub fn closed_suspect(code: StatusCode, text: impl Into<String>) -> Self {
        Self {
            stream: StreamState::Closed,
            data: DataState::Suspect,
            code,
            text: text.into(),
        }
    }
}

impl fmt::Display for OmmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} / {:?} / {:?} / '{}'",
            self.stream, self.data, self.code, self.text
        )
    }
}

/// Запрос (логин или подписка на item)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReqMsg {
    /// Домен
    pub domain: DomainType,
    /// Имя item'а или пользователя для логина
    pub name: Option<String>,
    /// Сервис
    pub service_name: Option<String>,
    /// Payload, например View
    pub payload: ElementList,
}

impl ReqMsg {
    /// Логин с именем пользователя
    pub fn login(username: impl Into<String>) -> Self {
        Self {
            domain: DomainType::Login,
            name: Some(username.into()),
            service_name: None,
            payload: ElementList::new(),
        }
    }

    /// Подписка на MarketPrice item
    pub fn market_price(name: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            domain: DomainType::MarketPrice,
            name: Some(name.into()),
            service_name: Some(service_name.into()),
            payload: ElementList::new(),
        }
    }

    /// Приложить View
    pub fn with_view(mut self, view: &ViewDescriptor) -> Self {
        self.payload = view.to_element_list();
        self
    }

    /// Сменить домен
    pub fn with_domain(mut self, domain: DomainType) -> Self {
        self.domain = domain;
        self
    }
}

/// Закрытие потока
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseMsg {
    /// Домен
    pub domain: DomainType,
}

/// Полный снимок
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshMsg {
    /// Домен
    pub domain: DomainType,
    /// Имя item'а
    pub name: Option<String>,
    /// Сервис
    pub service_name: Option<String>,
    /// Состояние потока
    pub state: OmmState,
    /// Ответ на запрос (а не незапрошенный снимок)
    pub solicited: bool,
    /// Последняя часть снимка
    pub complete: bool,
    /// Атрибуты (для логина - пустой список)
    pub attrib: ElementList,
    /// Поля
    pub payload: FieldList,
}

/// Инкрементальное обновление: только изменившиеся поля
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMsg {
    /// Домен
    pub domain: DomainType,
    /// Имя item'а
    pub name: Option<String>,
    /// Сервис
    pub service_name: Option<String>,
    /// Поля
    pub payload: FieldList,
}

/// Смена состояния потока/сессии (в т.ч. отказ)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMsg {
    /// Домен
    pub domain: DomainType,
    /// Имя item'а
    pub name: Option<String>,
    /// Сервис
    pub service_name: Option<String>,
    /// Новое состояние, если изменилось
    pub state: Option<OmmState>,
}

impl StatusMsg {
    /// Отказ на запрос `req`: Closed / Suspect / `code`
    pub fn reject(req: &ReqMsg, code: StatusCode, text: impl Into<String>) -> Self {
        Self {
            domain: req.domain,
            name: req.name.clone(),
            service_name: req.service_name.clone(),
            state: Some(OmmState::closed_suspect(code, text)),
        }
    }
}

/// Двунаправленное сообщение без состояния потока
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericMsg {
    /// Домен
    pub domain: DomainType,
    /// Имя item'а
    pub name: Option<String>,
    /// Поля
    pub payload: FieldList,
}

/// Публикация данных от потребителя
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMsg {
    /// Домен
    pub domain: DomainType,
    /// Имя item'а
    pub name: Option<String>,
    /// Номер Post для Ack
    pub post_id: u32,
    /// Поля
    pub payload: FieldList,
}

/// Подтверждение Post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMsg {
    /// Домен
    pub domain: DomainType,
    /// `post_id` подтверждаемого Post
    pub ack_id: u32,
    /// Текст отказа, если Post не принят
    pub nack: Option<String>,
}

/// Все виды сообщений
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Msg {
    /// Запрос
    Request(ReqMsg),
    /// Закрытие потока
    Close(CloseMsg),
    /// Снимок
    Refresh(RefreshMsg),
    /// Обновление
    Update(UpdateMsg),
    /// Статус
    Status(StatusMsg),
    /// Generic
    Generic(GenericMsg),
    /// Post
    Post(PostMsg),
    /// Ack
    Ack(AckMsg),
}

impl Msg {
    /// Короткое имя вида сообщения для логов
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::Request(_) => "Request",
            Msg::Close(_) => "Close",
            Msg::Refresh(_) => "Refresh",
            Msg::Update(_) => "Update",
            Msg::Status(_) => "Status",
            Msg::Generic(_) => "Generic",
            Msg::Post(_) => "Post",
            Msg::Ack(_) => "Ack",
        }
    }
}

/// Сообщение вместе с потоком, к которому оно относится
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Поток
    pub handle: Handle,
    /// Сообщение
    pub msg: Msg,
}

impl Envelope {
    /// Сообщение в поток `handle`
    pub fn new(handle: Handle, msg: Msg) -> Self {
        Self { handle, msg }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_display_matches_log_format() {
        let s = OmmState::open_ok("Refresh Completed");
        assert_eq!(s.to_string(), "Open / Ok / None / 'Refresh Completed'");

        let s = OmmState::closed_suspect(StatusCode::NotFound, "Item not found");
        assert_eq!(s.to_string(), "Closed / Suspect / NotFound / 'Item not found'");
    }

    #[test]
    fn reject_echoes_request_identity() {
        let req = ReqMsg::market_price("/LSEG.L", "DIRECT_FEED");
        let st = StatusMsg::reject(&req, StatusCode::NotFound, "Item not found");

        assert_eq!(st.domain, DomainType::MarketPrice);
        assert_eq!(st.name.as_deref(), Some("/LSEG.L"));
        assert_eq!(st.service_name.as_deref(), Some("DIRECT_FEED"));
        assert_eq!(st.state.unwrap().code, StatusCode::NotFound);
    }

    #[test]
    fn domain_codes_and_display() {
        assert_eq!(DomainType::Login.code(), 1);
        assert_eq!(DomainType::MarketPrice.code(), 6);
        assert_eq!(DomainType::Other(200).code(), 200);
        assert_eq!(DomainType::MarketPrice.to_string(), "MarketPrice");
        assert_eq!(DomainType::Other(200).to_string(), "Other(200)");
    }
}
