use log::{debug, info};

use crate::error::ProtocolError;
use crate::field_list::FieldList;
use crate::languages::{DEFAULT_LANGUAGES, Language};
use crate::message::{DomainType, Handle, OmmState, RefreshMsg, ReqMsg, UpdateMsg};
use crate::payload;
use crate::view::{ViewDescriptor, ViewPolicy};

/// Активная подписка
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSubscription {
    /// Поток, в который идут Refresh/Update
    pub handle: Handle,
    /// Имя item'а
    pub name: String,
    /// Сервис
    pub service_name: String,
    /// Домен (пока только MarketPrice)
    pub domain: DomainType,
    /// View из запроса; применяется только при [`ViewPolicy::Enforce`]
    pub view: Option<ViewDescriptor>,
}

/// Реестр подписок провайдера: не более одной активной.
///
/// Владелец - endpoint, доступ только из потока dispatch-цикла. При
/// параллельной обработке входящих слот и переиспользуемый FieldList
/// надо закрыть Mutex'ом.
#[derive(Debug)]
pub struct ItemRegistry {
    slot: Option<ItemSubscription>,
    view_policy: ViewPolicy,
    refresh_language: Language,
}

impl Default for ItemRegistry {
    fn default() -> Self {
        Self::new(ViewPolicy::default())
    }
}

impl ItemRegistry {
    /// Пустой реестр
    pub fn new(view_policy: ViewPolicy) -> Self {
        let (name, text) = DEFAULT_LANGUAGES[0];
        Self {
            slot: None,
            view_policy,
            refresh_language: Language::new(name, text),
        }
    }

    /// Язык, которым заполняется Refresh
    pub fn with_refresh_language(mut self, lang: Language) -> Self {
        self.refresh_language = lang;
        self
    }

    /// Активная подписка, если есть
    pub fn active(&self) -> Option<&ItemSubscription> {
        self.slot.as_ref()
    }

    /// Применяется ли View
    pub fn view_policy(&self) -> ViewPolicy {
        self.view_policy
    }

    /// Регистрирует подписку и строит Refresh.
    ///
    /// Вторая подписка отклоняется даже для того же item'а. Домены кроме
    /// MarketPrice не поддерживаются.
    pub fn request_item(&mut self, handle: Handle, req: &ReqMsg) -> Result<RefreshMsg, ProtocolError> {
        if req.domain != DomainType::MarketPrice {
            return Err(ProtocolError::UnknownDomain(req.domain));
        }
        if let Some(active) = &self.slot {
            debug!(
                "item request {handle} rejected: {} already registered on {}",
                active.name, active.handle
            );
            return Err(ProtocolError::CapacityExceeded);
        }

        let view = ViewDescriptor::from_element_list(&req.payload)?;

        let sub = ItemSubscription {
            handle,
            name: req.name.clone().unwrap_or_default(),
            service_name: req.service_name.clone().unwrap_or_default(),
            domain: req.domain,
            view,
        };

        let mut fields = FieldList::with_capacity(8);
        payload::fill_refresh(&mut fields, &sub.name, &self.refresh_language);
        self.apply_view(&sub, &mut fields);

        let refresh = RefreshMsg {
            domain: sub.domain,
            name: req.name.clone(),
            service_name: req.service_name.clone(),
            state: OmmState::open_ok("Refresh Completed"),
            solicited: true,
            complete: true,
            attrib: Default::default(),
            payload: fields,
        };

        info!(
            "Item request accepted: {} / {} on {handle} (view: {})",
            sub.service_name,
            sub.name,
            if sub.view.is_some() { "yes" } else { "no" }
        );
        self.slot = Some(sub);

        Ok(refresh)
    }

    /// Update только с переданными полями (partial update).
    pub fn emit_update(&self, handle: Handle, fields: &FieldList) -> Result<UpdateMsg, ProtocolError> {
        let sub = self
            .slot
            .as_ref()
            .filter(|s| s.handle == handle)
            .ok_or(ProtocolError::UnknownHandle(handle))?;

        let mut payload = fields.clone();
        self.apply_view(sub, &mut payload);

        Ok(UpdateMsg {
            domain: sub.domain,
            name: None,
            service_name: None,
            payload,
        })
    }

    fn apply_view(&self, sub: &ItemSubscription, fields: &mut FieldList) {
        if let (ViewPolicy::Enforce, Some(view)) = (self.view_policy, &sub.view) {
            fields.retain_fields(view);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Exponent, FieldData, decode_rmtes};
    use crate::message::{DataState, StatusCode, StreamState};
    use crate::payload::{FID_BID, FID_DSPLY_NAME, FID_DSPLY_NMLL, FID_SEG_FORW};

    fn lseg() -> ReqMsg {
        ReqMsg::market_price("/LSEG.L", "DIRECT_FEED")
    }

    #[test]
    fn first_request_returns_open_refresh_with_demo_payload() {
        let mut reg = ItemRegistry::default();
        let refresh = reg.request_item(Handle(7), &lseg()).unwrap();

        assert_eq!(refresh.state.stream, StreamState::Open);
        assert_eq!(refresh.state.data, DataState::Ok);
        assert_eq!(refresh.state.code, StatusCode::None);
        assert!(refresh.solicited);
        assert_eq!(
            refresh.payload.get(FID_DSPLY_NAME),
            Some(&FieldData::Ascii("/LSEG.L".into()))
        );
        match refresh.payload.get(FID_DSPLY_NMLL) {
            Some(FieldData::Rmtes(b)) => assert_eq!(decode_rmtes(b).unwrap(), "伦敦证券交易所"),
            other => panic!("expected rmtes, got {other:?}"),
        }

        let active = reg.active().unwrap();
        assert_eq!(active.handle, Handle(7));
        assert_eq!(active.service_name, "DIRECT_FEED");
    }

    #[test]
    fn second_request_exceeds_capacity_even_for_same_item() {
        let mut reg = ItemRegistry::default();
        reg.request_item(Handle(7), &lseg()).unwrap();

        assert_eq!(
            reg.request_item(Handle(8), &lseg()).unwrap_err(),
            ProtocolError::CapacityExceeded
        );
        assert_eq!(
            reg.request_item(Handle(9), &ReqMsg::market_price("/VOD.L", "DIRECT_FEED"))
                .unwrap_err(),
            ProtocolError::CapacityExceeded
        );
        // слот не перезаписан
        assert_eq!(reg.active().unwrap().handle, Handle(7));
    }

    #[test]
    fn non_market_price_domain_is_unknown() {
        let mut reg = ItemRegistry::default();
        let req = lseg().with_domain(DomainType::MarketByOrder);

        assert_eq!(
            reg.request_item(Handle(7), &req).unwrap_err(),
            ProtocolError::UnknownDomain(DomainType::MarketByOrder)
        );
        assert!(reg.active().is_none());
    }

    #[test]
    fn emit_update_checks_handle() {
        let mut reg = ItemRegistry::default();
        let mut fields = FieldList::new();
        fields.add_real(FID_BID, 3991, Exponent::NEG_2);

        // пустой реестр
        assert_eq!(
            reg.emit_update(Handle(7), &fields).unwrap_err(),
            ProtocolError::UnknownHandle(Handle(7))
        );

        reg.request_item(Handle(7), &lseg()).unwrap();
        assert_eq!(
            reg.emit_update(Handle(8), &fields).unwrap_err(),
            ProtocolError::UnknownHandle(Handle(8))
        );

        let upd = reg.emit_update(Handle(7), &fields).unwrap();
        assert_eq!(upd.payload, fields);
    }

    #[test]
    fn view_is_stored_but_ignored_by_default() {
        let mut reg = ItemRegistry::default();
        let req = lseg().with_view(&ViewDescriptor::new([22, 25]));

        let refresh = reg.request_item(Handle(7), &req).unwrap();

        assert_eq!(refresh.payload.len(), 8);
        assert_eq!(
            reg.active().unwrap().view,
            Some(ViewDescriptor::new([22, 25]))
        );
    }

    #[test]
    fn view_is_applied_when_enforced() {
        let mut reg = ItemRegistry::new(ViewPolicy::Enforce);
        let req = lseg().with_view(&ViewDescriptor::new([22, 1352]));

        let refresh = reg.request_item(Handle(7), &req).unwrap();
        let fids: Vec<i16> = refresh.payload.iter().map(|e| e.field_id).collect();
        assert_eq!(fids, vec![22, 1352]);

        let mut fields = FieldList::new();
        fields
            .add_real(FID_BID, 3991, Exponent::NEG_2)
            .add_ascii(FID_SEG_FORW, "Korean");
        let upd = reg.emit_update(Handle(7), &fields).unwrap();
        assert_eq!(upd.payload.len(), 1);
        assert!(upd.payload.get(FID_SEG_FORW).is_none());
    }

    #[test]
    fn invalid_view_is_rejected_and_slot_stays_free() {
        let mut reg = ItemRegistry::default();
        let mut req = lseg();
        req.payload.add(
            crate::view::ENAME_VIEW_DATA,
            crate::element::ElementValue::Ascii("22,25".into()),
        );

        assert!(matches!(
            reg.request_item(Handle(7), &req),
            Err(ProtocolError::InvalidView(_))
        ));
        assert!(reg.active().is_none());
    }
}
