//! View: список fid, которыми подписчик просит ограничить payload.
//!
//! Провайдер разбирает и хранит View вместе с подпиской. Фильтрует ли он
//! по нему ответы, решает [`ViewPolicy`]; по умолчанию не фильтрует.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::element::{ElementList, ElementValue};
use crate::error::ProtocolError;

/// Имя элемента с типом View
pub const ENAME_VIEW_TYPE: &str = ":ViewType";
/// Имя элемента со списком fid
pub const ENAME_VIEW_DATA: &str = ":ViewData";
/// View по fid (единственный поддерживаемый тип)
pub const VIEW_TYPE_FIELD_ID_LIST: u64 = 1;

/// Allow-list fid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDescriptor {
    field_ids: BTreeSet<i16>,
}

impl ViewDescriptor {
    /// Из списка fid; дубликаты схлопываются
    pub fn new(field_ids: impl IntoIterator<Item = i16>) -> Self {
        Self {
            field_ids: field_ids.into_iter().collect(),
        }
    }

    /// Разрешён ли fid
    pub fn contains(&self, fid: i16) -> bool {
        self.field_ids.contains(&fid)
    }

    /// Отсортированные уникальные fid
    pub fn field_ids(&self) -> impl Iterator<Item = i16> + '_ {
        self.field_ids.iter().copied()
    }

    /// `:ViewType = 1`, `:ViewData = [fid...]`
    pub fn to_element_list(&self) -> ElementList {
        let mut list = ElementList::new();
        list.add(ENAME_VIEW_TYPE, ElementValue::UInt(VIEW_TYPE_FIELD_ID_LIST))
            .add(
                ENAME_VIEW_DATA,
                ElementValue::IntArray(self.field_ids().map(i64::from).collect()),
            );
        list
    }

    /// Разбирает payload запроса. Пустой payload -> `None`.
    pub fn from_element_list(list: &ElementList) -> Result<Option<Self>, ProtocolError> {
        if list.is_empty() {
            return Ok(None);
        }

        // тип по умолчанию - список fid
        match list.get(ENAME_VIEW_TYPE) {
            None | Some(ElementValue::UInt(VIEW_TYPE_FIELD_ID_LIST)) => {}
            Some(ElementValue::UInt(other)) => {
                return Err(ProtocolError::InvalidView(format!(
                    "unsupported view type: {other}"
                )));
            }
            Some(other) => {
                return Err(ProtocolError::InvalidView(format!(
                    "view type must be uint, got {other:?}"
                )));
            }
        }

        let raw = match list.get(ENAME_VIEW_DATA) {
            Some(ElementValue::IntArray(v)) => v,
            Some(other) => {
                return Err(ProtocolError::InvalidView(format!(
                    "view data must be an int array, got {other:?}"
                )));
            }
            None => return Err(ProtocolError::InvalidView("missing view data".into())),
        };

        let field_ids = raw
            .iter()
            .map(|&fid| {
                i16::try_from(fid)
                    .map_err(|_| ProtocolError::InvalidView(format!("field id out of range: {fid}")))
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Some(Self { field_ids }))
    }
}

/// Применять ли View к исходящим Refresh/Update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPolicy {
    /// Хранить, но отправлять все поля
    #[default]
    Ignore,
    /// Отправлять только поля из View
    Enforce,
}
