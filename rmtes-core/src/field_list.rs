use serde::{Deserialize, Serialize};

use crate::codec::{
    DataErrorCode, DecodedValue, Exponent, FieldData, FieldKind, Real, encode_rmtes,
};
use crate::dictionary::FieldDictionary;
use crate::error::ProtocolError;
use crate::view::ViewDescriptor;

/// Элемент списка полей
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Идентификатор поля (fid)
    pub field_id: i16,
    /// Значение
    pub data: FieldData,
}

/// Упорядоченный список полей.
///
/// Fid не обязаны быть уникальными между сообщениями: Update может
/// передавать только изменившиеся поля. Провайдер переиспользует один
/// список между тиками через [`FieldList::clear`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldList {
    entries: Vec<FieldEntry>,
}

impl FieldList {
    /// Пустой список
    pub fn new() -> Self {
        Self::default()
    }

    /// Пустой список с запасом ёмкости
    pub fn with_capacity(n: usize) -> Self {
        Self {
            entries: Vec::with_capacity(n),
        }
    }

    /// Очистить, сохранив выделенную память
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Добавить готовый элемент
    pub fn add(&mut self, field_id: i16, data: FieldData) -> &mut Self {
        self.entries.push(FieldEntry { field_id, data });
        self
    }

    /// Real: `mantissa * 10^exponent`
    pub fn add_real(&mut self, field_id: i16, mantissa: i64, exponent: Exponent) -> &mut Self {
        self.add(field_id, FieldData::Real(Real::new(mantissa, exponent)))
    }

    /// ASCII-строка
    pub fn add_ascii(&mut self, field_id: i16, value: impl Into<String>) -> &mut Self {
        self.add(field_id, FieldData::Ascii(value.into()))
    }

    /// Код перечисления
    pub fn add_enum(&mut self, field_id: i16, code: u16) -> &mut Self {
        self.add(field_id, FieldData::Enum(code))
    }

    /// Кодирует `text` в RMTES и добавляет
    pub fn add_rmtes(&mut self, field_id: i16, text: &str) -> &mut Self {
        self.add(field_id, FieldData::Rmtes(encode_rmtes(text)))
    }

    /// Код ошибки вместо значения
    pub fn add_error(&mut self, field_id: i16, code: DataErrorCode) -> &mut Self {
        self.add(field_id, FieldData::Error(code))
    }

    /// Пустое значение типа `kind`
    pub fn add_blank(&mut self, field_id: i16, kind: FieldKind) -> &mut Self {
        self.add(field_id, FieldData::Blank(kind))
    }

    /// Последний элемент с данным fid
    pub fn get(&self, field_id: i16) -> Option<&FieldData> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.field_id == field_id)
            .map(|e| &e.data)
    }

    /// Элементы в порядке добавления
    pub fn iter(&self) -> std::slice::Iter<'_, FieldEntry> {
        self.entries.iter()
    }

    /// Число элементов
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Пуст ли список
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Оставить только поля из view
    pub fn retain_fields(&mut self, view: &ViewDescriptor) {
        self.entries.retain(|e| view.contains(e.field_id));
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a FieldEntry;
    type IntoIter = std::slice::Iter<'a, FieldEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Декодированный элемент для слоя отображения
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEntry<'a> {
    /// Fid
    pub field_id: i16,
    /// Акроним из словаря
    pub name: &'static str,
    /// Объявленный тип
    pub kind: FieldKind,
    /// Значение или ошибка декодирования этого поля
    pub value: Result<DecodedValue<'a>, ProtocolError>,
}

/// Декодирует все поля. Ошибка одного поля не прерывает остальные.
pub fn decode_field_list<'a>(
    list: &'a FieldList,
    dict: &'a FieldDictionary,
) -> Vec<DecodedEntry<'a>> {
    list.iter()
        .map(|e| DecodedEntry {
            field_id: e.field_id,
            name: dict.name(e.field_id),
            kind: e.data.kind(),
            value: e.data.decode(e.field_id, dict),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_keeps_capacity() {
        let mut list = FieldList::with_capacity(8);
        list.add_real(22, 3991, Exponent::NEG_2)
            .add_ascii(260, "Korean")
            .add_rmtes(1352, "런던 증권 거래소");
        let cap = list.entries.capacity();

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.entries.capacity(), cap);
    }

    #[test]
    fn get_returns_last_entry_for_fid() {
        let mut list = FieldList::new();
        list.add_real(22, 1, Exponent::ZERO)
            .add_real(22, 2, Exponent::ZERO);

        assert_eq!(
            list.get(22),
            Some(&FieldData::Real(Real::new(2, Exponent::ZERO)))
        );
        assert_eq!(list.get(25), None);
    }

    #[test]
    fn decode_field_list_keeps_going_after_bad_field() {
        let dict = FieldDictionary::market_price();
        let mut list = FieldList::new();
        list.add(1352, FieldData::Rmtes(b"no prefix".to_vec()))
            .add_blank(22, FieldKind::Real)
            .add_enum(15, 840);

        let decoded = decode_field_list(&list, &dict);
        assert_eq!(decoded.len(), 3);
        assert!(decoded[0].value.is_err());
        assert_eq!(decoded[1].value, Ok(DecodedValue::Blank));
        assert_eq!(decoded[1].kind, FieldKind::Real);
        assert_eq!(decoded[2].name, "CURRENCY");
        assert_eq!(decoded[2].value.as_ref().unwrap().to_string(), "USD");
    }

    #[test]
    fn retain_fields_filters_by_view() {
        let mut list = FieldList::new();
        list.add_ascii(3, "/LSEG.L")
            .add_enum(15, 840)
            .add_real(22, 3990, Exponent::NEG_2);

        let view = ViewDescriptor::new([15, 22]);
        list.retain_fields(&view);

        let fids: Vec<i16> = list.iter().map(|e| e.field_id).collect();
        assert_eq!(fids, vec![15, 22]);
    }
}
