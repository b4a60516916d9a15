use std::collections::HashMap;

use crate::codec::FieldKind;

/// Описание поля из словаря
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Акроним поля, например `BID`
    pub name: &'static str,
    /// Ожидаемый тип
    pub kind: FieldKind,
}

/// Словарь полей + таблица отображения enum-кодов.
#[derive(Debug, Clone, Default)]
pub struct FieldDictionary {
    fields: HashMap<i16, FieldDef>,
    enums: HashMap<(i16, u16), &'static str>,
}

/// Имя для fid, которого нет в словаре
pub const UNKNOWN_FIELD_NAME: &str = "<unknown>";

impl FieldDictionary {
    /// Пустой словарь
    pub fn new() -> Self {
        Self::default()
    }

    /// Словарь для домена MarketPrice (поля демо-провайдера)
    pub fn market_price() -> Self {
        let mut d = Self::new();
        d.insert(3, "DSPLY_NAME", FieldKind::Ascii)
            .insert(15, "CURRENCY", FieldKind::Enum)
            .insert(22, "BID", FieldKind::Real)
            .insert(25, "ASK", FieldKind::Real)
            .insert(30, "BIDSIZE", FieldKind::Real)
            .insert(31, "ASKSIZE", FieldKind::Real)
            .insert(260, "SEG_FORW", FieldKind::Ascii)
            .insert(1352, "DSPLY_NMLL", FieldKind::Rmtes);

        // ISO 4217 numeric
        for (code, display) in [
            (840, "USD"),
            (826, "GBP"),
            (978, "EUR"),
            (392, "JPY"),
            (156, "CNY"),
        ] {
            d.insert_enum(15, code, display);
        }
        d
    }

    /// Добавить поле
    pub fn insert(&mut self, fid: i16, name: &'static str, kind: FieldKind) -> &mut Self {
        self.fields.insert(fid, FieldDef { name, kind });
        self
    }

    /// Добавить отображение enum-кода
    pub fn insert_enum(&mut self, fid: i16, code: u16, display: &'static str) -> &mut Self {
        self.enums.insert((fid, code), display);
        self
    }

    /// Описание поля
    pub fn field(&self, fid: i16) -> Option<&FieldDef> {
        self.fields.get(&fid)
    }

    /// Акроним поля или `<unknown>`
    pub fn name(&self, fid: i16) -> &'static str {
        self.field(fid).map_or(UNKNOWN_FIELD_NAME, |d| d.name)
    }

    /// Отображение enum-кода, если есть
    pub fn enum_display(&self, fid: i16, code: u16) -> Option<&'static str> {
        self.enums.get(&(fid, code)).copied()
    }
}
