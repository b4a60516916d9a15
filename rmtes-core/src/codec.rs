//! Кодек значений полей.
//!
//! Закрытое объединение [`FieldData`] с одной функцией декодирования на вариант
//! и RMTES-кодирование многоязычного текста.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dictionary::FieldDictionary;
use crate::error::{MalformedReason, ProtocolError};

/// Escape-последовательность RMTES: дальше идут байты UTF-8.
///
/// Протокольная константа, совместимость с экосистемой требует ровно эти три байта.
pub const RMTES_UTF8_PREFIX: [u8; 3] = [0x1B, 0x25, 0x30];

/// `text` -> `1B 25 30` + UTF-8 байты `text`
pub fn encode_rmtes(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(RMTES_UTF8_PREFIX.len() + text.len());
    encode_rmtes_into(text, &mut out);
    out
}

/// То же, что [`encode_rmtes`], но пишет в переиспользуемый буфер (буфер очищается).
pub fn encode_rmtes_into(text: &str, out: &mut Vec<u8>) {
    out.clear();
    out.extend_from_slice(&RMTES_UTF8_PREFIX);
    out.extend_from_slice(text.as_bytes());
}

/// Снимает префикс и возвращает текст без копирования.
pub fn decode_rmtes(bytes: &[u8]) -> Result<&str, ProtocolError> {
    let rest = bytes
        .strip_prefix(&RMTES_UTF8_PREFIX[..])
        .ok_or(ProtocolError::MalformedEncoding(MalformedReason::MissingPrefix))?;

    std::str::from_utf8(rest).map_err(|e| {
        ProtocolError::MalformedEncoding(MalformedReason::InvalidUtf8(
            RMTES_UTF8_PREFIX.len() + e.valid_up_to(),
        ))
    })
}

/// Степень десяти для [`Real`], диапазон OMM: -14..=7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub struct Exponent(i8);

impl Exponent {
    /// Минимальная поддерживаемая степень
    pub const MIN: i8 = -14;
    /// Максимальная поддерживаемая степень
    pub const MAX: i8 = 7;

    /// 10^-2, цены
    pub const NEG_2: Exponent = Exponent(-2);
    /// 10^0, объёмы
    pub const ZERO: Exponent = Exponent(0);

    /// Значение степени
    pub fn get(self) -> i8 {
        self.0
    }
}

impl TryFrom<i8> for Exponent {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Exponent(value))
        } else {
            Err(format!("exponent out of range: {value}"))
        }
    }
}

impl From<Exponent> for i8 {
    fn from(e: Exponent) -> i8 {
        e.0
    }
}

/// Десятичное с фиксированной точкой: `mantissa * 10^exponent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Real {
    /// Мантисса
    pub mantissa: i64,
    /// Степень десяти
    pub exponent: Exponent,
}

impl Real {
    /// Конструктор
    pub fn new(mantissa: i64, exponent: Exponent) -> Self {
        Self { mantissa, exponent }
    }

    /// Значение для отображения
    pub fn as_f64(&self) -> f64 {
        let e = i32::from(self.exponent.get());
        // 10^|e| для |e| <= 14 представимо точно, деление округляется корректно
        if e < 0 {
            self.mantissa as f64 / 10f64.powi(-e)
        } else {
            self.mantissa as f64 * 10f64.powi(e)
        }
    }
}

/// Код ошибки, которую провайдер кладёт в поле вместо значения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataErrorCode {
    /// Ошибки нет
    NoError,
    /// Сбой установки итератора
    IteratorSetFailure,
    /// Выход за пределы контейнера
    IteratorOverrun,
    /// Fid нет в словаре
    FieldIdNotFound,
    /// Данные обрезаны
    IncompleteData,
    /// Тип не поддерживается
    UnsupportedDataType,
    /// Нет set-определения
    NoSetDefinition,
    /// Прочее
    UnknownError,
}

impl DataErrorCode {
    /// Машиночитаемая строка кода
    pub fn as_str(self) -> &'static str {
        match self {
            DataErrorCode::NoError => "NoError",
            DataErrorCode::IteratorSetFailure => "IteratorSetFailure",
            DataErrorCode::IteratorOverrun => "IteratorOverrun",
            DataErrorCode::FieldIdNotFound => "FieldIdNotFound",
            DataErrorCode::IncompleteData => "IncompleteData",
            DataErrorCode::UnsupportedDataType => "UnsupportedDataType",
            DataErrorCode::NoSetDefinition => "NoSetDefinition",
            DataErrorCode::UnknownError => "UnknownError",
        }
    }
}

/// Объявленный тип поля
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Число с десятичной экспонентой
    Real,
    /// ASCII-строка
    Ascii,
    /// Код перечисления
    Enum,
    /// RMTES-строка
    Rmtes,
    /// Код ошибки вместо значения
    Error,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Real => "Real",
            FieldKind::Ascii => "Ascii",
            FieldKind::Enum => "Enum",
            FieldKind::Rmtes => "Rmtes",
            FieldKind::Error => "Error",
        };
        f.write_str(s)
    }
}

/// Значение поля. `Blank` хранит только объявленный тип, без значения.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldData {
    /// Мантисса и экспонента
    Real(Real),
    /// ASCII-строка
    Ascii(String),
    /// Код перечисления; отображение берётся из словаря
    Enum(u16),
    /// `1B 25 30` + UTF-8
    Rmtes(Vec<u8>),
    /// Код ошибки вместо значения
    Error(DataErrorCode),
    /// Пустое значение объявленного типа
    Blank(FieldKind),
}

impl FieldData {
    /// Объявленный тип (для `Blank` - тот, что был объявлен)
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldData::Real(_) => FieldKind::Real,
            FieldData::Ascii(_) => FieldKind::Ascii,
            FieldData::Enum(_) => FieldKind::Enum,
            FieldData::Rmtes(_) => FieldKind::Rmtes,
            FieldData::Error(_) => FieldKind::Error,
            FieldData::Blank(kind) => *kind,
        }
    }

    /// Пустое ли значение
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldData::Blank(_))
    }

    /// Декодирует значение в человекочитаемую проекцию.
    ///
    /// `Blank` проверяется первым, остальные варианты - по одной ветке на тип.
    pub fn decode<'a>(
        &'a self,
        fid: i16,
        dict: &'a FieldDictionary,
    ) -> Result<DecodedValue<'a>, ProtocolError> {
        if self.is_blank() {
            return Ok(DecodedValue::Blank);
        }

        match self {
            FieldData::Real(r) => Ok(DecodedValue::Real(r.as_f64())),
            FieldData::Ascii(s) => Ok(DecodedValue::Ascii(s)),
            FieldData::Enum(code) => Ok(DecodedValue::Enum {
                code: *code,
                display: dict.enum_display(fid, *code),
            }),
            FieldData::Rmtes(bytes) => decode_rmtes(bytes).map(DecodedValue::Text),
            FieldData::Error(code) => Ok(DecodedValue::Error(*code)),
            FieldData::Blank(_) => Ok(DecodedValue::Blank),
        }
    }
}

/// Проекция значения для отображения
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue<'a> {
    /// `mantissa * 10^exponent`
    Real(f64),
    /// ASCII как есть
    Ascii(&'a str),
    /// Код и (если есть в словаре) его отображение
    Enum {
        /// Код
        code: u16,
        /// Отображение из словаря
        display: Option<&'a str>,
    },
    /// Декодированный RMTES
    Text(&'a str),
    /// Код ошибки вместо значения
    Error(DataErrorCode),
    /// Пустое значение
    Blank,
}

impl fmt::Display for DecodedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Real(v) => write!(f, "{v}"),
            DecodedValue::Ascii(s) | DecodedValue::Text(s) => f.write_str(s),
            DecodedValue::Enum {
                display: Some(d), ..
            } => f.write_str(d),
            DecodedValue::Enum {
                code,
                display: None,
            } => write!(f, "{code}"),
            DecodedValue::Error(code) => write!(f, "({})", code.as_str()),
            DecodedValue::Blank => f.write_str("blank"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_rmtes_prepends_escape_prefix() {
        assert_eq!(encode_rmtes("AB"), vec![0x1B, 0x25, 0x30, 0x41, 0x42]);
        assert_eq!(encode_rmtes(""), RMTES_UTF8_PREFIX.to_vec());
    }

    #[test]
    fn encode_rmtes_length_is_prefix_plus_utf8_len() {
        let s = "伦敦证券交易所";
        assert_eq!(encode_rmtes(s).len(), 3 + s.len());
    }

    #[test]
    fn encode_rmtes_into_reuses_buffer() {
        let mut buf = encode_rmtes("ロンドン証券取引所");
        let cap = buf.capacity();

        encode_rmtes_into("AB", &mut buf);
        assert_eq!(buf, b"\x1b\x25\x30AB");
        assert_eq!(buf.capacity(), cap);
    }

    #[test]
    fn decode_rmtes_rejects_missing_prefix() {
        let err = decode_rmtes(b"AB").unwrap_err();
        assert_eq!(
            err,
            ProtocolError::MalformedEncoding(MalformedReason::MissingPrefix)
        );

        // неполный префикс
        assert!(decode_rmtes(&[0x1B, 0x25]).is_err());
        assert!(decode_rmtes(&[]).is_err());
    }

    #[test]
    fn decode_rmtes_rejects_invalid_utf8_and_reports_offset() {
        let bytes = [0x1B, 0x25, 0x30, b'A', 0xFF, b'B'];
        let err = decode_rmtes(&bytes).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::MalformedEncoding(MalformedReason::InvalidUtf8(4))
        );
    }

    #[test]
    fn exponent_range_is_checked() {
        assert!(Exponent::try_from(-14).is_ok());
        assert!(Exponent::try_from(7).is_ok());
        assert!(Exponent::try_from(-15).is_err());
        assert!(Exponent::try_from(8).is_err());
    }

    #[test]
    fn real_as_f64_applies_exponent() {
        assert_eq!(Real::new(3990, Exponent::NEG_2).as_f64(), 39.9);
        assert_eq!(Real::new(19, Exponent::ZERO).as_f64(), 19.0);
        assert_eq!(Real::new(-5, Exponent::try_from(3).unwrap()).as_f64(), -5000.0);
    }

    #[test]
    fn blank_keeps_declared_kind_and_decodes_as_blank() {
        let dict = FieldDictionary::market_price();
        let d = FieldData::Blank(FieldKind::Real);

        assert_eq!(d.kind(), FieldKind::Real);
        assert_eq!(d.decode(22, &dict).unwrap(), DecodedValue::Blank);
        assert_eq!(d.decode(22, &dict).unwrap().to_string(), "blank");
    }

    #[test]
    fn enum_uses_dictionary_display_and_falls_back_to_code() {
        let dict = FieldDictionary::market_price();

        let usd = FieldData::Enum(840);
        assert_eq!(usd.decode(15, &dict).unwrap().to_string(), "USD");

        let unknown = FieldData::Enum(1);
        assert_eq!(unknown.decode(15, &dict).unwrap().to_string(), "1");
    }

    #[test]
    fn error_and_rmtes_display() {
        let dict = FieldDictionary::market_price();

        let e = FieldData::Error(DataErrorCode::FieldIdNotFound);
        assert_eq!(e.decode(99, &dict).unwrap().to_string(), "(FieldIdNotFound)");

        let t = FieldData::Rmtes(encode_rmtes("런던 증권 거래소"));
        assert_eq!(t.decode(1352, &dict).unwrap().to_string(), "런던 증권 거래소");

        let bad = FieldData::Rmtes(b"plain".to_vec());
        assert!(bad.decode(1352, &dict).is_err());
    }

    proptest! {
        #[test]
        fn rmtes_roundtrip(s in any::<String>()) {
            let encoded = encode_rmtes(&s);
            prop_assert_eq!(decode_rmtes(&encoded).unwrap(), s.as_str());
        }

        #[test]
        fn rmtes_rejects_buffers_without_prefix(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assume!(!bytes.starts_with(&RMTES_UTF8_PREFIX));
            prop_assert!(decode_rmtes(&bytes).is_err());
        }

        #[test]
        fn rmtes_rejects_non_utf8_tail(tail in proptest::collection::vec(any::<u8>(), 1..64)) {
            prop_assume!(std::str::from_utf8(&tail).is_err());
            let mut bytes = RMTES_UTF8_PREFIX.to_vec();
            bytes.extend_from_slice(&tail);
            prop_assert!(decode_rmtes(&bytes).is_err());
        }
    }
}
