//! Демонстрационный payload домена MarketPrice.

use crate::codec::Exponent;
use crate::field_list::FieldList;
use crate::languages::Language;

/// Отображаемое имя (эхо имени item'а)
pub const FID_DSPLY_NAME: i16 = 3;
/// Валюта (enum, ISO 4217)
pub const FID_CURRENCY: i16 = 15;
/// Bid
pub const FID_BID: i16 = 22;
/// Ask
pub const FID_ASK: i16 = 25;
/// Объём bid
pub const FID_BIDSIZE: i16 = 30;
/// Объём ask
pub const FID_ASKSIZE: i16 = 31;
/// Название языка (ASCII)
pub const FID_SEG_FORW: i16 = 260;
/// Название биржи на этом языке (RMTES)
pub const FID_DSPLY_NMLL: i16 = 1352;

/// USD
pub const CURRENCY_USD: u16 = 840;

/// Полный снимок для Refresh
pub fn fill_refresh(list: &mut FieldList, item_name: &str, lang: &Language) {
    list.clear();
    list.add_ascii(FID_DSPLY_NAME, item_name)
        .add_enum(FID_CURRENCY, CURRENCY_USD)
        .add_real(FID_BID, 3990, Exponent::NEG_2)
        .add_real(FID_ASK, 3994, Exponent::NEG_2)
        .add_real(FID_BIDSIZE, 9, Exponent::ZERO)
        .add_real(FID_ASKSIZE, 19, Exponent::ZERO)
        .add_ascii(FID_SEG_FORW, lang.name.as_str())
        .add_rmtes(FID_DSPLY_NMLL, &lang.text);
}

/// Поля Update для тика `tick` (0, 1, ...). DSPLY_NAME и CURRENCY не меняются и не шлются.
pub fn fill_update(list: &mut FieldList, tick: u64, lang: &Language) {
    let i = tick as i64;
    list.clear();
    list.add_real(FID_BID, 3991 + i, Exponent::NEG_2)
        .add_real(FID_ASK, 3994 + i, Exponent::NEG_2)
        .add_real(FID_BIDSIZE, 10 + i, Exponent::ZERO)
        .add_real(FID_ASKSIZE, 19 + i, Exponent::ZERO)
        .add_ascii(FID_SEG_FORW, lang.name.as_str())
        .add_rmtes(FID_DSPLY_NMLL, &lang.text);
}
