use rand::Rng;
use rmtes_core::FieldList;
use rmtes_core::languages::Language;
use rmtes_core::payload::fill_update;

/// Генератор Update: цены растут с номером тика, язык выбирается случайно.
///
/// FieldList переиспользуется: каждый тик очищается и заполняется заново.
pub(crate) struct UpdateGenerator {
    languages: Vec<Language>,
    fields: FieldList,
}

impl UpdateGenerator {
    /// `None`, если таблица языков пуста
    pub(crate) fn new(languages: Vec<Language>) -> Option<Self> {
        if languages.is_empty() {
            return None;
        }
        Some(Self {
            languages,
            fields: FieldList::with_capacity(6),
        })
    }

    /// Язык для Refresh - первый в таблице
    pub(crate) fn refresh_language(&self) -> &Language {
        &self.languages[0]
    }

    /// Поля Update для тика `tick`
    pub(crate) fn next_update(&mut self, tick: u64) -> &FieldList {
        let idx = rand::rng().random_range(0..self.languages.len());
        fill_update(&mut self.fields, tick, &self.languages[idx]);
        &self.fields
    }
}
