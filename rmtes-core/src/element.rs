use serde::{Deserialize, Serialize};

/// Значение элемента
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementValue {
    /// Беззнаковое целое
    UInt(u64),
    /// Целое
    Int(i64),
    /// Строка
    Ascii(String),
    /// Массив целых (например, список fid во View)
    IntArray(Vec<i64>),
}

/// Именованный элемент
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementEntry {
    /// Имя, например `:ViewType`
    pub name: String,
    /// Значение
    pub value: ElementValue,
}

/// Список именованных элементов: payload запроса (View) и атрибуты логина.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementList {
    entries: Vec<ElementEntry>,
}

impl ElementList {
    /// Пустой список
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавить элемент в конец
    pub fn add(&mut self, name: impl Into<String>, value: ElementValue) -> &mut Self {
        self.entries.push(ElementEntry {
            name: name.into(),
            value,
        });
        self
    }

    /// Первый элемент с таким именем
    pub fn get(&self, name: &str) -> Option<&ElementValue> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.value)
    }

    /// Пуст ли список
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Число элементов
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
