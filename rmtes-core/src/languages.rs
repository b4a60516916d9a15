use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Язык: ASCII-название и строка на этом языке (уходит в поле RMTES)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    /// Название, например `Japanese`
    pub name: String,
    /// Текст, например `ロンドン証券取引所`
    pub text: String,
}

impl Language {
    /// Язык из названия и текста
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// «Лондонская фондовая биржа» на пяти языках; первый идёт в Refresh
pub const DEFAULT_LANGUAGES: [(&str, &str); 5] = [
    ("Simplified Chinese", "伦敦证券交易所"),
    ("Traditional Chinese", "倫敦證券交易所"),
    ("Japanese", "ロンドン証券取引所"),
    ("Korean", "런던 증권 거래소"),
    ("Thai", "ตลาดหลักทรัพย์ลอนดอน"),
];

/// Встроенная таблица языков
pub fn default_languages() -> Vec<Language> {
    DEFAULT_LANGUAGES
        .iter()
        .map(|&(name, text)| Language::new(name, text))
        .collect()
}

/// Чтение таблицы языков, по строке `Name | text`.
///
/// Порядок сохраняется, повтор названия игнорируется (побеждает первое).
pub fn read_languages<R: io::Read>(reader: R) -> io::Result<Vec<Language>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let buf = BufReader::new(reader);

    for (idx, line) in buf.lines().enumerate() {
        let line = line?;
        if let Some(lang) = parse_line(&line).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("line {}: {e}", idx + 1))
        })? {
            if seen.insert(lang.name.clone()) {
                out.push(lang);
            }
        }
    }

    Ok(out)
}

/// Чтение таблицы языков из файла
pub fn read_languages_from_path(path: impl AsRef<Path>) -> io::Result<Vec<Language>> {
    let f = File::open(path)?;
    read_languages(f)
}

fn parse_line(line: &str) -> Result<Option<Language>, String> {
    let s = line.trim();
    if s.is_empty() || s.starts_with('#') {
        return Ok(None);
    }

    // Поддержка inline-комментариев: "Korean | 런던 증권 거래소 # comment"
    let s = s.split('#').next().unwrap_or("").trim();
    if s.is_empty() {
        return Ok(None);
    }

    let (name, text) = s
        .split_once('|')
        .ok_or_else(|| format!("expected `Name | text`, got {s:?}"))?;
    let (name, text) = (name.trim(), text.trim());

    if name.is_empty() || text.is_empty() {
        return Err(format!("empty name or text in {s:?}"));
    }
    if !name.is_ascii() {
        return Err(format!("language name must be ascii: {name:?}"));
    }

    Ok(Some(Language::new(name, text)))
}
