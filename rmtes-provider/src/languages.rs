use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

use rmtes_core::languages::{Language, read_languages, read_languages_from_path};

use crate::config::DEFAULT_LANGUAGES;

#[derive(Debug, Error)]
pub(crate) enum LanguagesError {
    #[error("languages table is empty (file: {path:?})")]
    EmptyFromFile { path: PathBuf },

    #[error("failed to read languages file: {path:?}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Встроенная таблица не разобралась
    #[error("built-in languages table is broken")]
    Builtin(#[source] std::io::Error),
}

pub(crate) type Result<T> = std::result::Result<T, LanguagesError>;

/// Таблица из `--languages-file` или встроенная
pub(crate) fn load_languages(path: Option<&Path>) -> Result<Vec<Language>> {
    match path {
        Some(p) => load_from_file(p),
        None => read_languages(Cursor::new(DEFAULT_LANGUAGES)).map_err(LanguagesError::Builtin),
    }
}

fn load_from_file(path: &Path) -> Result<Vec<Language>> {
    let path = path.to_path_buf();

    let languages =
        read_languages_from_path(&path).map_err(|e| LanguagesError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

    if languages.is_empty() {
        return Err(LanguagesError::EmptyFromFile { path });
    }

    Ok(languages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmtes_core::languages::default_languages;

    #[test]
    fn builtin_table_matches_core_defaults() {
        assert_eq!(load_languages(None).unwrap(), default_languages());
    }

    #[test]
    fn file_table_is_used_when_given() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("langs.txt");
        std::fs::write(&path, "# only one\nKorean | 런던 증권 거래소\n").unwrap();

        let got = load_languages(Some(&path)).unwrap();
        assert_eq!(got, vec![Language::new("Korean", "런던 증권 거래소")]);
    }

    #[test]
    fn empty_and_missing_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "# nothing\n\n").unwrap();

        assert!(matches!(
            load_languages(Some(&path)),
            Err(LanguagesError::EmptyFromFile { .. })
        ));
        assert!(matches!(
            load_languages(Some(&dir.path().join("missing.txt"))),
            Err(LanguagesError::ReadFile { .. })
        ));
    }
}
