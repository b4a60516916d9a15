use rmtes_core::ViewDescriptor;
use thiserror::Error;

use crate::cli::Args;

#[derive(Debug, Error)]
pub(crate) enum ViewError {
    #[error("view is empty (--view value: {raw:?})")]
    Empty { raw: String },

    #[error("bad field id {item:?} in --view")]
    BadFid {
        item: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

pub(crate) type Result<T> = std::result::Result<T, ViewError>;

/// View из CLI: `None` при `--no-view`
pub(crate) fn load_view(args: &Args) -> Result<Option<ViewDescriptor>> {
    if args.no_view {
        return Ok(None);
    }
    parse_view_csv(&args.view).map(Some)
}

/// "15, 22,25" -> {15, 22, 25}. Повторы схлопываются.
pub(crate) fn parse_view_csv(raw: &str) -> Result<ViewDescriptor> {
    let fids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i16>().map_err(|e| ViewError::BadFid {
                item: s.to_string(),
                source: e,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if fids.is_empty() {
        return Err(ViewError::Empty {
            raw: raw.to_string(),
        });
    }

    Ok(ViewDescriptor::new(fids))
}
