pub mod gif;

pub use gif::{GifConfig, encode_gif};

use std::path::Path;

use crate::foundation::error::ConvertResult;

pub fn ensure_parent_dir(path: &Path) -> ConvertResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}
