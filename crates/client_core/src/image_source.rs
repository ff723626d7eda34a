use std::path::Path;

use shared::{domain::ImageRef, error::ImageSourceError};
use url::Url;

/// Turns a picked file into a `file://` reference. The file is not opened, so any
/// selection is accepted as-is.
pub fn load_local_image(path: impl AsRef<Path>) -> Result<ImageRef, ImageSourceError> {
    let path = path.as_ref();
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|_| ImageSourceError::CurrentDir(path.display().to_string()))?
            .join(path)
    };

    let url = Url::from_file_path(&absolute)
        .map_err(|()| ImageSourceError::Unrepresentable(absolute.display().to_string()))?;
    Ok(ImageRef(url.to_string()))
}
