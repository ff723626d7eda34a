//! Image preview loading: fetch bytes behind an `ImageRef` and decode them to RGBA.

use reqwest::Client as HttpClient;
use shared::domain::ImageRef;
use url::Url;

const PREVIEW_MAX_DIMENSION: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewSlot {
    Input,
    Output,
}

#[derive(Clone)]
pub struct PreviewImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

/// Local references are read from disk, anything else is fetched over HTTP.
pub async fn load_image_bytes(http: &HttpClient, image: &ImageRef) -> Result<Vec<u8>, String> {
    if image.is_local() {
        let path = Url::parse(image.as_str())
            .map_err(|err| err.to_string())?
            .to_file_path()
            .map_err(|()| format!("not a local file path: {image}"))?;
        tokio::fs::read(&path)
            .await
            .map_err(|err| format!("failed to read {}: {err}", path.display()))
    } else {
        let bytes = http
            .get(image.as_str())
            .send()
            .await
            .map_err(|err| err.to_string())?
            .error_for_status()
            .map_err(|err| err.to_string())?
            .bytes()
            .await
            .map_err(|err| err.to_string())?;
        Ok(bytes.to_vec())
    }
}

pub fn decode_preview_image(bytes: &[u8]) -> Result<PreviewImage, String> {
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let resized = if dynamic.width() > PREVIEW_MAX_DIMENSION
        || dynamic.height() > PREVIEW_MAX_DIMENSION
    {
        dynamic.thumbnail(PREVIEW_MAX_DIMENSION, PREVIEW_MAX_DIMENSION)
    } else {
        dynamic
    }
    .to_rgba8();
    let width = resized.width() as usize;
    let height = resized.height() as usize;
    Ok(PreviewImage {
        width,
        height,
        rgba: resized.into_raw(),
    })
}

pub async fn load_preview(http: &HttpClient, image: &ImageRef) -> Result<PreviewImage, String> {
    let bytes = load_image_bytes(http, image).await?;
    decode_preview_image(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::header, routing::get, Router};
    use std::{
        io::Cursor,
        time::{SystemTime, UNIX_EPOCH},
    };
    use tokio::net::TcpListener;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 90, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }

    #[test]
    fn decodes_png_to_rgba() {
        let preview = decode_preview_image(&png_bytes(3, 2)).expect("decode");
        assert_eq!((preview.width, preview.height), (3, 2));
        assert_eq!(preview.rgba.len(), 3 * 2 * 4);
        assert_eq!(&preview.rgba[..4], &[200, 40, 90, 255]);
    }

    #[test]
    fn large_images_are_scaled_down() {
        let preview = decode_preview_image(&png_bytes(2048, 512)).expect("decode");
        assert_eq!(preview.width, 1024);
        assert_eq!(preview.height, 256);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_preview_image(b"definitely not an image").is_err());
    }

    #[tokio::test]
    async fn loads_local_file_reference() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("artify_preview_{suffix}.png"));
        std::fs::write(&path, png_bytes(4, 4)).expect("write png");
        let image = ImageRef(Url::from_file_path(&path).expect("file url").to_string());

        let preview = load_preview(&HttpClient::new(), &image)
            .await
            .expect("preview");
        assert_eq!((preview.width, preview.height), (4, 4));

        std::fs::remove_file(path).expect("cleanup");
    }

    #[tokio::test]
    async fn missing_local_file_is_an_error() {
        let path = std::env::temp_dir().join("artify_preview_never_written.png");
        let image = ImageRef(Url::from_file_path(&path).expect("file url").to_string());
        let err = load_image_bytes(&HttpClient::new(), &image)
            .await
            .expect_err("must fail");
        assert!(err.contains("failed to read"), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn fetches_remote_reference() {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let body = png_bytes(5, 3);
        let app = Router::new().route(
            "/x.png",
            get(move || {
                let body = body.clone();
                async move { ([(header::CONTENT_TYPE, "image/png")], body) }
            }),
        );
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let image = ImageRef::remote(format!("http://{addr}/x.png"));
        let preview = load_preview(&HttpClient::new(), &image)
            .await
            .expect("preview");
        assert_eq!((preview.width, preview.height), (5, 3));

        let missing = ImageRef::remote(format!("http://{addr}/missing.png"));
        assert!(load_image_bytes(&HttpClient::new(), &missing).await.is_err());
    }
}
