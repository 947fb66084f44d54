use crate::error::{ClientError, Result};
use reqwest::multipart::Part;
use std::path::Path;

/// An image picked for upload, held in memory until the request is built.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// `image/<extension>`, or just `image` when the name has none.
#[must_use]
pub fn mime_type_for(file_name: &str) -> String {
    match Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
    {
        Some(extension) => format!("image/{}", extension.to_ascii_lowercase()),
        None => "image".to_owned(),
    }
}

impl ImageUpload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        Self {
            mime_type: mime_type_for(&file_name),
            file_name,
            bytes,
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::Image {
                path: path.display().to_string(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_owned(), |name| name.to_string_lossy().into_owned());

        Ok(Self::new(file_name, bytes))
    }

    /// A bare `image` is not a valid MIME type, so such parts go out without a content type.
    pub(crate) fn into_part(self) -> Result<Part> {
        let part = Part::bytes(self.bytes).file_name(self.file_name.clone());
        if !self.mime_type.contains('/') {
            return Ok(part);
        }

        part.mime_str(&self.mime_type).map_err(|source| ClientError::ImageType {
            file_name: self.file_name,
            mime_type: self.mime_type,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::ClientError, upload::{ImageUpload, mime_type_for}};

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(mime_type_for("pochi.JPG"), "image/jpg");
        assert_eq!(mime_type_for("dir/pochi.png"), "image/png");
        assert_eq!(mime_type_for("pochi"), "image");
    }

    #[tokio::test]
    async fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tama.jpeg");
        std::fs::write(&path, b"not really a jpeg").unwrap();

        let upload = ImageUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "tama.jpeg");
        assert_eq!(upload.mime_type, "image/jpeg");
        assert_eq!(upload.bytes, b"not really a jpeg");

        let missing = ImageUpload::from_path(dir.path().join("missing.png")).await;
        assert!(matches!(missing, Err(ClientError::Image { .. })));
    }

    #[test]
    fn unparsable_content_type_fails_locally() {
        let upload = ImageUpload::new("odd.j pg", b"bytes".to_vec());
        assert_eq!(upload.mime_type, "image/j pg");
        assert!(matches!(
            upload.into_part(),
            Err(ClientError::ImageType { file_name, .. }) if file_name == "odd.j pg"
        ));

        assert!(ImageUpload::new("plain", Vec::new()).into_part().is_ok());
        assert!(ImageUpload::new("photo.png", Vec::new()).into_part().is_ok());
    }
}
