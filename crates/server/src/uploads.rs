//! Blob service client used for image uploads.

use async_trait::async_trait;
use leaflet_app::{ProviderError, UploadProvider};
use reqwest::Url;

/// Talks to an external blob service.
///
/// Uploads go to `{base}/upload`, blobs are served from `{base}/blobs/{key}`
/// and deleted with `DELETE {base}/blobs/{key}`.
#[derive(Clone)]
pub struct BlobServiceUploads {
    http: reqwest::Client,
    base_url: Url,
}

impl BlobServiceUploads {
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| ProviderError(format!("invalid blob service URL '{base_url}': {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn blob_url(&self, key: &str) -> Result<Url, ProviderError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ProviderError(format!("invalid blob key '{key}'")));
        }
        self.base_url
            .join(&format!("blobs/{key}"))
            .map_err(|e| ProviderError(format!("failed to build blob URL: {e}")))
    }
}

#[async_trait]
impl UploadProvider for BlobServiceUploads {
    fn upload_url(&self, destination: &str, max_bytes: u64) -> Result<String, ProviderError> {
        let mut url = self
            .base_url
            .join("upload")
            .map_err(|e| ProviderError(format!("failed to build upload URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("success_path", destination)
            .append_pair("max_bytes", &max_bytes.to_string());
        Ok(url.into())
    }

    fn serving_url(
        &self,
        blob_key: &str,
        secure: bool,
        size: Option<u32>,
    ) -> Result<String, ProviderError> {
        let mut url = self.blob_url(blob_key)?;
        if secure && url.scheme() == "http" {
            url.set_scheme("https")
                .map_err(|()| ProviderError("cannot serve blob over https".to_string()))?;
        }
        if let Some(size) = size {
            url.query_pairs_mut().append_pair("s", &size.to_string());
        }
        Ok(url.into())
    }

    async fn delete_blob(&self, blob_key: &str) -> Result<(), ProviderError> {
        let url = self.blob_url(blob_key)?;
        let response = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| ProviderError(format!("blob service request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError(format!(
                "blob service error ({status}): {body}"
            )));
        }
        tracing::debug!(key = blob_key, "blob deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_url() {
        let uploads = BlobServiceUploads::new("http://blobs.test").unwrap();
        let url = uploads.upload_url("/v1/images", 1000).unwrap();
        assert_eq!(
            url,
            "http://blobs.test/upload?success_path=%2Fv1%2Fimages&max_bytes=1000"
        );
    }

    #[test]
    fn test_serving_url() {
        let uploads = BlobServiceUploads::new("http://blobs.test/media/").unwrap();
        assert_eq!(
            uploads.serving_url("abc", false, None).unwrap(),
            "http://blobs.test/media/blobs/abc"
        );
        assert_eq!(
            uploads.serving_url("abc", true, Some(64)).unwrap(),
            "https://blobs.test/media/blobs/abc?s=64"
        );
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let uploads = BlobServiceUploads::new("http://blobs.test/").unwrap();
        assert!(uploads.serving_url("../secret", false, None).is_err());
        assert!(uploads.serving_url("", false, None).is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(BlobServiceUploads::new("not a url").is_err());
    }
}
