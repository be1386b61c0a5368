use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::embed::UploadedImages;
use crate::core::guild::ActiveGuild;
use crate::core::welcome::{
    ApiErrorMessage, ImageUpload, WelcomeApi, WelcomeError, WelcomeModule, WelcomeUpdate,
};
use crate::infra::http::{self, HttpError, PostOverrides};

/// Client for the `/{guild}/welcome` endpoints.
///
/// The URL is rebuilt on every call from the shared `ActiveGuild`, so
/// switching guilds takes effect for the very next request.
#[derive(Clone)]
pub struct WelcomeApiClient {
    client: Client,
    base_url: String,
    guild: ActiveGuild,
}

impl WelcomeApiClient {
    pub fn new(base_url: impl Into<String>, guild: ActiveGuild) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            guild,
        }
    }

    pub fn module_url(&self) -> String {
        format!("{}/{}/welcome", self.base_url, self.guild.get())
    }

    pub fn images_url(&self) -> String {
        format!("{}/images", self.module_url())
    }

    pub fn fetch_request(&self) -> Result<Request, HttpError> {
        Ok(self.client.get(self.module_url()).build()?)
    }

    // ------------------------------------------------------------------------
    // Raw operations: the response is returned as-is.
    // ------------------------------------------------------------------------

    pub async fn fetch_module_data(&self) -> Result<Response, HttpError> {
        let request = self.fetch_request()?;
        tracing::debug!(url = %request.url(), "GET");
        Ok(self.client.execute(request).await?)
    }

    pub async fn post_module_data<T: Serialize + ?Sized>(
        &self,
        data: &T,
    ) -> Result<Response, HttpError> {
        http::post(&self.client, &self.module_url(), data, None).await
    }

    pub async fn upload_module_images(&self, form: Form) -> Result<Response, HttpError> {
        http::post(
            &self.client,
            &self.images_url(),
            &(),
            Some(PostOverrides::multipart(form)),
        )
        .await
    }
}

/// Build the multipart form for a set of uploads. Files are read here so a
/// missing file fails before anything is sent.
pub async fn image_form(images: &[ImageUpload]) -> Result<Form, WelcomeError> {
    let mut form = Form::new();
    for image in images {
        let bytes = tokio::fs::read(&image.file.path)
            .await
            .map_err(|source| WelcomeError::ReadFile {
                path: image.file.path.clone(),
                source,
            })?;
        let part = Part::bytes(bytes).file_name(image.file.file_name());
        form = form.part(image.slot.part_name(), part);
    }
    Ok(form)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, WelcomeError> {
    let response = check_status(response).await?;
    response
        .json()
        .await
        .map_err(|e| WelcomeError::Api(format!("Invalid response body: {}", e)))
}

/// Turn a non-success status into `WelcomeError::Status`, preferring the
/// message from the backend's error body.
async fn check_status(response: Response) -> Result<Response, WelcomeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorMessage>(&text)
        .map(|body| body.message)
        .unwrap_or(text);
    tracing::warn!(status = status.as_u16(), %message, "Welcome API request failed");

    Err(WelcomeError::Status {
        status: status.as_u16(),
        message,
    })
}

impl From<HttpError> for WelcomeError {
    fn from(error: HttpError) -> Self {
        WelcomeError::Api(error.to_string())
    }
}

#[async_trait]
impl WelcomeApi for WelcomeApiClient {
    async fn fetch_module(&self) -> Result<WelcomeModule, WelcomeError> {
        let module: WelcomeModule = decode(self.fetch_module_data().await?).await?;
        tracing::info!(guild_id = %module.guild_id, enabled = module.enabled, "Fetched welcome module");
        Ok(module)
    }

    async fn save_module(&self, update: &WelcomeUpdate) -> Result<(), WelcomeError> {
        check_status(self.post_module_data(update).await?).await?;
        tracing::info!(guild_id = %self.guild.get(), "Saved welcome module");
        Ok(())
    }

    async fn upload_images(&self, images: &[ImageUpload]) -> Result<UploadedImages, WelcomeError> {
        let form = image_form(images).await?;
        let uploaded: UploadedImages = decode(self.upload_module_images(form).await?).await?;
        tracing::info!(count = uploaded.len(), "Uploaded welcome images");
        Ok(uploaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::embed::{ImageSlot, LocalFile};
    use reqwest::Method;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn fetch_url_follows_the_active_guild() {
        let guild = ActiveGuild::new("1");
        let client = WelcomeApiClient::new("http://localhost:3030", guild.clone());

        guild.set("123");
        let request = client.fetch_request().unwrap();

        assert_eq!(request.method(), Method::GET);
        assert!(request.url().as_str().contains("123"));
        assert_eq!(
            request.url().as_str(),
            "http://localhost:3030/123/welcome"
        );
    }

    #[test]
    fn urls_are_computed_per_call() {
        let guild = ActiveGuild::new("111");
        let client = WelcomeApiClient::new("http://localhost:3030/", guild.clone());
        assert_eq!(client.module_url(), "http://localhost:3030/111/welcome");

        guild.set("222");
        assert_eq!(client.images_url(), "http://localhost:3030/222/welcome/images");
    }

    #[tokio::test]
    async fn image_form_reads_files_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\x89PNG").unwrap();

        let form = image_form(&[ImageUpload {
            slot: ImageSlot::Thumbnail,
            file: LocalFile::new(file.path()),
        }])
        .await
        .unwrap();

        assert!(!form.boundary().is_empty());
    }

    #[tokio::test]
    async fn image_form_fails_on_missing_files() {
        let err = image_form(&[ImageUpload {
            slot: ImageSlot::Image,
            file: LocalFile::new("/definitely/not/here.png"),
        }])
        .await
        .unwrap_err();

        assert!(matches!(err, WelcomeError::ReadFile { .. }));
        assert!(err
            .to_string()
            .starts_with("Failed to read /definitely/not/here.png"));
    }
}
