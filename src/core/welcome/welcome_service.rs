// The welcome module from the operator's point of view.
// This file knows nothing about HTTP: it talks to the backend through the
// `WelcomeApi` trait, which the infra layer implements with reqwest.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use super::welcome_models::{JoinUpdate, MessageType, WelcomeModule, WelcomeUpdate};
use crate::core::embed::{
    ConversionError, EmbedDraft, EmbedValidator, ImageSlot, LocalFile, StoredEmbed,
    UploadedImages, ValidationErrors,
};

#[derive(Debug, Error)]
pub enum WelcomeError {
    #[error("Welcome API error: {0}")]
    Api(String),
    #[error("Welcome API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("Failed to read {}: {}", .path.display(), .source)]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode embed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One image to upload, addressed by the slot it will fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub slot: ImageSlot,
    pub file: LocalFile,
}

/// Typed access to the welcome endpoints of the active guild.
#[async_trait]
pub trait WelcomeApi: Send + Sync {
    async fn fetch_module(&self) -> Result<WelcomeModule, WelcomeError>;
    async fn save_module(&self, update: &WelcomeUpdate) -> Result<(), WelcomeError>;
    async fn upload_images(&self, images: &[ImageUpload]) -> Result<UploadedImages, WelcomeError>;
}

/// A join message as the operator wrote it. Settings left as None keep their
/// current value on the backend.
#[derive(Debug, Clone, Default)]
pub struct JoinMessageDraft {
    pub enabled: Option<bool>,
    pub channel_id: Option<String>,
    pub content: Option<String>,
    pub embed: EmbedDraft,
}

pub struct WelcomeService<A: WelcomeApi> {
    api: A,
}

impl<A: WelcomeApi> WelcomeService<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn load(&self) -> Result<WelcomeModule, WelcomeError> {
        self.api.fetch_module().await
    }

    /// Switch the whole module on or off without touching its sections.
    pub async fn set_enabled(&self, enabled: bool) -> Result<(), WelcomeError> {
        let update = WelcomeUpdate {
            enabled: Some(enabled),
            ..Default::default()
        };
        self.api.save_module(&update).await
    }

    /// Validate, upload and save a join message in one go.
    ///
    /// Local images are uploaded first and replaced by their hosted URLs, so
    /// the embed that reaches the backend is always fully resolved.
    pub async fn publish_join_message(
        &self,
        draft: JoinMessageDraft,
    ) -> Result<WelcomeUpdate, WelcomeError> {
        let JoinMessageDraft {
            enabled,
            channel_id,
            content,
            mut embed,
        } = draft;

        EmbedValidator::validate(&embed)?;

        let uploads: Vec<ImageUpload> = embed
            .pending_uploads()
            .into_iter()
            .map(|(slot, file)| ImageUpload {
                slot,
                file: file.clone(),
            })
            .collect();

        if !uploads.is_empty() {
            tracing::info!(count = uploads.len(), "Uploading embed images");
            let uploaded = self.api.upload_images(&uploads).await?;
            let resolved = embed.apply_uploads(&uploaded);
            tracing::debug!(resolved, "Applied uploaded image URLs");
        }

        // The bot reads the stored shape, not Discord's wire shape.
        let embed = serde_json::to_value(StoredEmbed::from(embed.into_embed()?))?;

        // The backend overwrites the whole join section, so carry over
        // whatever the operator did not change.
        let current = self.api.fetch_module().await?.join.unwrap_or_default();
        let update = WelcomeUpdate {
            join: Some(JoinUpdate {
                enabled: enabled.or(current.enabled).or(Some(true)),
                message_type: Some(MessageType::Embed),
                channel_id: channel_id.or(current.channel_id),
                content: content.or(current.content),
                embed: Some(embed),
            }),
            ..Default::default()
        };

        self.api.save_module(&update).await?;
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::embed::embed_models::{DraftAuthor, DraftColor, ImageSource};
    use crate::core::welcome::welcome_models::JoinSettings;
    use std::sync::Mutex;

    /// Records every call and answers uploads with predictable URLs.
    #[derive(Default)]
    struct RecordingApi {
        module: WelcomeModule,
        saved: Mutex<Vec<WelcomeUpdate>>,
        uploads: Mutex<Vec<Vec<ImageUpload>>>,
        fail_uploads: bool,
    }

    #[async_trait]
    impl WelcomeApi for RecordingApi {
        async fn fetch_module(&self) -> Result<WelcomeModule, WelcomeError> {
            Ok(self.module.clone())
        }

        async fn save_module(&self, update: &WelcomeUpdate) -> Result<(), WelcomeError> {
            self.saved.lock().unwrap().push(update.clone());
            Ok(())
        }

        async fn upload_images(
            &self,
            images: &[ImageUpload],
        ) -> Result<UploadedImages, WelcomeError> {
            if self.fail_uploads {
                return Err(WelcomeError::Status {
                    status: 500,
                    message: "No imgur client id set".into(),
                });
            }
            self.uploads.lock().unwrap().push(images.to_vec());
            let mut uploaded = UploadedImages::default();
            for image in images {
                uploaded.insert(
                    image.slot,
                    format!("https://i.imgur.com/{}", image.file.file_name()),
                );
            }
            Ok(uploaded)
        }
    }

    fn existing_module() -> WelcomeModule {
        WelcomeModule {
            id: 1,
            guild_id: "123".into(),
            enabled: true,
            join: Some(JoinSettings {
                enabled: Some(false),
                message_type: Some("text".into()),
                channel_id: Some("555".into()),
                content: Some("Hi {user}".into()),
                embed: None,
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn publishing_uploads_local_images_first() {
        let service = WelcomeService::new(RecordingApi {
            module: existing_module(),
            ..Default::default()
        });

        let draft = JoinMessageDraft {
            embed: EmbedDraft {
                title: Some("Welcome".into()),
                image: Some(ImageSource::File(LocalFile::new("img/banner.png"))),
                author: Some(DraftAuthor {
                    name: Some("Bot".into()),
                    url: None,
                    image: Some(ImageSource::Url("https://cdn.example.com/bot.png".into())),
                }),
                ..Default::default()
            },
            ..Default::default()
        };

        let update = service.publish_join_message(draft).await.unwrap();

        let uploads = service.api().uploads.lock().unwrap().clone();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].len(), 1);
        assert_eq!(uploads[0][0].slot, ImageSlot::Image);

        let join = update.join.unwrap();
        let embed = join.embed.unwrap();
        assert_eq!(embed["image"], "https://i.imgur.com/banner.png");
        assert_eq!(embed["author"]["image"], "https://cdn.example.com/bot.png");
        assert_eq!(join.message_type, Some(MessageType::Embed));

        let saved = service.api().saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
    }

    #[tokio::test]
    async fn publishing_keeps_unchanged_join_settings() {
        let service = WelcomeService::new(RecordingApi {
            module: existing_module(),
            ..Default::default()
        });

        let update = service
            .publish_join_message(JoinMessageDraft {
                content: Some("Glad you're here".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let join = update.join.unwrap();
        assert_eq!(join.channel_id.as_deref(), Some("555"));
        assert_eq!(join.content.as_deref(), Some("Glad you're here"));
        assert_eq!(join.enabled, Some(false));
        assert!(service.api().uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_embeds_are_never_sent() {
        let service = WelcomeService::new(RecordingApi::default());

        let err = service
            .publish_join_message(JoinMessageDraft {
                embed: EmbedDraft {
                    url: Some("not-a-url".into()),
                    image: Some(ImageSource::File(LocalFile::new("banner.png"))),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WelcomeError::Validation(ref e) if e.has_path("url")));
        assert!(service.api().uploads.lock().unwrap().is_empty());
        assert!(service.api().saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_uploads_abort_the_save() {
        let service = WelcomeService::new(RecordingApi {
            fail_uploads: true,
            ..Default::default()
        });

        let err = service
            .publish_join_message(JoinMessageDraft {
                embed: EmbedDraft {
                    thumbnail: Some(ImageSource::File(LocalFile::new("t.png"))),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WelcomeError::Status { status: 500, .. }));
        assert!(service.api().saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggling_only_sends_the_enabled_flag() {
        let service = WelcomeService::new(RecordingApi::default());
        service.set_enabled(false).await.unwrap();

        let saved = service.api().saved.lock().unwrap();
        assert_eq!(
            saved.as_slice(),
            &[WelcomeUpdate {
                enabled: Some(false),
                ..Default::default()
            }]
        );
    }

    #[tokio::test]
    async fn published_embed_uses_the_stored_shape() {
        let service = WelcomeService::new(RecordingApi::default());

        let update = service
            .publish_join_message(JoinMessageDraft {
                embed: EmbedDraft {
                    title: Some("Hi".into()),
                    color: Some(DraftColor::Code(0xff0000)),
                    thumbnail: Some(ImageSource::Url("https://i.imgur.com/t.png".into())),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await
            .unwrap();

        let embed = update.join.and_then(|j| j.embed).unwrap();
        assert_eq!(
            embed,
            serde_json::json!({
                "color": "#ff0000",
                "thumbnail": "https://i.imgur.com/t.png",
                "title": "Hi"
            })
        );
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = WelcomeError::Status {
            status: 404,
            message: "guild not found".into(),
        };
        assert_eq!(err.to_string(), "Welcome API returned 404: guild not found");

        let err = WelcomeError::ReadFile {
            path: PathBuf::from("img/banner.png"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "Failed to read img/banner.png: not found");
    }
}
