// Turning an edit-time draft into a wire embed.
//
// **The resolution step:**
// A draft may still reference local files. Those must be uploaded first and
// swapped for the returned URLs (`apply_uploads`); only then can the draft be
// converted. `into_embed` refuses to guess and reports the first unresolved
// field instead.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::embed_models::{
    DraftAuthor, DraftColor, DraftFooter, Embed, EmbedAuthor, EmbedDraft, EmbedFooter,
    EmbedImage, EmbedThumbnail, ImageSlot, ImageSource, LocalFile, StoredAuthor, StoredEmbed,
    StoredFooter, UploadedImages,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("'{field}' still points at a local file; upload it first")]
    UnresolvedFile { field: &'static str },
}

impl EmbedDraft {
    fn slot(&self, slot: ImageSlot) -> Option<&ImageSource> {
        match slot {
            ImageSlot::AuthorImage => self.author.as_ref().and_then(|a| a.image.as_ref()),
            ImageSlot::Image => self.image.as_ref(),
            ImageSlot::Thumbnail => self.thumbnail.as_ref(),
            ImageSlot::FooterImage => self.footer.as_ref().and_then(|f| f.image.as_ref()),
        }
    }

    fn slot_mut(&mut self, slot: ImageSlot) -> Option<&mut ImageSource> {
        match slot {
            ImageSlot::AuthorImage => self.author.as_mut().and_then(|a| a.image.as_mut()),
            ImageSlot::Image => self.image.as_mut(),
            ImageSlot::Thumbnail => self.thumbnail.as_mut(),
            ImageSlot::FooterImage => self.footer.as_mut().and_then(|f| f.image.as_mut()),
        }
    }

    /// Every image that still needs uploading, in slot order.
    pub fn pending_uploads(&self) -> Vec<(ImageSlot, &LocalFile)> {
        ImageSlot::ALL
            .into_iter()
            .filter_map(|slot| match self.slot(slot) {
                Some(ImageSource::File(file)) => Some((slot, file)),
                _ => None,
            })
            .collect()
    }

    /// Swap local files for the URLs the upload endpoint handed back.
    /// Returns how many slots were resolved.
    pub fn apply_uploads(&mut self, uploaded: &UploadedImages) -> usize {
        let mut resolved = 0;
        for slot in ImageSlot::ALL {
            let Some(url) = uploaded.url_for(slot) else {
                continue;
            };
            if let Some(source) = self.slot_mut(slot) {
                if source.is_file() {
                    *source = ImageSource::Url(url.to_string());
                    resolved += 1;
                }
            }
        }
        resolved
    }

    /// Make relative file paths relative to `base` (the draft's own directory).
    pub fn rebase_local_files(&mut self, base: &Path) {
        for slot in ImageSlot::ALL {
            if let Some(ImageSource::File(file)) = self.slot_mut(slot) {
                if file.path.is_relative() {
                    file.path = base.join(&file.path);
                }
            }
        }
    }

    /// Convert to the wire format. Fails if any image is still a local file.
    pub fn into_embed(self) -> Result<Embed, ConversionError> {
        if let Some((slot, _)) = self.pending_uploads().first() {
            return Err(ConversionError::UnresolvedFile {
                field: slot.field_path(),
            });
        }

        Ok(Embed {
            title: self.title,
            description: self.description,
            url: self.url,
            timestamp: self.timestamp,
            color: self.color.map(|c| c.to_code()),
            footer: self.footer.map(|f| EmbedFooter {
                text: f.text,
                icon_url: f.image.and_then(into_url),
            }),
            image: self.image.and_then(into_url).map(|url| EmbedImage {
                url: Some(url),
                ..Default::default()
            }),
            thumbnail: self.thumbnail.and_then(into_url).map(|url| EmbedThumbnail {
                url: Some(url),
                ..Default::default()
            }),
            author: self.author.map(|a| EmbedAuthor {
                name: a.name,
                url: a.url,
                icon_url: a.image.and_then(into_url),
            }),
            fields: self.fields,
        })
    }
}

/// Stored embeds come back in wire format; editing starts from a draft.
/// Image dimensions are dropped since the backend never sets them.
impl From<Embed> for EmbedDraft {
    fn from(embed: Embed) -> Self {
        EmbedDraft {
            title: embed.title,
            description: embed.description,
            url: embed.url,
            timestamp: embed.timestamp,
            color: embed.color.map(DraftColor::Code),
            footer: embed.footer.map(|f| DraftFooter {
                text: f.text,
                image: f.icon_url.map(ImageSource::Url),
            }),
            image: embed.image.and_then(|i| i.url).map(ImageSource::Url),
            thumbnail: embed.thumbnail.and_then(|t| t.url).map(ImageSource::Url),
            author: embed.author.map(|a| DraftAuthor {
                name: a.name,
                url: a.url,
                image: a.icon_url.map(ImageSource::Url),
            }),
            fields: embed.fields,
        }
    }
}

/// The backend's storage shape: colour as `#rrggbb`, images as bare URLs.
impl From<Embed> for StoredEmbed {
    fn from(embed: Embed) -> Self {
        StoredEmbed {
            author: embed.author.map(|a| StoredAuthor {
                image: a.icon_url,
                name: a.name,
                url: a.url,
            }),
            color: embed.color.map(|c| format!("#{:06x}", c & 0xff_ffff)),
            description: embed.description,
            fields: embed.fields,
            footer: embed.footer.map(|f| StoredFooter {
                image: f.icon_url,
                text: Some(f.text).filter(|t| !t.is_empty()),
            }),
            image: embed.image.and_then(|i| i.url),
            thumbnail: embed.thumbnail.and_then(|t| t.url),
            timestamp: embed.timestamp,
            title: embed.title,
            url: embed.url,
        }
    }
}

impl From<StoredEmbed> for EmbedDraft {
    fn from(stored: StoredEmbed) -> Self {
        EmbedDraft {
            title: stored.title,
            description: stored.description,
            url: stored.url,
            timestamp: stored.timestamp,
            color: stored.color.map(DraftColor::Text),
            footer: stored.footer.map(|f| DraftFooter {
                text: f.text.unwrap_or_default(),
                image: f.image.map(ImageSource::Url),
            }),
            image: stored.image.map(ImageSource::Url),
            thumbnail: stored.thumbnail.map(ImageSource::Url),
            author: stored.author.map(|a| DraftAuthor {
                name: a.name,
                url: a.url,
                image: a.image.map(ImageSource::Url),
            }),
            fields: stored.fields,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SavedEmbed {
    Stored(StoredEmbed),
    Wire(Embed),
}

impl EmbedDraft {
    /// Reopen an embed as the backend returned it. Accepts the stored shape
    /// and, failing that, the wire shape.
    pub fn from_saved_json(value: serde_json::Value) -> Result<EmbedDraft, serde_json::Error> {
        Ok(match serde_json::from_value(value)? {
            SavedEmbed::Stored(stored) => stored.into(),
            SavedEmbed::Wire(embed) => embed.into(),
        })
    }
}

fn into_url(source: ImageSource) -> Option<String> {
    match source {
        ImageSource::Url(url) if !url.is_empty() => Some(url),
        _ => None,
    }
}

impl DraftColor {
    /// `0xRRGGBB`. Unparsable CSS strings become black.
    pub fn to_code(&self) -> u32 {
        match self {
            DraftColor::Code(code) => *code,
            DraftColor::Text(text) => css_to_code(text),
        }
    }
}

fn css_to_code(text: &str) -> u32 {
    let color = match csscolorparser::parse(text) {
        Ok(color) => color,
        Err(e) => {
            tracing::warn!(color = %text, "Unparsable embed colour, using black: {e}");
            return 0;
        }
    };
    let [r, g, b, _] = color.to_rgba8();
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}
