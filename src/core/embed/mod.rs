pub mod embed_conversion;
pub mod embed_models;
pub mod embed_validator;

pub use embed_conversion::ConversionError;
pub use embed_models::{Embed, EmbedDraft, ImageSlot, LocalFile, StoredEmbed, UploadedImages};
pub use embed_validator::{EmbedValidator, ValidationErrors};
