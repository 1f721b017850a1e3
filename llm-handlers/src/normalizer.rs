//! Input normalization: turns a tagged inbound event into a [`ContentUnit`].
//!
//! Images are materialized to a process-local temp file owned by a [`TempMedia`]
//! guard; PDF documents have their page text extracted with lopdf and the temp
//! file dropped immediately after extraction. Non-PDF documents are rejected
//! with a user-visible message.

use anyhow::Context;
use async_trait::async_trait;
use gbot_core::{ContentKind, ContentUnit, InboundEvent, PhotoAttachment};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Prompt used when an image arrives without a caption.
pub const DEFAULT_IMAGE_PROMPT: &str = "describe the image";

/// Reply for document kinds other than PDF.
pub const UNSUPPORTED_DOCUMENT_REPLY: &str = "Only PDF documents are supported.";

/// Fetches raw attachment bytes by transport file id. The Telegram
/// implementation lives at the transport edge; tests substitute their own.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, file_id: &str) -> anyhow::Result<Vec<u8>>;
}

/// Scoped temporary media file: the path is deleted when the guard drops, on
/// every exit path. Deletion failures are swallowed.
#[derive(Debug)]
pub struct TempMedia {
    path: PathBuf,
}

impl TempMedia {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempMedia {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "Temp media cleanup failed");
        }
    }
}

/// Outcome of normalization.
pub enum Normalized {
    /// A unit ready for model invocation, with the temp file guard when media
    /// was materialized.
    Unit {
        unit: ContentUnit,
        media: Option<TempMedia>,
    },
    /// Input the bot does not accept; `reply` goes to the user, no unit is
    /// produced and no state is mutated.
    Reject { reply: String },
    /// A PDF with no extractable text; the caller short-circuits to a fixed
    /// reply without calling the model.
    EmptyDocument,
}

/// Converts inbound events into content units, materializing media under the
/// configured temp directory.
pub struct Normalizer {
    tmp_dir: PathBuf,
    fetcher: Arc<dyn MediaFetcher>,
}

impl Normalizer {
    pub fn new(tmp_dir: impl Into<PathBuf>, fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self {
            tmp_dir: tmp_dir.into(),
            fetcher,
        }
    }

    pub async fn normalize(
        &self,
        user_id: i64,
        event: &InboundEvent,
    ) -> anyhow::Result<Normalized> {
        match event {
            InboundEvent::Text { text } => Ok(Normalized::Unit {
                unit: ContentUnit {
                    text: text.clone(),
                    media_path: None,
                    kind: ContentKind::Text,
                },
                media: None,
            }),
            InboundEvent::Image { caption, photos } => {
                self.normalize_image(user_id, caption.as_deref(), photos).await
            }
            InboundEvent::Document {
                file_id, mime_type, ..
            } => {
                if mime_type.as_deref() != Some("application/pdf") {
                    info!(user_id, mime_type = ?mime_type, "Rejecting non-PDF document");
                    return Ok(Normalized::Reject {
                        reply: UNSUPPORTED_DOCUMENT_REPLY.to_string(),
                    });
                }
                self.normalize_pdf(user_id, file_id).await
            }
        }
    }

    async fn normalize_image(
        &self,
        user_id: i64,
        caption: Option<&str>,
        photos: &[PhotoAttachment],
    ) -> anyhow::Result<Normalized> {
        let best = photos
            .iter()
            .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
            .context("image event without photo attachment")?;

        let bytes = self.fetcher.fetch(&best.file_id).await?;
        let media = self.materialize(user_id, "jpg", &bytes).await?;
        info!(
            user_id,
            width = best.width,
            height = best.height,
            path = %media.path().display(),
            "Materialized image attachment"
        );

        Ok(Normalized::Unit {
            unit: ContentUnit {
                text: caption.unwrap_or(DEFAULT_IMAGE_PROMPT).to_string(),
                media_path: Some(media.path().to_path_buf()),
                kind: ContentKind::Image,
            },
            media: Some(media),
        })
    }

    async fn normalize_pdf(&self, user_id: i64, file_id: &str) -> anyhow::Result<Normalized> {
        let bytes = self.fetcher.fetch(file_id).await?;
        let media = self.materialize(user_id, "pdf", &bytes).await?;
        let text = extract_pdf_text(media.path());
        // The PDF is only needed for extraction; release it before the model call.
        drop(media);

        if text.trim().is_empty() {
            info!(user_id, "PDF yielded no extractable text");
            return Ok(Normalized::EmptyDocument);
        }

        Ok(Normalized::Unit {
            unit: ContentUnit {
                text,
                media_path: None,
                kind: ContentKind::Document,
            },
            media: None,
        })
    }

    /// Writes `bytes` to `<tmp_dir>/<user_id>_<unix_millis>.<ext>`; the name is
    /// derived from user id and timestamp so concurrent users cannot collide.
    async fn materialize(
        &self,
        user_id: i64,
        ext: &str,
        bytes: &[u8],
    ) -> anyhow::Result<TempMedia> {
        tokio::fs::create_dir_all(&self.tmp_dir).await?;
        let name = format!("{}_{}.{}", user_id, chrono::Utc::now().timestamp_millis(), ext);
        let path = self.tmp_dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        Ok(TempMedia::new(path))
    }
}

/// Concatenated page text of a PDF. A page that fails to extract degrades to
/// an empty string for that page; a document that fails to parse degrades to
/// an empty result. Never fatal.
fn extract_pdf_text(path: &Path) -> String {
    let doc = match lopdf::Document::load(path) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse PDF");
            return String::new();
        }
    };

    let mut out = String::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(text) => out.push_str(&text),
            Err(e) => {
                warn!(page = page_number, error = %e, "Failed to extract page text");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct StaticFetcher {
        bytes: Vec<u8>,
    }

    #[async_trait]
    impl MediaFetcher for StaticFetcher {
        async fn fetch(&self, _file_id: &str) -> anyhow::Result<Vec<u8>> {
            Ok(self.bytes.clone())
        }
    }

    fn normalizer_in(dir: &TempDir, bytes: Vec<u8>) -> Normalizer {
        Normalizer::new(dir.path(), Arc::new(StaticFetcher { bytes }))
    }

    #[tokio::test]
    async fn test_text_passes_through() {
        let dir = TempDir::new().unwrap();
        let n = normalizer_in(&dir, vec![]);

        let out = n
            .normalize(1, &InboundEvent::Text { text: "hi".to_string() })
            .await
            .unwrap();

        match out {
            Normalized::Unit { unit, media } => {
                assert_eq!(unit.text, "hi");
                assert_eq!(unit.kind, ContentKind::Text);
                assert!(unit.media_path.is_none());
                assert!(media.is_none());
            }
            _ => panic!("expected unit"),
        }
    }

    #[tokio::test]
    async fn test_image_picks_highest_resolution_and_defaults_prompt() {
        let dir = TempDir::new().unwrap();
        let n = normalizer_in(&dir, vec![1, 2, 3]);

        let event = InboundEvent::Image {
            caption: None,
            photos: vec![
                PhotoAttachment {
                    file_id: "small".to_string(),
                    width: 90,
                    height: 60,
                },
                PhotoAttachment {
                    file_id: "large".to_string(),
                    width: 1280,
                    height: 960,
                },
                PhotoAttachment {
                    file_id: "medium".to_string(),
                    width: 320,
                    height: 240,
                },
            ],
        };

        let out = n.normalize(7, &event).await.unwrap();
        match out {
            Normalized::Unit { unit, media } => {
                assert_eq!(unit.text, DEFAULT_IMAGE_PROMPT);
                assert_eq!(unit.kind, ContentKind::Image);
                let media = media.expect("image unit carries temp media");
                assert!(media.path().exists());
                assert_eq!(std::fs::read(media.path()).unwrap(), vec![1, 2, 3]);
            }
            _ => panic!("expected unit"),
        }
    }

    #[tokio::test]
    async fn test_image_caption_becomes_text() {
        let dir = TempDir::new().unwrap();
        let n = normalizer_in(&dir, vec![0]);

        let event = InboundEvent::Image {
            caption: Some("what is this?".to_string()),
            photos: vec![PhotoAttachment {
                file_id: "f".to_string(),
                width: 10,
                height: 10,
            }],
        };

        match n.normalize(7, &event).await.unwrap() {
            Normalized::Unit { unit, .. } => assert_eq!(unit.text, "what is this?"),
            _ => panic!("expected unit"),
        }
    }

    #[tokio::test]
    async fn test_temp_media_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let n = normalizer_in(&dir, vec![9]);

        let event = InboundEvent::Image {
            caption: None,
            photos: vec![PhotoAttachment {
                file_id: "f".to_string(),
                width: 1,
                height: 1,
            }],
        };

        let path = match n.normalize(7, &event).await.unwrap() {
            Normalized::Unit { media, .. } => {
                let media = media.unwrap();
                let path = media.path().to_path_buf();
                assert!(path.exists());
                path
            }
            _ => panic!("expected unit"),
        };

        // Guard dropped at the end of the match arm.
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_non_pdf_document_is_rejected() {
        let dir = TempDir::new().unwrap();
        let n = normalizer_in(&dir, vec![]);

        let event = InboundEvent::Document {
            caption: None,
            file_id: "f".to_string(),
            file_name: Some("notes.docx".to_string()),
            mime_type: Some(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                    .to_string(),
            ),
        };

        match n.normalize(7, &event).await.unwrap() {
            Normalized::Reject { reply } => assert_eq!(reply, UNSUPPORTED_DOCUMENT_REPLY),
            _ => panic!("expected rejection"),
        }
    }

    #[tokio::test]
    async fn test_document_without_mime_is_rejected() {
        let dir = TempDir::new().unwrap();
        let n = normalizer_in(&dir, vec![]);

        let event = InboundEvent::Document {
            caption: None,
            file_id: "f".to_string(),
            file_name: None,
            mime_type: None,
        };

        assert!(matches!(
            n.normalize(7, &event).await.unwrap(),
            Normalized::Reject { .. }
        ));
    }

    #[tokio::test]
    async fn test_unparsable_pdf_short_circuits_as_empty() {
        let dir = TempDir::new().unwrap();
        let n = normalizer_in(&dir, b"not a pdf at all".to_vec());

        let event = InboundEvent::Document {
            caption: None,
            file_id: "f".to_string(),
            file_name: Some("broken.pdf".to_string()),
            mime_type: Some("application/pdf".to_string()),
        };

        assert!(matches!(
            n.normalize(7, &event).await.unwrap(),
            Normalized::EmptyDocument
        ));

        // The temp file was dropped right after extraction.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }
}
