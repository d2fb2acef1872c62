use crate::error::{CatalogError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::debug;

/// Most images a listing may carry
pub const MAX_IMAGES: usize = 4;
/// Largest accepted file, in bytes (roughly 900KB)
pub const MAX_IMAGE_BYTES: usize = 900_000;

/// A raw file handed over by the file-input collaborator
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    /// MIME type reported by the picker, e.g. `image/jpeg`
    pub mime: String,
    pub bytes: Vec<u8>,
}

fn encode_data_uri(file: ImageFile) -> Result<String> {
    if !file.mime.starts_with("image/") {
        return Err(CatalogError::ImagePolicy(format!(
            "{} is not an image ({})",
            file.name, file.mime
        )));
    }
    if file.bytes.is_empty() {
        return Err(CatalogError::ImagePolicy(format!("{} is empty", file.name)));
    }
    Ok(format!("data:{};base64,{}", file.mime, STANDARD.encode(&file.bytes)))
}

/// Validate and encode a batch of candidate files
///
/// The batch is capped to the room left under [`MAX_IMAGES`] given
/// `current_count` already-attached images; trailing extras are dropped
/// before any other check, so a dropped file cannot fail the batch. An
/// empty selection after capping is a no-op, not an error. Any kept file
/// that is oversized or unencodable fails the whole batch with no partial
/// result. Encoding fans out one task per file and joins before returning.
pub async fn accept_images(files: Vec<ImageFile>, current_count: usize) -> Result<Vec<String>> {
    let room = MAX_IMAGES.saturating_sub(current_count);
    let mut files = files;
    if files.len() > room {
        debug!("dropping {} images over the {} limit", files.len() - room, MAX_IMAGES);
        files.truncate(room);
    }
    if files.is_empty() {
        return Ok(Vec::new());
    }

    for file in &files {
        if file.bytes.len() > MAX_IMAGE_BYTES {
            return Err(CatalogError::ImagePolicy(format!(
                "{} is too large (max {MAX_IMAGE_BYTES} bytes)",
                file.name
            )));
        }
    }

    let handles: Vec<_> = files
        .into_iter()
        .map(|file| tokio::spawn(async move { encode_data_uri(file) }))
        .collect();

    let mut encoded = Vec::with_capacity(handles.len());
    for handle in handles {
        let uri = handle
            .await
            .map_err(|err| CatalogError::ImagePolicy(format!("encoding task failed: {err}")))??;
        encoded.push(uri);
    }
    Ok(encoded)
}

/// Append freshly encoded images to an existing set, capping the total at
/// [`MAX_IMAGES`] by dropping trailing new entries
pub fn append_images(existing: &[String], new: Vec<String>) -> Vec<String> {
    let mut combined = existing.to_vec();
    combined.extend(new);
    combined.truncate(MAX_IMAGES);
    combined
}

/// Remove the image at `index`; out-of-range indices are a no-op
pub fn remove_image(images: &mut Vec<String>, index: usize) {
    if index < images.len() {
        images.remove(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> ImageFile {
        ImageFile {
            name: name.to_string(),
            mime: "image/png".to_string(),
            bytes: vec![0xAB; size],
        }
    }

    #[tokio::test]
    async fn encodes_each_file_to_a_data_uri() {
        let encoded = accept_images(vec![file("a.png", 16), file("b.png", 16)], 0)
            .await
            .unwrap();
        assert_eq!(encoded.len(), 2);
        assert!(encoded.iter().all(|uri| uri.starts_with("data:image/png;base64,")));
    }

    #[tokio::test]
    async fn five_valid_files_yield_at_most_four_images() {
        let files = (0..5).map(|i| file(&format!("{i}.png"), 8)).collect();
        let encoded = accept_images(files, 0).await.unwrap();
        assert_eq!(encoded.len(), MAX_IMAGES);
    }

    #[tokio::test]
    async fn one_oversized_file_fails_the_whole_batch() {
        let files = vec![file("ok.png", 100), file("huge.png", MAX_IMAGE_BYTES + 1)];
        let err = accept_images(files, 0).await.unwrap_err();
        assert!(matches!(err, CatalogError::ImagePolicy(_)));
        assert!(err.to_string().contains("900000"));
    }

    #[tokio::test]
    async fn oversized_file_past_the_cap_does_not_fail_the_batch() {
        let mut files: Vec<ImageFile> = (0..4).map(|i| file(&format!("{i}.png"), 8)).collect();
        files.push(file("overflow.png", MAX_IMAGE_BYTES + 1));

        let encoded = accept_images(files, 0).await.unwrap();
        assert_eq!(encoded.len(), MAX_IMAGES);
    }

    #[tokio::test]
    async fn full_listing_accepts_nothing_without_error() {
        let encoded = accept_images(vec![file("a.png", 8)], MAX_IMAGES).await.unwrap();
        assert!(encoded.is_empty());
    }

    #[tokio::test]
    async fn non_image_mime_fails_the_batch() {
        let mut pdf = file("doc.pdf", 8);
        pdf.mime = "application/pdf".to_string();
        assert!(accept_images(vec![file("a.png", 8), pdf], 0).await.is_err());
    }

    #[test]
    fn append_drops_trailing_new_entries_past_the_cap() {
        let existing = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let combined = append_images(&existing, vec!["four".to_string(), "five".to_string()]);
        assert_eq!(combined.len(), MAX_IMAGES);
        assert_eq!(combined.last().unwrap(), "four");
    }

    #[test]
    fn remove_is_a_plain_splice() {
        let mut images = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        remove_image(&mut images, 1);
        assert_eq!(images, ["a", "c"]);
        remove_image(&mut images, 10);
        assert_eq!(images, ["a", "c"]);
    }
}
