//! File upload and audio endpoints, shared by every app type.

use std::path::Path;
use std::pin::Pin;

use bytes::Bytes;
use dify_types::{AudioToTextResponse, DifyError, FileUploadResponse};
use futures::{Stream, StreamExt};
use reqwest::Method;
use reqwest::multipart::{Form, Part};

use crate::client::Client;
use crate::error::map_reqwest_error;

/// Raw audio bytes from [`Client::text_to_audio`].
pub type AudioStream = Pin<Box<dyn Stream<Item = Result<Bytes, DifyError>> + Send>>;

impl Client {
    /// Upload a file from disk for use in a later message.
    ///
    /// The file name sent to the server is the last component of `path`.
    ///
    /// # Errors
    ///
    /// [`DifyError::Io`] when the file cannot be read, otherwise any
    /// [`DifyError`] from the request.
    pub async fn upload_file(
        &self,
        path: impl AsRef<Path>,
        user: &str,
    ) -> Result<FileUploadResponse, DifyError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        self.upload_file_bytes(data, &file_name(path), user).await
    }

    /// Upload in-memory file contents.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request.
    pub async fn upload_file_bytes(
        &self,
        data: impl Into<Bytes>,
        file_name: &str,
        user: &str,
    ) -> Result<FileUploadResponse, DifyError> {
        let form = Form::new()
            .part("file", file_part(data.into(), file_name)?)
            .text("user", self.user_or_default(user));
        let request = self
            .request(Method::POST, "/files/upload")
            .multipart(form);
        self.execute_json(request).await
    }

    /// Synthesize speech for `text`.
    ///
    /// Returns the audio body as it arrives. With `streaming` the server
    /// sends audio chunks as they are produced.
    ///
    /// # Errors
    ///
    /// Any [`DifyError`] from the request. Body read failures are reported
    /// through the returned stream.
    pub async fn text_to_audio(
        &self,
        text: &str,
        user: &str,
        streaming: bool,
    ) -> Result<AudioStream, DifyError> {
        let body = serde_json::json!({
            "text": text,
            "user": self.user_or_default(user),
            "streaming": streaming,
        });
        let request = self.request(Method::POST, "/text-to-audio").json(&body);
        let response = self.execute(request).await?;

        let timeout = self.timeout;
        let audio = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| map_reqwest_error(e, timeout)));
        Ok(Box::pin(audio))
    }

    /// Transcribe an audio file from disk.
    ///
    /// # Errors
    ///
    /// [`DifyError::Io`] when the file cannot be read, otherwise any
    /// [`DifyError`] from the request.
    pub async fn audio_to_text(
        &self,
        path: impl AsRef<Path>,
        user: &str,
    ) -> Result<AudioToTextResponse, DifyError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let form = Form::new()
            .part("file", file_part(Bytes::from(data), &file_name(path))?)
            .text("user", self.user_or_default(user));
        let request = self
            .request(Method::POST, "/audio-to-text")
            .multipart(form);
        self.execute_json(request).await
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string())
}

fn file_part(data: Bytes, file_name: &str) -> Result<Part, DifyError> {
    let size = data.len() as u64;
    tracing::debug!(file_name, size, "preparing multipart upload");
    Part::stream_with_length(data, size)
        .file_name(file_name.to_string())
        .mime_str("application/octet-stream")
        .map_err(|e| DifyError::Config(format!("invalid mime type: {e}")))
}
