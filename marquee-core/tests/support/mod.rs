#![allow(dead_code)]

use std::{
    io::Cursor,
    path::Path,
    sync::Mutex,
};

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use marquee_core::{
    ArtifactKind, ShowRef,
    providers::{ProviderError, RemoteArtworkProvider, write_image_bytes},
};

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

/// Remote provider that records every call and serves a fixed payload.
#[derive(Default)]
pub struct RecordingProvider {
    pub retrieved: Mutex<Vec<ArtifactKind>>,
    pub written: Mutex<Vec<std::path::PathBuf>>,
    pub failing: Vec<ArtifactKind>,
}

impl RecordingProvider {
    pub fn failing(kinds: &[ArtifactKind]) -> Self {
        Self {
            failing: kinds.to_vec(),
            ..Self::default()
        }
    }

    pub fn retrieved(&self) -> Vec<ArtifactKind> {
        self.retrieved.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.written.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteArtworkProvider for RecordingProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn retrieve_image(
        &self,
        kind: ArtifactKind,
        _show: &ShowRef,
    ) -> Result<Vec<u8>, ProviderError> {
        self.retrieved.lock().unwrap().push(kind);
        if self.failing.contains(&kind) {
            return Err(ProviderError::ApiError(format!("no {kind} today")));
        }
        Ok(format!("remote {kind}").into_bytes())
    }

    async fn write_image(
        &self,
        bytes: &[u8],
        dest: &Path,
    ) -> Result<(), ProviderError> {
        self.written.lock().unwrap().push(dest.to_path_buf());
        write_image_bytes(bytes, dest).await
    }
}
