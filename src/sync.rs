use crate::client::Client;
use crate::data::{GeneratedImage, ImageFormat};
use crate::structs::{GenerateRequest, GenerateResponse, ModelList};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

impl Client {
    pub fn list_models_raw_sync(&self) -> Result<serde_json::Value> {
        let rt = Runtime::new()?;
        let output = rt.block_on(self.list_models_raw())?;
        Ok(output)
    }

    pub fn list_models_sync(&self) -> Result<ModelList> {
        let rt = Runtime::new()?;
        let output = rt.block_on(self.list_models())?;
        Ok(output)
    }

    pub fn generate_sync(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let rt = Runtime::new()?;
        let output = rt.block_on(self.generate(request))?;
        Ok(output)
    }
}

impl GeneratedImage {
    pub fn save_sync(&self, output: Option<&Path>, format: ImageFormat) -> Result<PathBuf> {
        let rt = Runtime::new()?;
        let path = rt.block_on(self.save(output, format))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientOptions;

    #[test]
    fn test_generate_and_save_sync() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/image/generate")
            .with_status(200)
            .with_header("content-type", "application/json")
            // "hello" in base64
            .with_body(r#"{"id":"sync-1","images":["aGVsbG8="]}"#)
            .create();

        let client =
            Client::new(ClientOptions::with_api_key("k").with_base_url(server.url())).unwrap();
        let res = client.generate_sync(&GenerateRequest::new("hi")).unwrap();
        let image = GeneratedImage::from_response(&res).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join(image.suggest_file_name(ImageFormat::Webp));
        let path = image.save_sync(Some(target.as_path()), ImageFormat::Webp).unwrap();

        assert_eq!(path, dir.path().join("sync-1.webp"));
        assert_eq!(std::fs::read(path).unwrap(), b"hello");
    }
}
