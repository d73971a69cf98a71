// The bundled alert sound, held in memory for the lifetime of the app
use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::error::Result;

#[derive(Debug, Clone)]
pub struct AlertAsset {
    name: String,
    bytes: Arc<[u8]>,
}

impl AlertAsset {
    /// Read an asset from disk
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::debug!("Loaded alert asset {:?} ({} bytes)", path, bytes.len());
        Ok(Self::from_bytes(name, bytes))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File extension, used as a format hint when probing
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|e| e.to_str())
    }

    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_name() {
        let asset = AlertAsset::from_bytes("alert.m4a", vec![0u8; 4]);
        assert_eq!(asset.extension(), Some("m4a"));

        let asset = AlertAsset::from_bytes("alert", vec![0u8; 4]);
        assert_eq!(asset.extension(), None);
    }

    #[test]
    fn test_load_missing_file() {
        let result = AlertAsset::load(Path::new("/nonexistent/alert.wav"));
        assert!(result.is_err());
    }

    #[test]
    fn test_bytes_are_shared() {
        let asset = AlertAsset::from_bytes("alert.wav", vec![1u8, 2, 3]);
        let a = asset.bytes();
        let b = asset.clone().bytes();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
