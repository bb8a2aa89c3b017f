use std::path::Path;

use crate::config::ScanConfig;
use crate::errors::{ScoutError, ScoutResult};

/// Turns an OCR-ready image into text, one logical line per `\n`
pub trait TextExtractor {
    fn extract_text(&mut self, image: &Path) -> ScoutResult<String>;
}

/// Hands out OCR engine handles.
///
/// Each worker leases one handle the first time it needs it and keeps it until
/// it exits, so construction cost is paid once per worker. Handles are never
/// shared between workers, which is why [`TextExtractor`] does not need to be
/// `Send` or `Sync` while the provider does.
pub trait EngineProvider: Send + Sync {
    fn lease(&self) -> ScoutResult<Box<dyn TextExtractor>>;
}

/// Provider backed by the system tesseract installation
#[cfg(feature = "tesseract")]
#[derive(Debug, Clone)]
pub struct TesseractProvider {
    language: String,
    tessdata_dir: Option<std::path::PathBuf>,
}

#[cfg(feature = "tesseract")]
impl TesseractProvider {
    pub fn new(language: impl Into<String>, tessdata_dir: Option<std::path::PathBuf>) -> Self {
        Self {
            language: language.into(),
            tessdata_dir,
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.language.clone(), config.tessdata_dir.clone())
    }
}

#[cfg(feature = "tesseract")]
impl EngineProvider for TesseractProvider {
    fn lease(&self) -> ScoutResult<Box<dyn TextExtractor>> {
        let data_path = match &self.tessdata_dir {
            Some(dir) => Some(dir.to_str().ok_or_else(|| {
                ScoutError::engine_init(format!(
                    "tessdata path is not valid UTF-8: {}",
                    dir.display()
                ))
            })?),
            None => None,
        };
        let engine = leptess::LepTess::new(data_path, &self.language)
            .map_err(|e| ScoutError::engine_init(e.to_string()))?;
        Ok(Box::new(TesseractEngine { engine }))
    }
}

/// One tesseract instance, released when dropped
#[cfg(feature = "tesseract")]
pub struct TesseractEngine {
    engine: leptess::LepTess,
}

#[cfg(feature = "tesseract")]
impl TextExtractor for TesseractEngine {
    fn extract_text(&mut self, image: &Path) -> ScoutResult<String> {
        self.engine
            .set_image(image)
            .map_err(|e| ScoutError::extraction(image, e.to_string()))?;
        self.engine
            .get_utf8_text()
            .map_err(|e| ScoutError::extraction(image, e.to_string()))
    }
}

/// Builds the engine provider this crate was compiled with
#[cfg(feature = "tesseract")]
pub fn default_provider(config: &ScanConfig) -> ScoutResult<Box<dyn EngineProvider>> {
    Ok(Box::new(TesseractProvider::from_config(config)))
}

/// Provider for builds without an OCR backend; every lease fails.
///
/// Failing at lease time rather than at construction keeps directory errors and
/// empty directories reported the same way as in a full build.
#[cfg(not(feature = "tesseract"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableProvider;

#[cfg(not(feature = "tesseract"))]
impl EngineProvider for UnavailableProvider {
    fn lease(&self) -> ScoutResult<Box<dyn TextExtractor>> {
        Err(ScoutError::engine_init(
            "ocrscout was built without the `tesseract` feature, no OCR engine is available",
        ))
    }
}

/// Builds the engine provider this crate was compiled with
#[cfg(not(feature = "tesseract"))]
pub fn default_provider(_config: &ScanConfig) -> ScoutResult<Box<dyn EngineProvider>> {
    Ok(Box::new(UnavailableProvider))
}
