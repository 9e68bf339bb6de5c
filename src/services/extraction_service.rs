use crate::error::ExtractionError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" => Ok(DocumentFormat::Txt),
            _ => Err(ExtractionError::UnsupportedFormat(ext)),
        }
    }

    fn check_content(&self, data: &[u8]) -> Result<(), ExtractionError> {
        match self {
            DocumentFormat::Pdf if !data.starts_with(b"%PDF") => {
                Err(ExtractionError::InvalidContent("PDF"))
            }
            DocumentFormat::Docx if !data.starts_with(b"PK") => {
                Err(ExtractionError::InvalidContent("DOCX"))
            }
            _ => Ok(()),
        }
    }
}

/// Turns uploaded documents into plain text with external tools.
#[derive(Clone)]
pub struct ExtractionService {
    scratch_dir: PathBuf,
}

impl Default for ExtractionService {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl ExtractionService {
    pub fn new(scratch_dir: PathBuf) -> Self {
        Self { scratch_dir }
    }

    pub async fn extract(&self, filename: &str, data: &[u8]) -> Result<String, ExtractionError> {
        let format = DocumentFormat::from_filename(filename)?;
        format.check_content(data)?;

        let text = match format {
            DocumentFormat::Txt => String::from_utf8(data.to_vec())
                .map_err(|_| ExtractionError::InvalidContent("TXT"))?,
            DocumentFormat::Pdf => self.pdf_to_text(data).await?,
            DocumentFormat::Docx => self.docx_to_text(data).await?,
        };

        if text.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }
        tracing::info!(filename, chars = text.chars().count(), "Extracted document text");
        Ok(text)
    }

    async fn pdf_to_text(&self, data: &[u8]) -> Result<String, ExtractionError> {
        let work_dir = self.work_dir().await?;
        let result = run_pdftotext(&work_dir, data).await;
        let _ = fs::remove_dir_all(&work_dir).await;
        result
    }

    async fn docx_to_text(&self, data: &[u8]) -> Result<String, ExtractionError> {
        let work_dir = self.work_dir().await?;
        let result = run_libreoffice(&work_dir, data).await;
        let _ = fs::remove_dir_all(&work_dir).await;
        result
    }

    async fn work_dir(&self) -> Result<PathBuf, ExtractionError> {
        let dir = self
            .scratch_dir
            .join(format!("quiz_upload_{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }
}

async fn run_pdftotext(work_dir: &Path, data: &[u8]) -> Result<String, ExtractionError> {
    let pdf_path = work_dir.join("upload.pdf");
    fs::write(&pdf_path, data).await?;

    let out = Command::new("pdftotext")
        .arg("-layout")
        .arg(&pdf_path)
        .arg("-")
        .output()
        .await
        .map_err(|e| tool_failed("pdftotext", e.to_string()))?;

    if !out.status.success() {
        return Err(tool_failed(
            "pdftotext",
            String::from_utf8_lossy(&out.stderr).to_string(),
        ));
    }
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
}

async fn run_libreoffice(work_dir: &Path, data: &[u8]) -> Result<String, ExtractionError> {
    let docx_path = work_dir.join("upload.docx");
    fs::write(&docx_path, data).await?;

    let out = Command::new("libreoffice")
        .arg("--headless")
        .arg("--norestore")
        .arg("--convert-to")
        .arg("txt:Text")
        .arg("--outdir")
        .arg(work_dir)
        .arg(&docx_path)
        .output()
        .await
        .map_err(|e| tool_failed("libreoffice", e.to_string()))?;

    if !out.status.success() {
        return Err(tool_failed(
            "libreoffice",
            String::from_utf8_lossy(&out.stderr).to_string(),
        ));
    }
    fs::read_to_string(work_dir.join("upload.txt"))
        .await
        .map_err(|e| tool_failed("libreoffice", format!("no text output: {}", e)))
}

fn tool_failed(tool: &'static str, message: String) -> ExtractionError {
    tracing::error!(tool, %message, "Text extraction failed");
    ExtractionError::ToolFailed { tool, message }
}
