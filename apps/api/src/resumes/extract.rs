/// PDF text extraction for uploaded resumes.
///
/// Extraction happens once, at upload time. The extracted text is stored on
/// the resume row and reused for every interview; the PDF bytes themselves
/// are only ever read again through the stored object URL.
use crate::errors::AppError;

/// Minimum character count for extracted text to count as a readable resume.
/// Scanned-image PDFs typically extract to nothing or a handful of stray
/// glyphs; this threshold rejects them at upload instead of at interview time.
pub const MIN_RESUME_TEXT_LEN: usize = 100;

/// Extracts plain text from PDF bytes. Encrypted, corrupt, or image-only
/// PDFs surface as 422 so the client knows the file itself is the problem.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, AppError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::UnprocessableEntity(format!("Failed to read PDF: {e}")))
}

pub fn text_long_enough(text: &str) -> bool {
    text.trim().chars().count() >= MIN_RESUME_TEXT_LEN
}
