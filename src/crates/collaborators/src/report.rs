//! Paginated PDF rendering of workflow results.
//!
//! Lays text out on A4 pages with a title header and a page-numbered,
//! timestamped footer, using the built-in Helvetica faces so no font assets
//! ship with the binary. The renderer reports its outcome as text either
//! way (a path message on success, an `Error: ...` string on failure), and
//! the engine never reads the file back.

use crate::config::ReportConfig;
use crate::error::{CollaboratorError, Result};
use async_trait::async_trait;
use chrono::Local;
use printpdf::{BuiltinFont, Mm, PdfDocument};
use stackflow_core::error::Result as CoreResult;
use stackflow_core::ReportRenderer;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::warn;

const LINES_PER_PAGE: usize = 46;
const MAX_LINE_CHARS: usize = 95;

/// printpdf-backed report renderer.
#[derive(Clone)]
pub struct PdfRenderer {
    config: ReportConfig,
}

impl PdfRenderer {
    /// Create a renderer with the given configuration.
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ReportRenderer for PdfRenderer {
    async fn render(&self, content: &str, filename: &str) -> CoreResult<String> {
        let output_dir = self.config.output_dir.clone();
        let title = self.config.title.clone();
        let content = content.to_string();
        let filename = filename.to_string();

        let outcome =
            tokio::task::spawn_blocking(move || write_pdf(&output_dir, &filename, &title, &content))
                .await;

        match outcome {
            Ok(Ok(path)) => Ok(format!("PDF generated successfully at {}", path.display())),
            Ok(Err(e)) => {
                warn!(error = %e, "PDF generation failed");
                Ok(format!("Error: could not generate PDF. Details: {e}"))
            }
            Err(e) => {
                warn!(error = %e, "PDF generation task failed");
                Ok(format!("Error: could not generate PDF. Details: {e}"))
            }
        }
    }
}

fn write_pdf(output_dir: &Path, filename: &str, title: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(filename);

    // A4 portrait.
    let (doc, first_page, first_layer) = PdfDocument::new(title, Mm(210.0), Mm(297.0), "Layer 1");
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| CollaboratorError::Render(e.to_string()))?;
    let header_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| CollaboratorError::Render(e.to_string()))?;
    let footer_font = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| CollaboratorError::Render(e.to_string()))?;

    let mut lines = wrap_text(content, MAX_LINE_CHARS);
    if lines.is_empty() {
        // Still emit one (blank) page so the file is well-formed.
        lines.push(String::new());
    }
    let pages = lines.chunks(LINES_PER_PAGE).collect::<Vec<_>>();
    let page_total = pages.len();
    let generated_at = Local::now().format("%Y-%m-%d %H:%M").to_string();

    for (page_no, chunk) in pages.into_iter().enumerate() {
        let (page, layer) = if page_no == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(210.0), Mm(297.0), "Layer 1")
        };
        let current = doc.get_page(page).get_layer(layer);

        current.use_text(title, 12.0, Mm(15.0), Mm(283.0), &header_font);

        let mut y = 272.0;
        for line in chunk {
            current.use_text(line.as_str(), 11.0, Mm(15.0), Mm(y), &body_font);
            y -= 5.5;
        }

        current.use_text(
            format!(
                "Page {} of {page_total} | Generated on {generated_at}",
                page_no + 1
            ),
            8.0,
            Mm(15.0),
            Mm(10.0),
            &footer_font,
        );
    }

    let file = File::create(&path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| CollaboratorError::Render(e.to_string()))?;

    Ok(path)
}

/// Word-wrap content at `max_chars` per line, preserving existing breaks.
fn wrap_text(content: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in content.lines() {
        if raw.chars().count() <= max_chars {
            lines.push(raw.to_string());
            continue;
        }

        let mut current = String::new();
        for word in raw.split_whitespace() {
            if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars
            {
                lines.push(std::mem::take(&mut current));
            }
            // A single word longer than the limit gets split hard.
            if word.chars().count() > max_chars {
                let chars = word.chars().collect::<Vec<_>>();
                for piece in chars.chunks(max_chars) {
                    lines.push(piece.iter().collect());
                }
                continue;
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}
