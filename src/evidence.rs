use regex::Regex;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use strum::Display;

static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:p(?:\s[^>]*[^/>])?>(.*?)</w:p>").unwrap());
static TEXT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|lt|gt|quot|apos|amp);").unwrap());

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EvidenceKind {
    #[strum(serialize = "document")]
    Document,
    #[strum(serialize = "pdf")]
    Pdf,
    #[strum(serialize = "image")]
    Image,
}

impl EvidenceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(EvidenceKind::Document),
            "pdf" => Some(EvidenceKind::Pdf),
            "png" | "jpg" | "jpeg" | "gif" | "webp" => Some(EvidenceKind::Image),
            _ => None,
        }
    }
}

/// An image or PDF sent to the service as inline media. Lives only for the run.
#[derive(Debug, Clone)]
pub struct EvidenceBlob {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct EvidenceBundle {
    pub text: String,
    pub media: Vec<EvidenceBlob>,
    pub documents: usize,
    pub skipped: Vec<PathBuf>,
}

impl EvidenceBundle {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.media.is_empty()
    }
}

/// Reads every evidence file it can. Unreadable or unsupported files are
/// skipped without failing the run.
pub fn load_evidence(paths: &[PathBuf]) -> EvidenceBundle {
    let mut bundle = EvidenceBundle::default();
    let mut texts: Vec<String> = Vec::new();

    for path in paths {
        match load_one(path) {
            Some(Loaded::Text(text)) => {
                bundle.documents += 1;
                texts.push(text);
            }
            Some(Loaded::Media(blob)) => bundle.media.push(blob),
            None => bundle.skipped.push(path.clone()),
        }
    }

    bundle.text = texts.join("\n");
    bundle
}

enum Loaded {
    Text(String),
    Media(EvidenceBlob),
}

fn load_one(path: &Path) -> Option<Loaded> {
    let Some(kind) = EvidenceKind::from_path(path) else {
        tracing::debug!("unsupported evidence file {}", path.display());
        return None;
    };

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("cannot read {}: {}", path.display(), e);
            return None;
        }
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match kind {
        EvidenceKind::Document => match extract_docx_text(&bytes) {
            Some(text) => Some(Loaded::Text(text)),
            None => {
                tracing::debug!("cannot extract text from {}", path.display());
                None
            }
        },
        EvidenceKind::Pdf | EvidenceKind::Image => {
            let mime_type = mime_guess::from_path(path)
                .first()
                .map(|m| m.essence_str().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            Some(Loaded::Media(EvidenceBlob {
                name,
                mime_type,
                data: bytes,
            }))
        }
    }
}

/// Paragraph text of a word-processor document, one paragraph per line.
pub fn extract_docx_text(bytes: &[u8]) -> Option<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).ok()?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .ok()?
        .read_to_string(&mut xml)
        .ok()?;

    let paragraphs: Vec<String> = PARAGRAPH
        .captures_iter(&xml)
        .map(|para| {
            TEXT_RUN
                .captures_iter(&para[1])
                .map(|run| unescape_xml(&run[1]))
                .collect::<String>()
        })
        .collect();

    Some(paragraphs.join("\n"))
}

/// Resolves named and numeric entities in one pass, so `&amp;#39;` stays
/// literal text.
fn unescape_xml(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => entity
                    .strip_prefix("#x")
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .unwrap_or_else(|| entity[1..].parse())
                    .ok()
                    .and_then(char::from_u32),
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
