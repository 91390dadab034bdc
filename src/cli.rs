use anyhow::{anyhow, bail, Result};
use clap::Parser;
use comment_assistant::utils::log_column_choices;
use console::Term;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "comment-assistant",
    version,
    about = "Writes one unique teacher comment per student from a roster of scores"
)]
pub struct Args {
    /// Student list spreadsheet (.xlsx, .xls or .ods) with a header row
    pub roster: PathBuf,

    /// Column holding the score or T/H/C grade (asked interactively if omitted)
    #[arg(short = 'c', long)]
    pub score_column: Option<String>,

    /// Name of the new comment column
    #[arg(long)]
    pub comment_column: Option<String>,

    #[arg(short, long)]
    pub subject: Option<String>,

    #[arg(short, long)]
    pub lesson: Option<String>,

    /// Evidence files: images, PDFs or .docx documents
    #[arg(short, long = "evidence", num_args = 1..)]
    pub evidence: Vec<PathBuf>,

    /// Worksheet to read (defaults to the first one)
    #[arg(long)]
    pub sheet: Option<String>,

    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Personal API key; takes precedence over GEMINI_API_KEY
    #[arg(long)]
    pub api_key: Option<String>,

    /// Write the raw service reply to this file
    #[arg(long)]
    pub save_reply: Option<PathBuf>,

    /// Use a previously saved reply instead of calling the service
    #[arg(long, conflicts_with = "save_reply")]
    pub reply_file: Option<PathBuf>,
}

pub fn choose_column(headers: &[String]) -> Result<String> {
    let term = Term::stdout();
    if !term.is_term() {
        bail!("no --score-column given and the terminal is not interactive");
    }

    log_column_choices(headers);
    term.write_str("> ")?;
    let input = term.read_line()?;

    resolve_choice(headers, &input).ok_or_else(|| anyhow!("'{}' is not a column", input.trim()))
}

/// Accepts a 1-based column number or a column name.
pub fn resolve_choice(headers: &[String], input: &str) -> Option<String> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| headers.get(i)).cloned();
    }
    headers
        .iter()
        .find(|h| h.eq_ignore_ascii_case(input) || h.to_lowercase() == input.to_lowercase())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        vec!["STT".into(), "Họ tên".into(), "Mức đạt".into()]
    }

    #[test]
    fn test_resolve_by_number() {
        assert_eq!(resolve_choice(&headers(), " 3\n").as_deref(), Some("Mức đạt"));
        assert_eq!(resolve_choice(&headers(), "0"), None);
        assert_eq!(resolve_choice(&headers(), "4"), None);
    }

    #[test]
    fn test_resolve_by_name() {
        assert_eq!(resolve_choice(&headers(), "mức đạt").as_deref(), Some("Mức đạt"));
        assert_eq!(resolve_choice(&headers(), "Điểm"), None);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "comment-assistant",
            "lop3a.xlsx",
            "-c",
            "Mức đạt",
            "-e",
            "bai1.docx",
            "anh.png",
            "--subject",
            "Toán",
        ])
        .unwrap();
        assert_eq!(args.score_column.as_deref(), Some("Mức đạt"));
        assert_eq!(args.evidence.len(), 2);
        assert_eq!(args.subject.as_deref(), Some("Toán"));
        assert!(args.reply_file.is_none());
    }

    #[test]
    fn test_reply_file_conflicts_with_save_reply() {
        let result = Args::try_parse_from([
            "comment-assistant",
            "lop3a.xlsx",
            "--reply-file",
            "a.txt",
            "--save-reply",
            "b.txt",
        ]);
        assert!(result.is_err());
    }
}
