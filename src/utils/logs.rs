use console::{measure_text_width, Style};
use std::path::Path;
use std::time::Duration;

use crate::credentials::KeySource;
use crate::evidence::EvidenceBundle;
use crate::export::AnnotatedRoster;
use crate::grading::{Level, LevelCounts, ParsedReply, RequestedCounts, Shortfall};
use crate::roster::Roster;

pub const TREE_BRANCH: char = '\u{251C}';
pub const TREE_END: char = '\u{2514}';
pub const TREE_HORIZ: char = '\u{2500}';

const TREE_PREFIX_WIDTH: usize = 4;
const VALUE_COLUMN: usize = 25;
const PREVIEW_CHARS: usize = 70;

fn tree_branch() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_BRANCH, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_end() -> String {
    dim()
        .apply_to(format!("{}{}{} ", TREE_END, TREE_HORIZ, TREE_HORIZ))
        .to_string()
}

fn tree_item(is_last: bool) -> String {
    if is_last {
        tree_end()
    } else {
        tree_branch()
    }
}

pub fn dim() -> Style {
    Style::new().dim()
}

fn blue() -> Style {
    Style::new().blue()
}

fn magenta() -> Style {
    Style::new().magenta()
}

fn cyan() -> Style {
    Style::new().cyan()
}

fn green() -> Style {
    Style::new().green()
}

fn red() -> Style {
    Style::new().red()
}

fn yellow() -> Style {
    Style::new().yellow()
}

fn bold() -> Style {
    Style::new().bold()
}

fn init_prefix() -> String {
    blue().apply_to("[INIT]").to_string()
}

fn roster_prefix() -> String {
    cyan().apply_to("[ROSTER]").to_string()
}

fn evidence_prefix() -> String {
    magenta().apply_to("[EVIDENCE]").to_string()
}

fn ai_prefix() -> String {
    yellow().apply_to("[AI]").to_string()
}

fn pool_prefix() -> String {
    blue().apply_to("[POOL]").to_string()
}

fn export_prefix() -> String {
    green().apply_to("[EXPORT]").to_string()
}

pub fn pad_label(label: &str, depth: usize) -> String {
    let prefix_width = depth * TREE_PREFIX_WIDTH;
    let target_width = VALUE_COLUMN.saturating_sub(prefix_width);
    let current_width = measure_text_width(label);
    if current_width < target_width {
        format!("{}{}", label, " ".repeat(target_width - current_width))
    } else {
        format!("{} ", label)
    }
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!(
            "{}...",
            text.chars().take(max_chars.saturating_sub(3)).collect::<String>()
        )
    } else {
        text.to_string()
    }
}

pub fn log_newline() {
    println!();
}

pub fn log_init(model: &str) {
    println!(
        "{} comment assistant using {}",
        init_prefix(),
        cyan().apply_to(model)
    );
}

pub fn log_key_source(source: KeySource) {
    let style = match source {
        KeySource::Manual => cyan(),
        KeySource::Stored => green(),
    };
    println!("{} using {}", init_prefix(), style.apply_to(source));
}

pub fn log_offline_reply(path: &Path) {
    println!(
        "{} replaying saved reply {}",
        init_prefix(),
        dim().apply_to(path.display())
    );
}

pub fn log_roster_loaded(path: &Path, roster: &Roster) {
    println!(
        "{} loaded {} students from {}",
        roster_prefix(),
        bold().apply_to(roster.len()),
        dim().apply_to(path.display())
    );
}

pub fn log_roster_preview(roster: &Roster, rows: usize) {
    println!("{}{}", tree_branch(), dim().apply_to(roster.headers.join(" | ")));
    let shown: Vec<_> = roster.rows.iter().take(rows).collect();
    if shown.is_empty() {
        println!("{}{}", tree_end(), dim().apply_to("(no rows)"));
        return;
    }
    let count = shown.len();
    for (i, row) in shown.into_iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        println!("{}{}", tree_item(i == count - 1), cells.join(" | "));
    }
}

pub fn log_column_choices(headers: &[String]) {
    println!("{} pick the score/grade column:", roster_prefix());
    let count = headers.len();
    for (i, header) in headers.iter().enumerate() {
        println!(
            "{}{} {}",
            tree_item(i == count - 1),
            bold().apply_to(format!("{:>2}", i + 1)),
            header
        );
    }
}

pub fn log_level_counts(counts: &LevelCounts, requested: &RequestedCounts) {
    println!(
        "{} {} classified, {} unclassified",
        roster_prefix(),
        bold().apply_to(counts.classified()),
        dim().apply_to(counts.unclassified)
    );
    let rows = [
        (Level::GoodCompletion, counts.good, requested.good),
        (Level::Completion, counts.completion, requested.completion),
        (Level::NotYetCompleted, counts.not_yet, requested.not_yet),
    ];
    for (i, (level, need, asked)) in rows.iter().enumerate() {
        println!(
            "{}{} {} {}",
            tree_item(i == rows.len() - 1),
            pad_label(&level.to_string(), 1),
            bold().apply_to(need),
            dim().apply_to(format!("(asking for {asked})"))
        );
    }
}

pub fn log_unclassified(row_numbers: &[usize], fallback: &str) {
    if row_numbers.is_empty() {
        return;
    }
    let listed: Vec<String> = row_numbers.iter().map(|n| n.to_string()).collect();
    println!(
        "{} {} rows have no usable score and get \"{}\": rows {}",
        yellow().apply_to("[WARN]"),
        bold().apply_to(row_numbers.len()),
        fallback,
        dim().apply_to(truncate(&listed.join(", "), PREVIEW_CHARS))
    );
}

pub fn log_evidence(bundle: &EvidenceBundle, excerpt_chars: usize) {
    if bundle.is_empty() && bundle.skipped.is_empty() {
        return;
    }
    println!(
        "{} {} documents, {} attachments",
        evidence_prefix(),
        bold().apply_to(bundle.documents),
        bold().apply_to(bundle.media.len())
    );
    println!(
        "{}{} {}",
        tree_branch(),
        pad_label("text", 1),
        dim().apply_to(format!(
            "{} chars (first {} used)",
            bundle.text.chars().count(),
            excerpt_chars
        ))
    );
    for blob in &bundle.media {
        println!(
            "{}{} {}",
            tree_branch(),
            pad_label(&blob.name, 1),
            dim().apply_to(&blob.mime_type)
        );
    }
    println!(
        "{}{} {}",
        tree_end(),
        pad_label("skipped", 1),
        dim().apply_to(bundle.skipped.len())
    );
}

pub fn log_request_start(total: usize) {
    println!(
        "{} asking for {} comments, this can take a while...",
        ai_prefix(),
        bold().apply_to(total)
    );
}

pub fn log_request_done(elapsed: Duration, reply_chars: usize) {
    println!(
        "{} reply received in {} ({} chars)",
        ai_prefix(),
        bold().apply_to(format!("{:.1}s", elapsed.as_secs_f32())),
        dim().apply_to(reply_chars)
    );
}

pub fn log_reply_saved(path: &Path) {
    println!(
        "{} raw reply saved to {}",
        ai_prefix(),
        dim().apply_to(path.display())
    );
}

pub fn log_parsed(parsed: &ParsedReply) {
    println!(
        "{} {} usable comments",
        pool_prefix(),
        bold().apply_to(parsed.total())
    );
    let levels: Vec<Level> = Level::all().collect();
    for (i, level) in levels.iter().enumerate() {
        println!(
            "{}{} {}",
            tree_item(i == levels.len() - 1),
            pad_label(&level.to_string(), 1),
            bold().apply_to(parsed.get(*level).len())
        );
    }
}

pub fn log_pool_shortfall(shortfall: &Shortfall) {
    println!(
        "{} '{}' needs {} comments but the reply had {}; {} students will share a repeated comment",
        yellow().apply_to("[WARN]"),
        shortfall.level,
        bold().apply_to(shortfall.needed),
        bold().apply_to(shortfall.available),
        yellow().apply_to(shortfall.repeated())
    );
}

pub fn log_pool_contents(level: Level, comments: &[String]) {
    println!("{}", bold().apply_to(level.to_string().to_uppercase()));
    if comments.is_empty() {
        println!("{}{}", tree_end(), dim().apply_to("none"));
        return;
    }
    let count = comments.len();
    for (i, comment) in comments.iter().enumerate() {
        println!(
            "{}{}",
            tree_item(i == count - 1),
            truncate(comment, PREVIEW_CHARS)
        );
    }
}

pub fn log_export_done(path: &Path, rows: usize) {
    println!(
        "{} wrote {} rows to {}",
        export_prefix(),
        bold().apply_to(rows),
        cyan().apply_to(path.display())
    );
}

pub fn log_sample(annotated: &AnnotatedRoster, score_idx: usize, rows: &[usize]) {
    if rows.is_empty() {
        return;
    }
    println!("{} spot check:", export_prefix());
    for (i, &row) in rows.iter().enumerate() {
        let score = annotated
            .rows
            .get(row)
            .and_then(|r| r.get(score_idx))
            .map(|c| c.to_string())
            .unwrap_or_default();
        println!(
            "{}{} {}",
            tree_item(i == rows.len() - 1),
            pad_label(&format!("row {} [{}]", row + 2, score), 1),
            truncate(annotated.comment(row), PREVIEW_CHARS)
        );
    }
}

pub fn log_missing_key() {
    println!(
        "{} {}",
        yellow().apply_to("[WARN]"),
        "missing API key: pass --api-key or set GEMINI_API_KEY"
    );
}

pub fn log_generic_error(prefix: &str, message: &str) {
    eprintln!("{} {}", red().apply_to(prefix), message);
}

pub fn log_success(message: &str) {
    println!("{} {}", green().bold().apply_to("done"), message);
}

pub fn log_dimmed(message: &str) {
    println!("{}", dim().apply_to(message));
}
