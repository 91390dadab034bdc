use crate::evidence::load_evidence;
use crate::export::{sample_rows, write_workbook, AnnotatedRoster, ExportLayout};
use crate::grading::{
    assign_comments, build_prompt, classify, evidence_excerpt, parse_reply, CommentPools,
    LessonContext, Level, LevelCounts, RequestedCounts, Shortfall,
};
use crate::roster::Roster;
use crate::settings::settings;
use crate::utils::gemini::GeminiClient;
use crate::utils::{
    log_evidence, log_export_done, log_level_counts, log_parsed, log_pool_shortfall,
    log_reply_saved, log_request_done, log_request_start, log_sample, log_unclassified,
};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub score_column: String,
    pub comment_column: String,
    pub lesson: LessonContext,
    pub evidence: Vec<PathBuf>,
    pub output: PathBuf,
    pub save_reply: Option<PathBuf>,
}

/// Where the batch of candidate comments comes from.
pub enum ReplySource {
    Service(GeminiClient),
    Saved(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ClassifiedRoster {
    pub score_idx: usize,
    pub levels: Vec<Option<Level>>,
    pub counts: LevelCounts,
}

impl ClassifiedRoster {
    /// Sheet row numbers of students without a level.
    pub fn unclassified_rows(&self, roster: &Roster) -> Vec<usize> {
        self.levels
            .iter()
            .enumerate()
            .filter(|(_, level)| level.is_none())
            .map(|(idx, _)| roster.sheet_row(idx))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output: PathBuf,
    pub rows: usize,
    pub shortfalls: Vec<Shortfall>,
    pub unclassified: usize,
}

pub fn classify_roster(roster: &Roster, score_column: &str) -> Result<ClassifiedRoster> {
    let score_idx = roster.column_index(score_column)?;
    let levels: Vec<Option<Level>> = roster.column(score_idx).map(classify).collect();
    let counts = LevelCounts::tally(&levels);
    Ok(ClassifiedRoster {
        score_idx,
        levels,
        counts,
    })
}

/// Load, classify, request, parse, assign, export. One pass, no retries; the
/// output file is written only when every earlier step succeeded.
pub async fn run(roster: &Roster, options: &RunOptions, source: &ReplySource) -> Result<RunSummary> {
    let s = settings();

    let classified = classify_roster(roster, &options.score_column)?;
    let requested = RequestedCounts::from_counts(&classified.counts);
    log_level_counts(&classified.counts, &requested);
    log_unclassified(&classified.unclassified_rows(roster), &s.fallbacks.assignment);

    let evidence = load_evidence(&options.evidence);
    log_evidence(&evidence, s.evidence.excerpt_chars);

    let excerpt = evidence_excerpt(&evidence.text, s.evidence.excerpt_chars);
    let prompt = build_prompt(&options.lesson, &excerpt, &requested);

    let reply = match source {
        ReplySource::Service(client) => {
            log_request_start(requested.total());
            let started = Instant::now();
            let reply = client.generate(&prompt, &evidence.media).await?;
            log_request_done(started.elapsed(), reply.chars().count());
            reply
        }
        ReplySource::Saved(path) => fs::read_to_string(path)
            .with_context(|| format!("cannot read saved reply {}", path.display()))?,
    };

    if let Some(path) = &options.save_reply {
        fs::write(path, &reply)
            .with_context(|| format!("cannot save reply to {}", path.display()))?;
        log_reply_saved(path);
    }

    let parsed = parse_reply(&reply, s.parsing.min_comment_chars);
    log_parsed(&parsed);

    let mut rng = rand::rng();
    let (mut pools, shortfalls) = CommentPools::from_reply(
        &parsed,
        &classified.counts,
        &s.fallbacks.pool_filler,
        &mut rng,
    );
    for shortfall in &shortfalls {
        log_pool_shortfall(shortfall);
    }

    let comments = assign_comments(&classified.levels, &mut pools, &s.fallbacks.assignment);

    let annotated = AnnotatedRoster::new(roster, &options.comment_column, &comments);
    let layout = ExportLayout {
        sheet_name: s.export.sheet_name.clone(),
        comment_column_width: s.export.comment_column_width,
    };
    write_workbook(&options.output, &annotated, &layout)
        .with_context(|| format!("cannot write {}", options.output.display()))?;
    log_export_done(&options.output, annotated.rows.len());

    let sample = sample_rows(annotated.rows.len(), s.export.sample_size, &mut rng);
    log_sample(&annotated, classified.score_idx, &sample);

    Ok(RunSummary {
        output: options.output.clone(),
        rows: annotated.rows.len(),
        shortfalls,
        unclassified: classified.counts.unclassified,
    })
}
