mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{choose_column, Args};
use comment_assistant::credentials::ApiKey;
use comment_assistant::error::AssistantError;
use comment_assistant::export::default_output_path;
use comment_assistant::grading::LessonContext;
use comment_assistant::pipeline::{self, ReplySource, RunOptions};
use comment_assistant::roster::Roster;
use comment_assistant::settings::settings;
use comment_assistant::utils::gemini::GeminiClient;
use comment_assistant::utils::{
    log_generic_error, log_init, log_key_source, log_missing_key, log_newline,
    log_offline_reply, log_roster_loaded, log_roster_preview, log_success,
};
use std::process;
use tracing::subscriber::set_global_default;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("comment_assistant=info".parse()?))
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );
    set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let args = Args::parse();

    if let Err(e) = run(args).await {
        log_generic_error("[ERROR]", &format!("processing failed: {e:#}"));
        process::exit(1);
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let s = settings();
    log_init(&s.generation.model);

    let source = match &args.reply_file {
        Some(path) => {
            log_offline_reply(path);
            ReplySource::Saved(path.clone())
        }
        None => {
            let key = match ApiKey::from_env(args.api_key.as_deref()) {
                Ok(key) => key,
                Err(AssistantError::MissingCredential) => {
                    log_missing_key();
                    process::exit(1);
                }
                Err(e) => {
                    log_generic_error("[CONFIG]", &e.to_string());
                    process::exit(1);
                }
            };
            log_key_source(key.source());
            ReplySource::Service(GeminiClient::new(
                key,
                &s.generation.api_base,
                &s.generation.model,
            ))
        }
    };

    let roster = Roster::load(&args.roster, args.sheet.as_deref())
        .with_context(|| format!("cannot read {}", args.roster.display()))?;
    log_roster_loaded(&args.roster, &roster);
    log_roster_preview(&roster, s.export.preview_rows);
    log_newline();

    let score_column = match args.score_column {
        Some(column) => column,
        None => choose_column(&roster.headers)?,
    };

    let lesson = LessonContext {
        subject: args.subject.unwrap_or_else(|| s.defaults.subject.clone()),
        lesson: args.lesson.unwrap_or_else(|| s.defaults.lesson.clone()),
    };
    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&s.export.file_prefix, &lesson.subject));

    let options = RunOptions {
        score_column,
        comment_column: args
            .comment_column
            .unwrap_or_else(|| s.defaults.comment_column.clone()),
        lesson,
        evidence: args.evidence,
        output,
        save_reply: args.save_reply,
    };

    let summary = pipeline::run(&roster, &options, &source).await?;

    log_newline();
    log_success(&format!(
        "{} students commented, download {}",
        summary.rows,
        summary.output.display()
    ));

    Ok(())
}
