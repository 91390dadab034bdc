use clap::Parser;
use comment_assistant::grading::{parse_reply, CommentPools, Level, LevelCounts};
use comment_assistant::settings::settings;
use comment_assistant::utils::{
    log_dimmed, log_generic_error, log_newline, log_parsed, log_pool_contents, log_pool_shortfall,
};
use std::fs;
use std::path::PathBuf;
use std::process;

/// Parses a saved reply and shows the comment pools a class of the given
/// size would draw from.
#[derive(Debug, Parser)]
#[command(name = "preview-pools", version)]
struct Args {
    reply_file: PathBuf,

    /// Students at "Hoàn thành tốt"
    #[arg(long, default_value_t = 0)]
    good: usize,

    /// Students at "Hoàn thành"
    #[arg(long, default_value_t = 0)]
    completion: usize,

    /// Students at "Chưa hoàn thành"
    #[arg(long, default_value_t = 0)]
    not_yet: usize,
}

fn main() {
    let args = Args::parse();
    let s = settings();

    let reply = match fs::read_to_string(&args.reply_file) {
        Ok(text) => text,
        Err(e) => {
            log_generic_error(
                "[ERROR]",
                &format!("cannot read {}: {e}", args.reply_file.display()),
            );
            process::exit(1);
        }
    };

    let parsed = parse_reply(&reply, s.parsing.min_comment_chars);
    log_parsed(&parsed);
    log_newline();

    let counts = LevelCounts {
        good: args.good,
        completion: args.completion,
        not_yet: args.not_yet,
        unclassified: 0,
    };
    if counts.classified() == 0 {
        log_dimmed("no class size given, pass --good/--completion/--not-yet to build pools");
        return;
    }

    let mut rng = rand::rng();
    let (pools, shortfalls) =
        CommentPools::from_reply(&parsed, &counts, &s.fallbacks.pool_filler, &mut rng);
    for shortfall in &shortfalls {
        log_pool_shortfall(shortfall);
    }

    for level in Level::all() {
        let comments: Vec<String> = pools.iter(level).cloned().collect();
        log_pool_contents(level, &comments);
    }
}
