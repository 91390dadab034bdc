mod assign;
pub mod level;
pub mod parser;
pub mod pool;
mod prompt;

pub use assign::assign_comments;
pub use level::{classify, Level, LevelCounts};
pub use parser::{parse_reply, ParsedReply};
pub use pool::{build_pool, CommentPools, Shortfall};
pub use prompt::{build_prompt, evidence_excerpt, LessonContext, RequestedCounts};
