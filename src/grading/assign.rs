use super::level::Level;
use super::pool::CommentPools;

/// Hands out one comment per student in roster order. Unclassified students
/// and exhausted pools get `fallback`.
pub fn assign_comments(
    levels: &[Option<Level>],
    pools: &mut CommentPools,
    fallback: &str,
) -> Vec<String> {
    levels
        .iter()
        .map(|level| {
            level
                .and_then(|level| pools.pop(level))
                .unwrap_or_else(|| fallback.to_string())
        })
        .collect()
}
