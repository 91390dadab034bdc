use crate::roster::CellValue;
use crate::settings::settings;
use strum::{Display, EnumIter, IntoEnumIterator};

pub const GOOD_THRESHOLD: f64 = 7.0;
pub const COMPLETION_THRESHOLD: f64 = 5.0;

/// The keyword every section marker shares. A candidate comment that repeats
/// it is a stray heading, not a comment.
pub const MARKER_KEYWORD: &str = "MỨC:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Level {
    #[strum(serialize = "Hoàn thành tốt")]
    GoodCompletion,
    #[strum(serialize = "Hoàn thành")]
    Completion,
    #[strum(serialize = "Chưa hoàn thành")]
    NotYetCompleted,
}

impl Level {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "T" => Some(Level::GoodCompletion),
            "H" => Some(Level::Completion),
            "C" => Some(Level::NotYetCompleted),
            _ => None,
        }
    }

    pub fn from_score(score: f64) -> Self {
        if score >= GOOD_THRESHOLD {
            Level::GoodCompletion
        } else if score >= COMPLETION_THRESHOLD {
            Level::Completion
        } else {
            Level::NotYetCompleted
        }
    }

    /// Section heading the service is asked to emit before each group.
    pub fn marker(&self) -> &'static str {
        match self {
            Level::GoodCompletion => "MỨC: HOÀN THÀNH TỐT",
            Level::Completion => "MỨC: HOÀN THÀNH",
            Level::NotYetCompleted => "MỨC: CHƯA HOÀN THÀNH",
        }
    }

    /// Detects a section heading in an already uppercased line. The plain
    /// completion marker is a substring of the other two, so it goes last.
    pub fn from_marker_line(upper_line: &str) -> Option<Self> {
        [
            Level::GoodCompletion,
            Level::NotYetCompleted,
            Level::Completion,
        ]
        .into_iter()
        .find(|level| upper_line.contains(level.marker()))
    }

    pub fn index(&self) -> usize {
        match self {
            Level::GoodCompletion => 0,
            Level::Completion => 1,
            Level::NotYetCompleted => 2,
        }
    }

    pub fn all() -> impl Iterator<Item = Level> {
        Level::iter()
    }
}

/// Blank cells read as a missing score and fall below both thresholds, like
/// `NaN`. Booleans count as 1 or 0. Dates and unparseable text have no level.
pub fn classify(cell: &CellValue) -> Option<Level> {
    match cell {
        CellValue::Empty => Some(Level::from_score(f64::NAN)),
        CellValue::Number(n) => Some(Level::from_score(*n)),
        CellValue::Bool(b) => Some(Level::from_score(f64::from(u8::from(*b)))),
        CellValue::Text(text) => classify_text(text),
        CellValue::DateTime(_) => None,
    }
}

fn classify_text(text: &str) -> Option<Level> {
    let normalized = text.trim().to_uppercase();
    if let Some(level) = Level::from_code(&normalized) {
        return Some(level);
    }
    normalized.parse::<f64>().ok().map(Level::from_score)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub good: usize,
    pub completion: usize,
    pub not_yet: usize,
    pub unclassified: usize,
}

impl LevelCounts {
    pub fn tally<'a>(levels: impl IntoIterator<Item = &'a Option<Level>>) -> Self {
        let mut counts = Self::default();
        for level in levels {
            match level {
                Some(Level::GoodCompletion) => counts.good += 1,
                Some(Level::Completion) => counts.completion += 1,
                Some(Level::NotYetCompleted) => counts.not_yet += 1,
                None => counts.unclassified += 1,
            }
        }
        counts
    }

    pub fn get(&self, level: Level) -> usize {
        match level {
            Level::GoodCompletion => self.good,
            Level::Completion => self.completion,
            Level::NotYetCompleted => self.not_yet,
        }
    }

    pub fn classified(&self) -> usize {
        self.good + self.completion + self.not_yet
    }

    /// Count to ask the service for: the real need inflated, plus a buffer.
    pub fn requested(&self, level: Level) -> usize {
        let s = settings();
        requested_count(self.get(level), s.requests.inflation, s.requests.buffer)
    }
}

pub fn requested_count(need: usize, inflation: f64, buffer: usize) -> usize {
    (need as f64 * (1.0 + inflation)).floor() as usize + buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::from(s)
    }

    #[test]
    fn test_letter_codes() {
        assert_eq!(classify(&text("T")), Some(Level::GoodCompletion));
        assert_eq!(classify(&text(" h ")), Some(Level::Completion));
        assert_eq!(classify(&text("c\t")), Some(Level::NotYetCompleted));
        assert_eq!(classify(&text("t")), Some(Level::GoodCompletion));
    }

    #[test]
    fn test_numeric_boundaries() {
        assert_eq!(classify(&CellValue::Number(7.0)), Some(Level::GoodCompletion));
        assert_eq!(classify(&CellValue::Number(6.99)), Some(Level::Completion));
        assert_eq!(classify(&CellValue::Number(5.0)), Some(Level::Completion));
        assert_eq!(classify(&CellValue::Number(4.99)), Some(Level::NotYetCompleted));
        assert_eq!(classify(&CellValue::Number(10.0)), Some(Level::GoodCompletion));
        assert_eq!(classify(&CellValue::Number(0.0)), Some(Level::NotYetCompleted));
    }

    #[test]
    fn test_numeric_text() {
        assert_eq!(classify(&text(" 8 ")), Some(Level::GoodCompletion));
        assert_eq!(classify(&text("5.0")), Some(Level::Completion));
        assert_eq!(classify(&text("-1")), Some(Level::NotYetCompleted));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(classify(&text("Giỏi")), None);
        assert_eq!(classify(&text("8,5")), None);
        assert_eq!(classify(&text("TH")), None);
        assert_eq!(classify(&text("vắng")), None);
        assert_eq!(classify(&CellValue::DateTime(42443.0)), None);
    }

    #[test]
    fn test_missing_and_special_scores() {
        assert_eq!(classify(&CellValue::Empty), Some(Level::NotYetCompleted));
        assert_eq!(classify(&CellValue::Number(f64::NAN)), Some(Level::NotYetCompleted));
        assert_eq!(classify(&text("nan")), Some(Level::NotYetCompleted));
        assert_eq!(classify(&text("inf")), Some(Level::GoodCompletion));
        assert_eq!(classify(&text("-inf")), Some(Level::NotYetCompleted));
        assert_eq!(classify(&CellValue::Bool(true)), Some(Level::NotYetCompleted));
    }

    #[test]
    fn test_marker_detection_prefers_longer_markers() {
        assert_eq!(
            Level::from_marker_line("I. MỨC: HOÀN THÀNH TỐT"),
            Some(Level::GoodCompletion)
        );
        assert_eq!(
            Level::from_marker_line("III. MỨC: CHƯA HOÀN THÀNH"),
            Some(Level::NotYetCompleted)
        );
        assert_eq!(
            Level::from_marker_line("**II. MỨC: HOÀN THÀNH**"),
            Some(Level::Completion)
        );
        assert_eq!(Level::from_marker_line("- HOÀN THÀNH TỐT"), None);
    }

    #[test]
    fn test_tally() {
        let levels = vec![
            Some(Level::GoodCompletion),
            Some(Level::GoodCompletion),
            Some(Level::NotYetCompleted),
            None,
        ];
        let counts = LevelCounts::tally(&levels);
        assert_eq!(counts.get(Level::GoodCompletion), 2);
        assert_eq!(counts.get(Level::Completion), 0);
        assert_eq!(counts.get(Level::NotYetCompleted), 1);
        assert_eq!(counts.unclassified, 1);
        assert_eq!(counts.classified(), 3);
    }

    #[test]
    fn test_requested_count() {
        assert_eq!(requested_count(0, 0.10, 2), 2);
        assert_eq!(requested_count(10, 0.10, 2), 13);
        assert_eq!(requested_count(9, 0.10, 2), 11);
        assert_eq!(requested_count(25, 0.10, 2), 29);
    }
}
