use super::level::{Level, MARKER_KEYWORD};

const NUMBERING_CHARS: &[char] = &[
    '-', '*', '.', ' ', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];
const EDGE_BULLETS: &[char] = &['-', '*', '•'];

/// Candidate comments bucketed by the section heading they appeared under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReply {
    pub good: Vec<String>,
    pub completion: Vec<String>,
    pub not_yet: Vec<String>,
}

impl ParsedReply {
    pub fn get(&self, level: Level) -> &[String] {
        match level {
            Level::GoodCompletion => &self.good,
            Level::Completion => &self.completion,
            Level::NotYetCompleted => &self.not_yet,
        }
    }

    fn bucket_mut(&mut self, level: Level) -> &mut Vec<String> {
        match level {
            Level::GoodCompletion => &mut self.good,
            Level::Completion => &mut self.completion,
            Level::NotYetCompleted => &mut self.not_yet,
        }
    }

    pub fn total(&self) -> usize {
        self.good.len() + self.completion.len() + self.not_yet.len()
    }
}

pub fn parse_reply(text: &str, min_chars: usize) -> ParsedReply {
    let mut parsed = ParsedReply::default();
    let mut current: Option<Level> = None;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(level) = Level::from_marker_line(&line.to_uppercase()) {
            current = Some(level);
            continue;
        }

        let Some(level) = current else {
            continue;
        };

        if let Some(comment) = clean_candidate(line, min_chars) {
            parsed.bucket_mut(level).push(comment);
        }
    }

    parsed
}

fn is_candidate_line(line: &str) -> bool {
    line.chars()
        .next()
        .is_some_and(|c| c == '-' || c == '*' || c.is_ascii_digit())
}

/// Turns one bulleted or numbered reply line into a comment, or `None` when
/// the line is not a usable comment.
pub fn clean_candidate(line: &str, min_chars: usize) -> Option<String> {
    if !is_candidate_line(line) {
        return None;
    }

    let stripped = line.trim_start_matches(NUMBERING_CHARS).replace("**", "");
    if stripped.to_uppercase().contains(MARKER_KEYWORD) {
        return None;
    }

    let comment = capitalize_first(stripped.trim().trim_matches(EDGE_BULLETS).trim());
    if comment.chars().count() < min_chars {
        return None;
    }

    Some(comment)
}

/// Uppercases the first character and leaves the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: usize = 16;

    const SAMPLE_REPLY: &str = "\
Dưới đây là các nhận xét:
- Câu này nằm ngoài mọi mục nên bị bỏ qua.

I. MỨC: HOÀN THÀNH TỐT
- thao tác chuột rất nhanh nhẹn, hoàn thành xuất sắc bài thực hành.
* **Sáng tạo** trong cách trình bày sản phẩm, tích cực phát biểu.
1. Nắm vững kiến thức bài học, vận dụng linh hoạt vào thực hành.
- Quá ngắn.
Đây là dòng giải thích không có gạch đầu dòng nên bị bỏ qua.

II. MỨC: HOÀN THÀNH
- Biết thực hiện các thao tác cơ bản, tuy nhiên cần rèn thêm tốc độ gõ phím.
- II. Mức: Hoàn thành (nhắc lại tiêu đề)

III. MỨC: CHƯA HOÀN THÀNH
2. Có tham gia hoạt động nhóm nhưng cần giáo viên hướng dẫn thêm khi thực hành.
";

    #[test]
    fn test_buckets_by_section() {
        let parsed = parse_reply(SAMPLE_REPLY, MIN);
        assert_eq!(
            parsed.good,
            vec![
                "Thao tác chuột rất nhanh nhẹn, hoàn thành xuất sắc bài thực hành.",
                "Sáng tạo trong cách trình bày sản phẩm, tích cực phát biểu.",
                "Nắm vững kiến thức bài học, vận dụng linh hoạt vào thực hành.",
            ]
        );
        assert_eq!(
            parsed.completion,
            vec!["Biết thực hiện các thao tác cơ bản, tuy nhiên cần rèn thêm tốc độ gõ phím."]
        );
        assert_eq!(
            parsed.not_yet,
            vec!["Có tham gia hoạt động nhóm nhưng cần giáo viên hướng dẫn thêm khi thực hành."]
        );
        assert_eq!(parsed.total(), 5);
    }

    #[test]
    fn test_sections_in_any_order_and_case() {
        let reply = "\
mức: chưa hoàn thành
- Cần cố gắng nhiều hơn trong giờ thực hành máy tính.
Mức: Hoàn Thành Tốt
- Hoàn thành xuất sắc mọi yêu cầu của bài học hôm nay.
mỨc: hoàn thành
- Làm được bài nhưng cần cẩn thận hơn khi lưu tệp.
MỨC: CHƯA HOÀN THÀNH
- Chưa nhớ cách mở phần mềm, cần luyện tập thêm ở nhà.
";
        let parsed = parse_reply(reply, MIN);
        assert_eq!(parsed.not_yet.len(), 2);
        assert_eq!(parsed.good.len(), 1);
        assert_eq!(parsed.completion.len(), 1);
        assert!(parsed.completion[0].starts_with("Làm được bài"));
    }

    #[test]
    fn test_short_lines_never_pooled() {
        assert_eq!(clean_candidate("- Rất tốt.", MIN), None);
        assert_eq!(clean_candidate("- 123456789012345", MIN), None);
        // exactly 16 characters survives
        assert_eq!(
            clean_candidate("- abcdefghijklmnop", MIN).as_deref(),
            Some("Abcdefghijklmnop")
        );
        assert_eq!(clean_candidate("- abcdefghijklmno", MIN), None);
    }

    #[test]
    fn test_cleanup_strips_markup_and_keeps_rest() {
        assert_eq!(
            clean_candidate("12. **tích cực** phát biểu XÂY DỰNG bài •", MIN).as_deref(),
            Some("Tích cực phát biểu XÂY DỰNG bài")
        );
        assert_eq!(
            clean_candidate("*   - đọc hiểu tốt đề bài và trình bày rõ ràng", MIN).as_deref(),
            Some("Đọc hiểu tốt đề bài và trình bày rõ ràng")
        );
    }

    #[test]
    fn test_non_candidate_lines() {
        assert_eq!(clean_candidate("Nhận xét chung cho cả lớp rất tốt.", MIN), None);
        assert_eq!(clean_candidate("• Gạch đầu dòng kiểu khác không được nhận.", MIN), None);
        assert_eq!(clean_candidate("- Mức: hoàn thành tốt và rất chăm chỉ", MIN), None);
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("ứng dụng tốt"), "Ứng dụng tốt");
        assert_eq!(capitalize_first("abc DEF"), "Abc DEF");
        assert_eq!(capitalize_first(""), "");
    }
}
