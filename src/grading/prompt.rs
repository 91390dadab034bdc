use super::level::{Level, LevelCounts};

/// What the class worked on, as typed by the teacher.
#[derive(Debug, Clone)]
pub struct LessonContext {
    pub subject: String,
    pub lesson: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedCounts {
    pub good: usize,
    pub completion: usize,
    pub not_yet: usize,
}

impl RequestedCounts {
    pub fn from_counts(counts: &LevelCounts) -> Self {
        Self {
            good: counts.requested(Level::GoodCompletion),
            completion: counts.requested(Level::Completion),
            not_yet: counts.requested(Level::NotYetCompleted),
        }
    }

    pub fn total(&self) -> usize {
        self.good + self.completion + self.not_yet
    }
}

/// First `max_chars` characters of the extracted evidence text.
pub fn evidence_excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub fn build_prompt(lesson: &LessonContext, excerpt: &str, requested: &RequestedCounts) -> String {
    format!(
        r#"Bạn là giáo viên. Viết nhận xét DUY NHẤT (không trùng nhau) cho danh sách học sinh môn {subject}, bài {topic}.
Minh chứng: {excerpt}...

QUY TẮC CỐT LÕI:
1. KHÔNG viết in hoa toàn bộ. Chỉ viết hoa chữ cái đầu câu. (Ví dụ: "Thành thạo..." thay vì "THÀNH THẠO...").
2. TỪ CẤM: "Em", "Con", "Bạn".
3. ĐỘ DÀI: Khoảng 200 ký tự (đủ ý nhưng ngắn gọn).

YÊU CẦU SỐ LƯỢNG (BẮT BUỘC ĐỦ):
- Viết {good} câu cho mức HOÀN THÀNH TỐT.
- Viết {completion} câu cho mức HOÀN THÀNH.
- Viết {not_yet} câu cho mức CHƯA HOÀN THÀNH.

CẤU TRÚC:
1. NHÓM HOÀN THÀNH TỐT (Chỉ khen, KHÔNG dùng "tuy nhiên/nhưng"):
   - Khen kỹ năng cụ thể + Khen sự sáng tạo/thái độ.
   - Ví dụ: Thao tác chuột rất nhanh nhẹn, hoàn thành xuất sắc bài thực hành.

2. NHÓM HOÀN THÀNH (Có 2 vế):
   - [Điểm làm được] NHƯNG/TUY NHIÊN [Điểm cần rèn thêm].

3. NHÓM CHƯA HOÀN THÀNH (Có 2 vế):
   - [Sự tham gia] NHƯNG [Cần GV hỗ trợ gì].

ĐỊNH DẠNG TRẢ VỀ:
I. {good_marker}
- [Câu 1]
...
II. {completion_marker}
...
III. {not_yet_marker}
...
"#,
        subject = lesson.subject,
        topic = lesson.lesson,
        excerpt = excerpt,
        good = requested.good,
        completion = requested.completion,
        not_yet = requested.not_yet,
        good_marker = Level::GoodCompletion.marker(),
        completion_marker = Level::Completion.marker(),
        not_yet_marker = Level::NotYetCompleted.marker(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson() -> LessonContext {
        LessonContext {
            subject: "Tin học".into(),
            lesson: "Chủ đề E".into(),
        }
    }

    #[test]
    fn test_prompt_carries_counts_and_markers() {
        let requested = RequestedCounts {
            good: 13,
            completion: 7,
            not_yet: 2,
        };
        let prompt = build_prompt(&lesson(), "Bài thực hành gõ phím", &requested);

        assert!(prompt.contains("môn Tin học, bài Chủ đề E"));
        assert!(prompt.contains("Minh chứng: Bài thực hành gõ phím..."));
        assert!(prompt.contains("Viết 13 câu cho mức HOÀN THÀNH TỐT."));
        assert!(prompt.contains("Viết 7 câu cho mức HOÀN THÀNH."));
        assert!(prompt.contains("Viết 2 câu cho mức CHƯA HOÀN THÀNH."));
        for level in Level::all() {
            assert!(prompt.contains(level.marker()));
        }
    }

    #[test]
    fn test_prompt_format_parses_as_sections() {
        use crate::grading::parser::parse_reply;

        let requested = RequestedCounts {
            good: 1,
            completion: 1,
            not_yet: 1,
        };
        let parsed = parse_reply(&build_prompt(&lesson(), "", &requested), 16);
        // the template itself must not leak example comments into any pool
        assert_eq!(parsed.good.len(), 0);
        assert_eq!(parsed.not_yet.len(), 0);
    }

    #[test]
    fn test_requested_counts_inflate_need() {
        let counts = LevelCounts {
            good: 10,
            completion: 0,
            not_yet: 3,
            unclassified: 4,
        };
        let requested = RequestedCounts::from_counts(&counts);
        assert!(requested.good > counts.good);
        assert!(requested.completion > 0);
        assert!(requested.not_yet > counts.not_yet);
    }

    #[test]
    fn test_excerpt_counts_characters() {
        assert_eq!(evidence_excerpt("Hoàn thành", 4), "Hoàn");
        assert_eq!(evidence_excerpt("ab", 10), "ab");
    }
}
