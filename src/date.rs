use crate::item::ItemError;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset};
use std::borrow::Cow;
use std::fmt::Write;

/// 업스트림에서 내려오는 출판일 형식 (`yyyy-MM-dd'T'HH:mm:ssZ`)
pub const RAW_DATE_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%z";

/// 화면에 표시할 기본 날짜 형식 (예: `May 1, 2023`)
pub const DEFAULT_DISPLAY_PATTERN: &str = "%b %-d, %Y";

/// 날짜가 없거나 형식이 맞지 않을 때 표시하는 값
pub const UNKNOWN_DATE: &str = "Unknown";

/// 출판일 문자열을 화면 표시용 문자열로 변환한다.
///
/// 입력은 [`RAW_DATE_PATTERN`]과 정확히 일치해야 하며, 다른 형식으로 재시도 하지 않는다.
/// 타임존은 `+0000`, `+00:00` 혹은 `Z`를 허용한다.
///
/// # Example
/// ```
/// use book_look_rust::date::DateFormatter;
///
/// let formatter = DateFormatter::default();
/// assert_eq!("May 1, 2023", formatter.format(Some("2023-05-01T00:00:00Z")));
/// assert_eq!("Unknown", formatter.format(Some("2023-05-01")));
/// assert_eq!("Unknown", formatter.format(None));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormatter {
    display_pattern: String,
}

impl DateFormatter {
    /// 표시 형식을 지정해 생성한다. 형식은 chrono strftime 문법을 따른다.
    pub fn new(display_pattern: &str) -> Result<Self, ItemError> {
        let invalid = StrftimeItems::new(display_pattern)
            .any(|item| matches!(item, Item::Error));
        if invalid || display_pattern.is_empty() {
            return Err(ItemError::InvalidArgument(format!("date pattern: {}", display_pattern)));
        }

        Ok(Self { display_pattern: display_pattern.to_owned() })
    }

    pub fn display_pattern(&self) -> &str {
        &self.display_pattern
    }

    pub fn format(&self, raw: Option<&str>) -> String {
        raw.and_then(parse_raw_date)
            .and_then(|date| {
                let mut s = String::new();
                write!(s, "{}", date.format(&self.display_pattern)).ok()?;
                Some(s)
            })
            .unwrap_or_else(|| UNKNOWN_DATE.to_owned())
    }
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self { display_pattern: DEFAULT_DISPLAY_PATTERN.to_owned() }
    }
}

/// [`RAW_DATE_PATTERN`] 형식의 문자열을 파싱한다. 입력에 포함된 오프셋을 그대로 유지한다.
pub fn parse_raw_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let normalized = match raw.strip_suffix('Z') {
        Some(prefix) => Cow::Owned(format!("{}+0000", prefix)),
        None => Cow::Borrowed(raw),
    };

    DateTime::parse_from_str(&normalized, RAW_DATE_PATTERN).ok()
}
