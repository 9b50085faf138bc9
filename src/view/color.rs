use crate::item::ItemError;
use regex::Regex;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^#?([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})?$").unwrap()
});

/// RGBA 색상
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLUE: Color = Color::rgb(0, 122, 255);
    pub const GRAY: Color = Color::rgb(142, 142, 147);

    /// 첫 화면(로그인/도서 목록)의 고정 배경색
    pub const ROOT_BACKGROUND: Color = Color::rgb(189, 213, 231);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `#RRGGBB` 혹은 `#RRGGBBAA` 형식의 문자열을 파싱한다.
    ///
    /// # Example
    /// ```
    /// use book_look_rust::view::color::Color;
    ///
    /// assert_eq!(Color::ROOT_BACKGROUND, Color::from_hex("#BDD5E7").unwrap());
    /// assert!(Color::from_hex("blue").is_err());
    /// ```
    pub fn from_hex(s: &str) -> Result<Self, ItemError> {
        let captures = HEX_COLOR.captures(s.trim())
            .ok_or_else(|| ItemError::InvalidArgument(format!("color: {}", s)))?;

        let channel = |i: usize| {
            captures.get(i)
                .and_then(|m| u8::from_str_radix(m.as_str(), 16).ok())
        };

        Ok(Self {
            r: channel(1).unwrap_or(0),
            g: channel(2).unwrap_or(0),
            b: channel(3).unwrap_or(0),
            a: channel(4).unwrap_or(255),
        })
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

pub const COLOR_PICKER_TITLE: &str = "Choose a Background Color";

/// 배경색 선택 시트
///
/// 선택을 적용하면 전달 받은 콜백을 한번 호출하고 시트는 닫힌다(소비된다).
/// 적용하지 않고 버리면 콜백은 호출되지 않는다.
pub struct ColorPickerSheet<F>
where
    F: FnOnce(Color)
{
    selected: Color,
    on_select: F,
}

impl<F: FnOnce(Color)> ColorPickerSheet<F> {
    pub fn new(on_select: F) -> Self {
        Self { selected: Color::WHITE, on_select }
    }

    pub fn selected(&self) -> Color {
        self.selected
    }

    pub fn select(&mut self, color: Color) {
        self.selected = color;
    }

    pub fn apply(self) {
        (self.on_select)(self.selected);
    }

    pub fn dismiss(self) {}
}
