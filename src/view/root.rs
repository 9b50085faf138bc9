use crate::session::Session;
use crate::view::color::Color;

/// 앱의 첫 화면. 로그인 세션이 있으면 도서 목록, 없으면 로그인 화면을 보여준다.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RootScreen {
    BookList,
    Login,
}

impl RootScreen {
    pub fn for_session(session: &Session) -> Self {
        if session.is_authenticated() {
            RootScreen::BookList
        } else {
            RootScreen::Login
        }
    }

    pub fn background(&self) -> Color {
        Color::ROOT_BACKGROUND
    }
}
