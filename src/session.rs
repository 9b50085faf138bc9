/// 현재 인증된 사용자 정보
///
/// 인증 제공자가 알려주는 "현재 사용자 아이디 혹은 없음"을 그대로 담는다.
/// 전역 상태에서 조회하지 않고 필요한 연산마다 명시적으로 전달한다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<String>,
}

impl Session {
    pub fn authenticated(user_id: &str) -> Self {
        Self { user_id: Some(user_id.to_owned()) }
    }

    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

impl From<Option<String>> for Session {
    fn from(user_id: Option<String>) -> Self {
        Self { user_id: user_id.filter(|id| !id.is_empty()) }
    }
}
