use crate::date::DateFormatter;
use crate::item::{Book, BookId, BookSnapshot, Category};
use crate::session::Session;
use crate::store::{RemoteStore, StoreError, StorePath};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::mpsc;
use thiserror::Error;
use tracing::{error, info, warn};

/// 실패 채널에 쌓아둘 수 있는 최대 개수. 가득 차면 새 실패는 로그만 남기고 버린다.
pub const FAILURE_QUEUE_DEPTH: usize = 64;

/// 상태 동기화 에러
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// 인증된 사용자가 없어 원격 저장소를 호출하지 않음
    #[error("user not authenticated")]
    Unauthenticated,

    /// 같은 카테고리의 토글이 아직 끝나지 않음
    #[error("toggle already in flight: {0}")]
    InFlight(Category),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 원격 저장소에 보낸 연산 종류
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SyncOperation {
    Check,
    Add,
    Remove,
}

impl Display for SyncOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SyncOperation::Check => write!(f, "CHECK"),
            SyncOperation::Add => write!(f, "ADD"),
            SyncOperation::Remove => write!(f, "REMOVE"),
        }
    }
}

/// 실패 채널로 전달되는 원격 연산 실패 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub category: Category,
    pub book_id: BookId,
    pub operation: SyncOperation,
    pub error: StoreError,
}

/// 카테고리 하나에 대한 화면상의 상태
///
/// 토글은 결과를 기다리지 않고 바로 [`StatusFlag::Pending`]으로 바뀌며, 원격 저장이 끝나면
/// [`StatusFlag::Confirmed`] 혹은 [`StatusFlag::Failed`]로 정리된다. 실패 시 화면에는 토글 이전 값이 표시된다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFlag {
    /// 아직 확인되지 않음
    #[default]
    Unknown,

    Pending { previous: bool, target: bool },

    Confirmed(bool),

    Failed { shown: bool, reason: String },
}

impl StatusFlag {

    /// 화면에 표시할 값
    pub fn is_on(&self) -> bool {
        match self {
            StatusFlag::Unknown => false,
            StatusFlag::Pending { target, .. } => *target,
            StatusFlag::Confirmed(on) => *on,
            StatusFlag::Failed { shown, .. } => *shown,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, StatusFlag::Pending { .. })
    }

    /// 낙관적으로 값을 뒤집고 목표 값을 반환한다.
    pub fn begin_toggle(&mut self) -> bool {
        let previous = self.is_on();
        let target = !previous;
        *self = StatusFlag::Pending { previous, target };
        target
    }

    pub fn confirm(&mut self, on: bool) {
        *self = StatusFlag::Confirmed(on);
    }

    /// 진행 중인 토글을 실패 처리하고 이전 값으로 되돌린다.
    pub fn fail(&mut self, reason: String) {
        let shown = match *self {
            StatusFlag::Pending { previous, .. } => previous,
            ref other => other.is_on(),
        };
        *self = StatusFlag::Failed { shown, reason };
    }
}

/// 사용자별 도서 상태를 원격 저장소와 동기화한다.
///
/// 한 번의 호출은 정확히 하나의 엔트리(`users/{user}/{category}/{book}`)만 읽거나 변경하며,
/// 여러 카테고리를 묶는 트랜잭션은 없다.
pub struct StatusSync<S>
where
    S: RemoteStore
{
    store: S,
    formatter: DateFormatter,
    failures: Option<mpsc::SyncSender<SyncFailure>>,
}

impl <S: RemoteStore> StatusSync<S> {
    pub fn new(store: S) -> Self {
        Self::with_formatter(store, DateFormatter::default())
    }

    pub fn with_formatter(store: S, formatter: DateFormatter) -> Self {
        Self { store, formatter, failures: None }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 원격 연산 실패를 받을 채널을 연다. 이전에 연 채널은 더 이상 값을 받지 않는다.
    ///
    /// 채널은 [`FAILURE_QUEUE_DEPTH`]개까지만 쌓이며, 비우지 않으면 이후의 실패는 버려진다.
    pub fn failures(&mut self) -> mpsc::Receiver<SyncFailure> {
        let (tx, rx) = mpsc::sync_channel(FAILURE_QUEUE_DEPTH);
        self.failures = Some(tx);
        rx
    }

    /// 도서가 카테고리에 포함되어 있는지 한번 조회한다.
    pub fn check_status(&self, category: Category, session: &Session, book_id: &BookId) -> Result<bool, StatusError> {
        let path = entry_path(category, session, book_id)?;

        self.store.read_once(&path)
            .map(|value| value.is_some())
            .map_err(|e| self.report(category, book_id, SyncOperation::Check, e))
    }

    /// 카테고리 포함 여부를 뒤집는다. 성공 시 변경된 값을 반환한다.
    ///
    /// 켜는 경우 도서 스냅샷을 저장하고, 끄는 경우 엔트리를 삭제한다.
    pub fn toggle_status(&self, category: Category, session: &Session, book: &Book, currently_on: bool) -> Result<bool, StatusError> {
        let path = entry_path(category, session, book.id())?;
        let target = !currently_on;

        let (operation, result) = if target {
            let result = BookSnapshot::of(book, &self.formatter)
                .to_value()
                .and_then(|value| self.store.set_value(&path, &value));
            (SyncOperation::Add, result)
        } else {
            (SyncOperation::Remove, self.store.remove_value(&path))
        };

        result.map_err(|e| self.report(category, book.id(), operation, e))?;

        info!(category = %category, book_id = %book.id(), operation = %operation, "status changed");
        Ok(target)
    }

    fn report(&self, category: Category, book_id: &BookId, operation: SyncOperation, e: StoreError) -> StatusError {
        error!(category = %category, book_id = %book_id, operation = %operation, "{:?}", e);

        if let Some(tx) = &self.failures {
            let failure = SyncFailure {
                category,
                book_id: book_id.clone(),
                operation,
                error: e.clone(),
            };
            match tx.try_send(failure) {
                Ok(()) => {}
                Err(mpsc::TrySendError::Full(_)) => warn!(category = %category, book_id = %book_id, "failure queue full"),
                // 수신측이 사라진 경우 무시한다
                Err(mpsc::TrySendError::Disconnected(_)) => {}
            }
        }

        StatusError::Store(e)
    }
}

fn entry_path(category: Category, session: &Session, book_id: &BookId) -> Result<StorePath, StatusError> {
    let Some(user_id) = session.user_id() else {
        warn!(category = %category, book_id = %book_id, "user not authenticated");
        return Err(StatusError::Unauthenticated);
    };

    Ok(StorePath::status_entry(user_id, category, book_id)?)
}
