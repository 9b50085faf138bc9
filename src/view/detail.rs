use crate::date::DateFormatter;
use crate::item::{Book, Category, Genre};
use crate::session::Session;
use crate::status::{StatusError, StatusFlag, StatusSync};
use crate::store::RemoteStore;
use crate::view::color::{Color, ColorPickerSheet};
use crate::view::cover::{CoverPhase, ImageLoader};
use rayon::prelude::*;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::{mpsc, Arc};
use tracing::warn;

const NO_DESCRIPTION: &str = "No description available.";
const MAX_STARS: usize = 5;

/// 백그라운드 저장이 끝난 토글의 결과
pub type SettledToggle = (Category, Result<bool, StatusError>);

/// 카테고리 토글 버튼의 표시 상태
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct StatusControl {
    pub category: Category,
    pub icon: &'static str,
    pub tint: Color,
    pub on: bool,
}

impl StatusControl {
    pub fn new(category: Category, on: bool) -> Self {
        let icon = match (category, on) {
            (Category::Wishlist, true) => "bookmark.fill",
            (Category::Wishlist, false) => "bookmark",
            (Category::CurrentRead, _) => "eyeglasses",
            (Category::HaveRead, _) => "checkmark.circle",
        };
        let tint = if on { Color::BLUE } else { Color::GRAY };

        Self { category, icon, tint, on }
    }
}

/// 도서 상세 화면
///
/// 화면이 열릴 때([`BookDetail::on_appear`]) 세 카테고리의 상태를 동시에 조회하고,
/// 토글([`BookDetail::begin_toggle`])은 화면 값을 바로 바꾼 뒤 저장은 rayon 스레드 풀에서 진행한다.
/// 저장 결과는 [`BookDetail::poll`] 혹은 [`BookDetail::settle`]을 호출할 때 화면 값에 반영된다.
/// 배경색은 이 화면 인스턴스에만 유지되며 새로 열면 기본값(흰색)으로 돌아간다.
#[derive(Debug)]
pub struct BookDetail {
    book: Book,
    statuses: [StatusFlag; 3],
    background: Color,
    cover: CoverPhase,
    formatter: DateFormatter,
    settled_tx: mpsc::Sender<SettledToggle>,
    settled_rx: mpsc::Receiver<SettledToggle>,
}

impl BookDetail {
    pub fn new(book: Book) -> Self {
        Self::with_formatter(book, DateFormatter::default())
    }

    pub fn with_formatter(book: Book, formatter: DateFormatter) -> Self {
        let (settled_tx, settled_rx) = mpsc::channel();
        Self {
            book,
            statuses: Default::default(),
            background: Color::WHITE,
            cover: CoverPhase::Empty,
            formatter,
            settled_tx,
            settled_rx,
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn cover(&self) -> &CoverPhase {
        &self.cover
    }

    pub fn status(&self, category: Category) -> &StatusFlag {
        &self.statuses[slot(category)]
    }

    pub fn is_on(&self, category: Category) -> bool {
        self.status(category).is_on()
    }

    pub fn controls(&self) -> [StatusControl; 3] {
        Category::ALL.map(|c| StatusControl::new(c, self.is_on(c)))
    }

    /// 세 카테고리의 상태를 동시에 조회해 반영한다.
    ///
    /// 카테고리 간의 순서는 없으며 각 결과는 자기 카테고리에만 반영된다.
    /// 인증되지 않은 경우 상태는 [`StatusFlag::Unknown`]으로 남는다.
    pub fn on_appear<S: RemoteStore>(&mut self, sync: &StatusSync<S>, session: &Session) {
        let book_id = self.book.id();
        let results: Vec<(Category, Result<bool, StatusError>)> = Category::ALL
            .into_par_iter()
            .map(|category| (category, sync.check_status(category, session, book_id)))
            .collect();

        for (category, result) in results {
            let flag = &mut self.statuses[slot(category)];
            match result {
                Ok(on) => flag.confirm(on),
                Err(StatusError::Unauthenticated) => {}
                Err(e) => flag.fail(e.to_string()),
            }
        }
    }

    /// 카테고리 토글을 시작하고 화면에 표시될 값을 바로 반환한다.
    ///
    /// 화면 값은 즉시 [`StatusFlag::Pending`]으로 바뀌고 원격 저장은 rayon 스레드 풀에서 진행된다.
    /// 인증되지 않았거나 같은 카테고리의 토글이 진행 중이면 화면 값은 바뀌지 않는다.
    pub fn begin_toggle<S>(&mut self, category: Category, sync: &Arc<StatusSync<S>>, session: &Session) -> Result<bool, StatusError>
    where
        S: RemoteStore + 'static
    {
        if !session.is_authenticated() {
            warn!(category = %category, book_id = %self.book.id(), "user not authenticated");
            return Err(StatusError::Unauthenticated);
        }

        let flag = &mut self.statuses[slot(category)];
        if flag.is_pending() {
            return Err(StatusError::InFlight(category));
        }
        let previous = flag.is_on();
        let target = flag.begin_toggle();

        let sync = Arc::clone(sync);
        let session = session.clone();
        let book = self.book.clone();
        let tx = self.settled_tx.clone();
        rayon::spawn(move || {
            let result = sync.toggle_status(category, &session, &book, previous);
            // 화면이 먼저 닫힌 경우 결과는 버린다
            _ = tx.send((category, result));
        });

        Ok(target)
    }

    /// 지금까지 끝난 저장 결과를 기다리지 않고 반영한다.
    pub fn poll(&mut self) -> Vec<SettledToggle> {
        let settled: Vec<SettledToggle> = self.settled_rx.try_iter().collect();
        for (category, result) in &settled {
            self.resolve(*category, result);
        }
        settled
    }

    /// 진행 중인 토글이 모두 끝날 때까지 기다린다.
    pub fn settle(&mut self) -> Vec<SettledToggle> {
        let mut settled = Vec::new();
        while self.statuses.iter().any(StatusFlag::is_pending) {
            let Ok((category, result)) = self.settled_rx.recv() else {
                break;
            };
            self.resolve(category, &result);
            settled.push((category, result));
        }
        settled
    }

    /// 토글을 시작하고 저장이 끝날 때까지 기다린다.
    ///
    /// 저장이 실패하면 화면 값은 이전 값으로 되돌아간다.
    pub fn toggle<S>(&mut self, category: Category, sync: &Arc<StatusSync<S>>, session: &Session) -> Result<bool, StatusError>
    where
        S: RemoteStore + 'static
    {
        self.begin_toggle(category, sync, session)?;

        self.settle()
            .into_iter()
            .rev()
            .find(|(c, _)| *c == category)
            .map(|(_, result)| result)
            .unwrap_or_else(|| Ok(self.is_on(category)))
    }

    fn resolve(&mut self, category: Category, result: &Result<bool, StatusError>) {
        let flag = &mut self.statuses[slot(category)];
        match result {
            Ok(on) => flag.confirm(*on),
            Err(e) => flag.fail(e.to_string()),
        }
    }

    pub fn load_cover<L: ImageLoader>(&mut self, loader: &L) {
        self.cover = match self.book.cover_image_url() {
            Some(url) => loader.load(url),
            None => CoverPhase::Failure,
        };
    }

    /// 배경색 선택 시트를 연다. 시트에서 적용한 색은 바로 이 화면의 배경이 된다.
    pub fn present_color_picker(&mut self) -> ColorPickerSheet<impl FnOnce(Color) + '_> {
        let background = &mut self.background;
        ColorPickerSheet::new(move |color| *background = color)
    }

    pub fn release_date(&self) -> String {
        self.formatter.format(self.book.release_date())
    }
}

impl Display for BookDetail {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.cover {
            CoverPhase::Empty => writeln!(f, "[cover: loading]")?,
            CoverPhase::Success(bytes) => writeln!(f, "[cover: {} bytes]", bytes.len())?,
            CoverPhase::Failure => writeln!(f, "[cover: photo]")?,
        }

        let controls = self.controls()
            .map(|c| format!("[{} {}]", c.icon, if c.on { "on" } else { "off" }));
        writeln!(f, "{}", controls.join(" "))?;

        writeln!(f, "{}", self.book.title())?;
        writeln!(f, "Author: {}", self.book.author())?;
        let genres = self.book.genre_items();
        if !genres.is_empty() {
            let names: Vec<&str> = genres.iter().map(Genre::name).collect();
            writeln!(f, "Genre: {}", names.join(", "))?;
        }
        if let Some(rating) = self.book.average_rating() {
            writeln!(f, "Rating: {} ({:.1})", stars(rating), rating)?;
        }
        writeln!(f, "Release Date: {}", self.release_date())?;
        writeln!(f, "Description: {}", self.book.description().unwrap_or(NO_DESCRIPTION))?;
        write!(f, "Background: {}", self.background)
    }
}

fn slot(category: Category) -> usize {
    match category {
        Category::Wishlist => 0,
        Category::CurrentRead => 1,
        Category::HaveRead => 2,
    }
}

/// 0.5 단위로 반올림한 별점 문자열
fn stars(rating: f64) -> String {
    let halves = (rating.clamp(0.0, MAX_STARS as f64) * 2.0).round() as usize;
    let full = halves / 2;
    let half = halves % 2;

    let mut s = "★".repeat(full);
    if half == 1 {
        s.push('½');
    }
    s.push_str(&"☆".repeat(MAX_STARS - full - half));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::{StoreError, StorePath};
    use reqwest::Url;
    use serde_json::Value;
    use std::sync::Mutex;

    /// 쓰기 요청을 `open`으로 열어줄 때까지 붙잡아 두는 저장소
    struct GatedStore {
        inner: MemoryStore,
        gate: Mutex<mpsc::Receiver<()>>,
    }

    impl GatedStore {
        fn new() -> (Self, mpsc::Sender<()>) {
            let (open, gate) = mpsc::channel();
            (Self { inner: MemoryStore::new(), gate: Mutex::new(gate) }, open)
        }

        fn wait(&self) {
            _ = self.gate.lock().unwrap().recv();
        }
    }

    impl RemoteStore for GatedStore {
        fn read_once(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
            self.inner.read_once(path)
        }

        fn set_value(&self, path: &StorePath, value: &Value) -> Result<(), StoreError> {
            self.wait();
            self.inner.set_value(path, value)
        }

        fn remove_value(&self, path: &StorePath) -> Result<(), StoreError> {
            self.wait();
            self.inner.remove_value(path)
        }
    }

    fn book() -> Book {
        Book::builder()
            .id(42u64)
            .title("Dune".to_owned())
            .author("Frank Herbert".to_owned())
            .genres(vec!["Science Fiction".to_owned(), "Adventure".to_owned()])
            .average_rating(4.3)
            .release_date("1965-08-01T00:00:00Z".to_owned())
            .cover_image_url(Url::parse("https://covers.example.com/42.jpg").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn controls_reflect_flags() {
        let sync = Arc::new(StatusSync::new(MemoryStore::new()));
        let session = Session::authenticated("u1");
        let mut detail = BookDetail::new(book());

        detail.toggle(Category::Wishlist, &sync, &session).unwrap();

        let [wishlist, current, have] = detail.controls();
        assert_eq!(StatusControl { category: Category::Wishlist, icon: "bookmark.fill", tint: Color::BLUE, on: true }, wishlist);
        assert_eq!(StatusControl { category: Category::CurrentRead, icon: "eyeglasses", tint: Color::GRAY, on: false }, current);
        assert_eq!("checkmark.circle", have.icon);
        assert!(!have.on);
    }

    #[test]
    fn on_appear_resolves_each_category() {
        let sync = Arc::new(StatusSync::new(MemoryStore::new()));
        let session = Session::authenticated("u1");
        sync.toggle_status(Category::HaveRead, &session, &book(), false).unwrap();

        let mut detail = BookDetail::new(book());
        detail.on_appear(&sync, &session);

        assert_eq!(&StatusFlag::Confirmed(false), detail.status(Category::Wishlist));
        assert_eq!(&StatusFlag::Confirmed(false), detail.status(Category::CurrentRead));
        assert_eq!(&StatusFlag::Confirmed(true), detail.status(Category::HaveRead));
    }

    #[test]
    fn on_appear_without_session_leaves_flags_unknown() {
        let sync = Arc::new(StatusSync::new(MemoryStore::new()));
        let mut detail = BookDetail::new(book());

        detail.on_appear(&sync, &Session::anonymous());

        for category in Category::ALL {
            assert_eq!(&StatusFlag::Unknown, detail.status(category));
            assert!(!detail.is_on(category));
        }
        assert_eq!(0, sync.store().calls());
    }

    #[test]
    fn toggle_without_session_keeps_flag() {
        let sync = Arc::new(StatusSync::new(MemoryStore::new()));
        let mut detail = BookDetail::new(book());

        let result = detail.toggle(Category::Wishlist, &sync, &Session::anonymous());

        assert_eq!(Err(StatusError::Unauthenticated), result);
        assert_eq!(&StatusFlag::Unknown, detail.status(Category::Wishlist));
        assert_eq!(0, sync.store().calls());
    }

    #[test]
    fn failed_toggle_reconciles_to_previous_value() {
        let sync = Arc::new(StatusSync::new(MemoryStore::new()));
        let session = Session::authenticated("u1");
        let mut detail = BookDetail::new(book());
        detail.on_appear(&sync, &session);

        sync.store().set_offline(true);
        let result = detail.toggle(Category::CurrentRead, &sync, &session);

        assert!(matches!(result, Err(StatusError::Store(StoreError::RequestFailed(_)))));
        assert!(matches!(detail.status(Category::CurrentRead), StatusFlag::Failed { shown: false, .. }));
        assert!(!detail.is_on(Category::CurrentRead));
    }

    #[test]
    fn toggle_is_pending_until_the_write_settles() {
        let (store, open) = GatedStore::new();
        let sync = Arc::new(StatusSync::new(store));
        let session = Session::authenticated("u1");
        let mut detail = BookDetail::new(book());
        detail.on_appear(&sync, &session);

        assert_eq!(Ok(true), detail.begin_toggle(Category::Wishlist, &sync, &session));

        assert!(detail.status(Category::Wishlist).is_pending());
        assert!(detail.is_on(Category::Wishlist));
        assert!(detail.poll().is_empty());
        assert_eq!(Err(StatusError::InFlight(Category::Wishlist)), detail.begin_toggle(Category::Wishlist, &sync, &session));

        open.send(()).unwrap();
        assert_eq!(vec![(Category::Wishlist, Ok(true))], detail.settle());
        assert_eq!(&StatusFlag::Confirmed(true), detail.status(Category::Wishlist));
        assert_eq!(Ok(true), sync.check_status(Category::Wishlist, &session, detail.book().id()));
    }

    #[test]
    fn pending_toggles_of_different_categories_settle_independently() {
        let (store, open) = GatedStore::new();
        let sync = Arc::new(StatusSync::new(store));
        let session = Session::authenticated("u1");
        let mut detail = BookDetail::new(book());
        detail.on_appear(&sync, &session);

        detail.begin_toggle(Category::CurrentRead, &sync, &session).unwrap();
        detail.begin_toggle(Category::HaveRead, &sync, &session).unwrap();
        assert!(detail.status(Category::CurrentRead).is_pending());
        assert!(detail.status(Category::HaveRead).is_pending());
        assert_eq!(&StatusFlag::Confirmed(false), detail.status(Category::Wishlist));

        open.send(()).unwrap();
        open.send(()).unwrap();
        let mut settled: Vec<Category> = detail.settle().into_iter().map(|(c, _)| c).collect();
        settled.sort_by_key(|c| c.to_code_str());

        assert_eq!(vec![Category::CurrentRead, Category::HaveRead], settled);
        assert!(detail.is_on(Category::CurrentRead));
        assert!(detail.is_on(Category::HaveRead));
        assert!(!detail.is_on(Category::Wishlist));
    }

    #[test]
    fn have_read_control_toggles_only_have_read() {
        let sync = Arc::new(StatusSync::new(MemoryStore::new()));
        let session = Session::authenticated("u1");
        let mut detail = BookDetail::new(book());
        detail.on_appear(&sync, &session);

        assert_eq!(Ok(true), detail.toggle(Category::HaveRead, &sync, &session));

        assert!(detail.is_on(Category::HaveRead));
        assert!(!detail.is_on(Category::CurrentRead));
        assert_eq!(Ok(false), sync.check_status(Category::CurrentRead, &session, detail.book().id()));
        assert_eq!(Ok(true), sync.check_status(Category::HaveRead, &session, detail.book().id()));
    }

    #[test]
    fn color_picker_updates_background_immediately() {
        let mut detail = BookDetail::new(book());
        assert_eq!(Color::WHITE, detail.background());

        let mut sheet = detail.present_color_picker();
        sheet.select(Color::rgb(10, 20, 30));
        sheet.apply();

        assert_eq!(Color::rgb(10, 20, 30), detail.background());
        assert_eq!(Color::WHITE, BookDetail::new(book()).background());
    }

    #[test]
    fn load_cover_uses_loader_result() {
        let mut detail = BookDetail::new(book());
        assert_eq!(&CoverPhase::Empty, detail.cover());

        detail.load_cover(&|_: &Url| CoverPhase::Success(vec![1, 2, 3]));
        assert_eq!(&CoverPhase::Success(vec![1, 2, 3]), detail.cover());

        let no_cover = Book::builder()
            .id(1u64)
            .title("t".to_owned())
            .author("a".to_owned())
            .build()
            .unwrap();
        let mut detail = BookDetail::new(no_cover);
        detail.load_cover(&|_: &Url| CoverPhase::Success(vec![]));
        assert_eq!(&CoverPhase::Failure, detail.cover());
    }

    #[test]
    fn render_lists_metadata() {
        let detail = BookDetail::new(book());

        let text = detail.to_string();
        assert_eq!(vec![
            "[cover: loading]",
            "[bookmark off] [eyeglasses off] [checkmark.circle off]",
            "Dune",
            "Author: Frank Herbert",
            "Genre: Science Fiction, Adventure",
            "Rating: ★★★★½ (4.3)",
            "Release Date: Aug 1, 1965",
            "Description: No description available.",
            "Background: #FFFFFF",
        ], text.lines().collect::<Vec<_>>());
    }

    #[test]
    fn stars_round_to_half() {
        assert_eq!("☆☆☆☆☆", stars(0.0));
        assert_eq!("★★★½☆", stars(3.6));
        assert_eq!("★★★★★", stars(7.0));
        assert_eq!("★★★★☆", stars(4.2));
    }
}
