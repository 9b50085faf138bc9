use book_look_rust::config as app_config;
use book_look_rust::item::{Category, ItemError};
use book_look_rust::session::Session;
use book_look_rust::status::StatusSync;
use book_look_rust::store::rest::{RestStore, DEFAULT_TIMEOUT_SECONDS};
use book_look_rust::view::color::COLOR_PICKER_TITLE;
use book_look_rust::view::{BookDetail, Color, HttpImageLoader, RootScreen};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "book-look", version, about = "도서 상태(읽고 싶은 책, 읽는 중, 읽은 책) 관리")]
struct Cli {
    /// 인증된 사용자 아이디. 지정하지 않으면 비로그인 상태로 동작한다.
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 세 카테고리의 상태를 조회한다.
    Status {
        /// 도서 JSON 파일
        book: PathBuf,
    },

    /// 카테고리 하나를 토글한다.
    Toggle {
        book: PathBuf,

        /// wishlist, currentread, haveread
        #[arg(value_parser = parse_category)]
        category: Category,
    },

    /// 도서 상세 화면을 출력한다.
    Show {
        book: PathBuf,

        /// 배경색 (#RRGGBB)
        #[arg(long)]
        background: Option<String>,

        /// 표지 이미지를 내려받는다.
        #[arg(long)]
        cover: bool,
    },

    /// 첫 화면을 출력한다.
    Root,
}

fn parse_category(s: &str) -> Result<Category, ItemError> {
    Category::try_from(s)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    app_config::load_dotenv();

    let config = match app_config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Cannot loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = match config.logger().map(app_config::log::set_global_logging_config) {
        Some(Ok(guard)) => Some(guard),
        Some(Err(e)) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
        None => {
            app_config::log::set_fallback_logging_config();
            None
        }
    };

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: &app_config::AppConfig) -> Result<(), Box<dyn Error>> {
    let session = Session::from(cli.user);
    let formatter = config.date_formatter()?;

    let store = RestStore::from_config(config.store())?;
    let mut sync = StatusSync::with_formatter(store, formatter.clone());
    let failures = sync.failures();
    let sync = Arc::new(sync);

    match cli.command {
        Command::Root => {
            let screen = RootScreen::for_session(&session);
            println!("{:?} (background {})", screen, screen.background());
        }
        Command::Status { book } => {
            let book = book_look_rust::read_book_file(book)?;
            let mut detail = BookDetail::with_formatter(book, formatter);
            detail.on_appear(&sync, &session);

            for control in detail.controls() {
                println!("{}: {:?}", control.category.to_code_str(), detail.status(control.category));
            }
        }
        Command::Toggle { book, category } => {
            let book = book_look_rust::read_book_file(book)?;
            let mut detail = BookDetail::with_formatter(book, formatter);
            detail.on_appear(&sync, &session);

            let on = detail.toggle(category, &sync, &session)?;
            info!(category = %category, on, "toggled");
            println!("{}: {}", category.to_code_str(), if on { "on" } else { "off" });
        }
        Command::Show { book, background, cover } => {
            let book = book_look_rust::read_book_file(book)?;
            let mut detail = BookDetail::with_formatter(book, formatter);
            detail.on_appear(&sync, &session);

            if let Some(background) = background {
                let mut sheet = detail.present_color_picker();
                sheet.select(Color::from_hex(&background)?);
                println!("{}: {}", COLOR_PICKER_TITLE, sheet.selected());
                sheet.apply();
            }
            if cover {
                let timeout = config.store().timeout_seconds().unwrap_or(DEFAULT_TIMEOUT_SECONDS);
                let loader = HttpImageLoader::new(Duration::from_secs(timeout))?;
                detail.load_cover(&loader);
            }

            println!("{}", detail);
        }
    }

    for failure in failures.try_iter() {
        eprintln!("sync failed: {} {} {}: {}", failure.operation, failure.category, failure.book_id, failure.error);
    }

    Ok(())
}
