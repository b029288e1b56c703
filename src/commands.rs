use std::io::Write;

use anyhow::Context as _;

use crate::catalog::load_book;
use crate::cli::{
    BookIdArgs, BookmarkCommand, ChapterArgs, ClearArgs, Command, FavoriteCommand, NavCommand,
    PositionArgs, PurchaseCommand, ShowArgs, StatsCommand, StatsRecordArgs,
};
use crate::model::{BookId, Position};
use crate::progress::{chapter_progress_percent, overall_progress_percent, validate_position};
use crate::service::ReadingService;
use crate::session::ReadingSession;
use crate::store::KvStore;

pub fn run<S: KvStore>(
    service: &mut ReadingService<S>,
    command: Command,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        Command::Show(args) => show(service, args, out).context("show"),
        Command::Nav { command } => nav(service, command, out).context("nav"),
        Command::Bookmark { command } => bookmark(service, command, out).context("bookmark"),
        Command::Favorite { command } => favorite(service, command, out).context("favorite"),
        Command::Purchase { command } => purchase(service, command, out).context("purchase"),
        Command::Stats { command } => stats(service, command, out).context("stats"),
        Command::Clear(args) => clear(service, args, out).context("clear"),
    }
}

fn show<S: KvStore>(
    service: &mut ReadingService<S>,
    args: ShowArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let book = load_book(&args.book)?;
    let progress = service.get_progress(&book.id);

    if book.author.is_empty() {
        writeln!(out, "{}", book.title)?;
    } else {
        writeln!(out, "{} by {}", book.title, book.author)?;
    }
    for (idx, chapter) in book.chapters.iter().enumerate() {
        let percent = chapter_progress_percent(idx, &book.chapters, &progress);
        writeln!(
            out,
            "  [{idx}] {} {percent:.1}% (page {} of {})",
            chapter.title,
            progress.page_for(idx).saturating_add(1),
            chapter.page_count()
        )?;
    }
    writeln!(
        out,
        "overall {:.1}%",
        overall_progress_percent(&book.chapters, &progress)
    )?;

    let bookmarks = service.get_bookmarks(&book.id);
    let keys: Vec<String> = bookmarks.iter().map(|k| k.to_string()).collect();
    writeln!(out, "bookmarks: {}", keys.join(", "))?;
    writeln!(
        out,
        "favorite: {} purchased: {}",
        yes_no(service.is_favorite(&book.id)),
        yes_no(service.is_purchased(&book.id))
    )?;
    Ok(())
}

fn nav<S: KvStore>(
    service: &mut ReadingService<S>,
    command: NavCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        NavCommand::Next(args) => step(service, args, Direction::Next, out),
        NavCommand::Prev(args) => step(service, args, Direction::Previous, out),
        NavCommand::Chapter(ChapterArgs { book, index }) => {
            let book = load_book(&book)?;
            let mut session = ReadingSession::open(&book, service)?;
            session.jump_to_chapter(index)?;
            print_position(&session, None, out)
        }
    }
}

enum Direction {
    Next,
    Previous,
}

fn step<S: KvStore>(
    service: &mut ReadingService<S>,
    args: PositionArgs,
    direction: Direction,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let book = load_book(&args.book)?;
    let mut session =
        ReadingSession::open_at(&book, service, Position::new(args.chapter, args.page))?;

    let boundary = match direction {
        Direction::Next => (!session.next()).then_some("end of book"),
        Direction::Previous => (!session.previous()).then_some("start of book"),
    };
    print_position(&session, boundary, out)
}

fn print_position<S: KvStore>(
    session: &ReadingSession<'_, S>,
    boundary: Option<&str>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let position = session.position();
    match boundary {
        Some(boundary) => writeln!(out, "{position} ({boundary})")?,
        None => writeln!(out, "{position}")?,
    }
    if let Some(text) = session.current_page() {
        writeln!(out, "{text}")?;
    }
    Ok(())
}

fn bookmark<S: KvStore>(
    service: &mut ReadingService<S>,
    command: BookmarkCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        BookmarkCommand::Toggle(args) => {
            let book = load_book(&args.book)?;
            validate_position(&book.chapters, args.chapter, args.page)?;
            let bookmarks = service.toggle_bookmark(&book.id, args.chapter, args.page);
            let state = if service.is_bookmarked(&book.id, args.chapter, args.page) {
                "added"
            } else {
                "removed"
            };
            writeln!(
                out,
                "bookmark {}-{} {state} ({} total)",
                args.chapter,
                args.page,
                bookmarks.len()
            )?;
        }
        BookmarkCommand::List(BookIdArgs { book_id }) => {
            for key in service.get_bookmarks(&BookId::from(book_id)).iter() {
                writeln!(out, "{key}")?;
            }
        }
    }
    Ok(())
}

fn favorite<S: KvStore>(
    service: &mut ReadingService<S>,
    command: FavoriteCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        FavoriteCommand::Toggle(BookIdArgs { book_id }) => {
            let book_id = BookId::from(book_id);
            if service.toggle_favorite(&book_id) {
                writeln!(out, "{book_id} added to favorites")?;
            } else {
                writeln!(out, "{book_id} removed from favorites")?;
            }
        }
        FavoriteCommand::List => {
            for book_id in service.get_favorites() {
                writeln!(out, "{book_id}")?;
            }
        }
    }
    Ok(())
}

fn purchase<S: KvStore>(
    service: &mut ReadingService<S>,
    command: PurchaseCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match command {
        PurchaseCommand::Add(BookIdArgs { book_id }) => {
            let book_id = BookId::from(book_id);
            if !service.mark_purchased(&book_id) {
                anyhow::bail!("could not persist purchase of {book_id}");
            }
            writeln!(out, "{book_id} purchased")?;
        }
        PurchaseCommand::List => {
            for book_id in service.get_purchases().into_keys() {
                writeln!(out, "{book_id}")?;
            }
        }
    }
    Ok(())
}

fn stats<S: KvStore>(
    service: &mut ReadingService<S>,
    command: StatsCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let stats = match command {
        StatsCommand::Record(StatsRecordArgs {
            book_id,
            words,
            pages,
            seconds,
        }) => service.record_session(&BookId::from(book_id), words, pages, seconds),
        StatsCommand::Show(BookIdArgs { book_id }) => service.get_stats(&BookId::from(book_id)),
    };
    serde_json::to_writer_pretty(&mut *out, &stats).context("serialize stats")?;
    writeln!(out)?;
    Ok(())
}

fn clear<S: KvStore>(
    service: &mut ReadingService<S>,
    args: ClearArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match (args.book_id, args.all) {
        (Some(book_id), _) => {
            let book_id = BookId::from(book_id);
            service.clear_book_data(&book_id);
            writeln!(out, "cleared reading data for {book_id}")?;
        }
        (None, true) => {
            if !service.reset() {
                anyhow::bail!("could not reset store");
            }
            writeln!(out, "cleared all reading data")?;
        }
        (None, false) => anyhow::bail!("pass --book-id or --all"),
    }
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::store::MemoryStore;

    fn write_book(dir: &std::path::Path) -> anyhow::Result<PathBuf> {
        let path = dir.join("book.json");
        std::fs::write(
            &path,
            r#"{"id": 42, "title": "Dune", "author": "Herbert", "chapters": [
                {"title": "One", "pages": ["p0", "p1"]},
                {"title": "Two", "pages": ["q0"]}
            ]}"#,
        )?;
        Ok(path)
    }

    fn run_to_string(
        service: &mut ReadingService<MemoryStore>,
        command: Command,
    ) -> anyhow::Result<String> {
        let mut out = Vec::new();
        run(service, command, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn nav_next_prints_and_records_new_position() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let book = write_book(temp.path())?;
        let mut service = ReadingService::new(MemoryStore::new());

        let output = run_to_string(
            &mut service,
            Command::Nav {
                command: NavCommand::Next(PositionArgs {
                    book: book.clone(),
                    chapter: 0,
                    page: 1,
                }),
            },
        )?;
        assert_eq!(output, "chapter 1 page 0\nq0\n");
        assert_eq!(service.get_progress(&BookId::from(42)).get(1), Some(0));

        let output = run_to_string(
            &mut service,
            Command::Nav {
                command: NavCommand::Next(PositionArgs {
                    book,
                    chapter: 1,
                    page: 0,
                }),
            },
        )?;
        assert_eq!(output, "chapter 1 page 0 (end of book)\nq0\n");
        Ok(())
    }

    #[test]
    fn show_reports_progress_and_flags() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let book = write_book(temp.path())?;
        let mut service = ReadingService::new(MemoryStore::new());
        let book_id = BookId::from(42);
        service.set_page(&book_id, 0, 1);
        service.toggle_bookmark(&book_id, 0, 1);
        service.toggle_favorite(&book_id);

        let output = run_to_string(&mut service, Command::Show(ShowArgs { book }))?;
        assert_eq!(
            output,
            "Dune by Herbert\n\
             \x20 [0] One 50.0% (page 2 of 2)\n\
             \x20 [1] Two 0.0% (page 1 of 1)\n\
             overall 100.0%\n\
             bookmarks: 0-1\n\
             favorite: yes purchased: no\n"
        );
        Ok(())
    }

    #[test]
    fn bookmark_toggle_rejects_positions_outside_book() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let book = write_book(temp.path())?;
        let mut service = ReadingService::new(MemoryStore::new());

        let err = run_to_string(
            &mut service,
            Command::Bookmark {
                command: BookmarkCommand::Toggle(PositionArgs {
                    book,
                    chapter: 1,
                    page: 3,
                }),
            },
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("page index 3 out of range"));
        assert!(service.get_bookmarks(&BookId::from(42)).is_empty());
        Ok(())
    }

    #[test]
    fn clear_requires_a_target() {
        let mut service = ReadingService::new(MemoryStore::new());
        let err = run_to_string(
            &mut service,
            Command::Clear(ClearArgs {
                book_id: None,
                all: false,
            }),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("--book-id or --all"));
    }
}
