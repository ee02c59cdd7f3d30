// Bookworm - Personal Library Tracker
// Copyright (C) 2025 Bookworm contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use bookworm_core::config::{default_data_dir, LibraryConfig, RecoveryPolicy, StorageBackend};
use bookworm_core::library::{snap_rating, Book, BookUpdate, Library, NewBook, ReadingProgress};
use bookworm_core::logging::{init_logging, LoggingConfig};
use bookworm_core::settings::{SettingsStore, SettingsUpdate};
use bookworm_core::storage::StoreBackend;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bookworm-cli")]
#[command(about = "Bookworm CLI - Desktop testing tool", long_about = None)]
struct Cli {
    /// Directory holding the library
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Store blobs in bookworm.db instead of one file per key
    #[arg(long, global = true)]
    sqlite: bool,

    /// What to do when the saved collection cannot be read
    #[arg(long, global = true, value_enum, default_value_t = RecoveryArg::StartEmpty)]
    recovery: RecoveryArg,

    /// Log level for bookworm_core
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RecoveryArg {
    Abort,
    StartEmpty,
    Reset,
}

impl From<RecoveryArg> for RecoveryPolicy {
    fn from(arg: RecoveryArg) -> Self {
        match arg {
            RecoveryArg::Abort => RecoveryPolicy::Abort,
            RecoveryArg::StartEmpty => RecoveryPolicy::StartEmpty,
            RecoveryArg::Reset => RecoveryPolicy::Reset,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List every book
    List,
    /// Highest rated books
    Top {
        #[arg(short, long)]
        count: Option<usize>,
    },
    /// Show one book with its reading progress
    Show { id: u32 },
    /// Other books by the same author
    ByAuthor { id: u32 },
    /// Add a book
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        image_url: String,
        #[arg(long, default_value_t = 0.0)]
        rating: f32,
        #[arg(long, default_value_t = 0)]
        total_pages: u32,
        #[arg(long, default_value_t = 0)]
        pages_read: u32,
        #[arg(long, default_value = "")]
        genre: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Edit a book; only the given fields change
    Edit(EditArgs),
    /// Show or change display settings
    Settings {
        #[arg(long)]
        dark: Option<bool>,
        #[arg(long)]
        notifications: Option<bool>,
    },
}

#[derive(Args)]
struct EditArgs {
    id: u32,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
    #[arg(long)]
    rating: Option<f32>,
    #[arg(long)]
    review: Option<String>,
    #[arg(long)]
    total_pages: Option<u32>,
    #[arg(long)]
    pages_read: Option<u32>,
    #[arg(long)]
    genre: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    author_bio: Option<String>,
    #[arg(long)]
    user_review: Option<String>,
}

impl EditArgs {
    fn into_update(self) -> BookUpdate {
        BookUpdate {
            title: self.title,
            author: self.author,
            image_url: self.image_url,
            user_rating: self.rating.map(snap_rating),
            review: self.review,
            total_pages: self.total_pages,
            pages_read: self.pages_read,
            genre: self.genre,
            description: self.description,
            author_bio: self.author_bio,
            user_review: self.user_review,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LoggingConfig::default().with_level(cli.log_level.clone()))
        .context("failed to initialize logging")?;

    let config = LibraryConfig::builder()
        .data_dir(cli.data_dir.clone().unwrap_or_else(default_data_dir))
        .backend(if cli.sqlite {
            StorageBackend::Sqlite
        } else {
            StorageBackend::File
        })
        .recovery(cli.recovery.into())
        .build()?;

    let (mut library, report) = Library::from_config(&config)
        .await
        .with_context(|| format!("failed to open library in {}", config.data_dir.display()))?;

    if let Some(reason) = &report.corrupt_reason {
        eprintln!("Saved collection could not be read: {}", reason);
        if let Some(backup) = &report.backup_key {
            eprintln!("Backed up to {}, restored sample books", backup);
        }
    }

    match cli.command {
        Commands::List => {
            let books = library.books().to_vec();
            print_books(&books, cli.json)?;
        }
        Commands::Top { count } => {
            let books: Vec<Book> = match count {
                Some(n) => library.top_rated_n(n),
                None => library.top_rated(),
            }
            .into_iter()
            .cloned()
            .collect();
            print_books(&books, cli.json)?;
        }
        Commands::Show { id } => {
            let details = library.details(id)?;
            if cli.json {
                print_json(&details)?;
            } else {
                print_book_detail(&details.book, &details.progress);
                if !details.more_by_author.is_empty() {
                    println!("\nMore by {}:", details.book.author);
                    for book in &details.more_by_author {
                        println!("  [{}] {}", book.id, book.title);
                    }
                }
            }
        }
        Commands::ByAuthor { id } => {
            let books: Vec<Book> = library.books_by_author(id)?.into_iter().cloned().collect();
            print_books(&books, cli.json)?;
        }
        Commands::Add {
            title,
            author,
            image_url,
            rating,
            total_pages,
            pages_read,
            genre,
            description,
        } => {
            let draft = NewBook::new(title, author, image_url)
                .with_rating(snap_rating(rating))
                .with_pages(total_pages, pages_read)
                .with_genre(genre)
                .with_description(description);

            let book = library.add_book(draft).await?;
            if cli.json {
                print_json(&book)?;
            } else {
                println!("Added [{}] {}", book.id, book.title);
            }
        }
        Commands::Edit(args) => {
            let id = args.id;
            let update = args.into_update();
            if update.is_empty() {
                anyhow::bail!("nothing to change; pass at least one field");
            }

            let book = library.update_book(id, update).await?;
            if cli.json {
                print_json(&book)?;
            } else {
                println!("Updated [{}] {}", book.id, book.title);
            }
        }
        Commands::Settings { dark, notifications } => {
            let store = settings_store(&library, &config)?;
            let settings = if dark.is_some() || notifications.is_some() {
                store
                    .update(SettingsUpdate {
                        dark_theme: dark,
                        notifications,
                    })
                    .await?
            } else {
                store.load().await?
            };

            if cli.json {
                print_json(&settings)?;
            } else {
                println!("Theme:         {:?}", settings.color_scheme());
                println!("Notifications: {}", if settings.notifications { "on" } else { "off" });
            }
        }
    }

    Ok(())
}

fn settings_store(library: &Library<StoreBackend>, config: &LibraryConfig) -> Result<SettingsStore<StoreBackend>> {
    Ok(SettingsStore::with_key(
        library.store().backend().clone(),
        config.settings_key.clone(),
    )?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_books(books: &[Book], json: bool) -> Result<()> {
    if json {
        return print_json(&books);
    }
    if books.is_empty() {
        println!("No books.");
    }
    for book in books {
        println!(
            "[{:>2}] {:<45} {:<22} {:.1}  {}",
            book.id,
            book.title,
            book.author,
            book.user_rating,
            book.date_added.format("%Y-%m-%d")
        );
    }
    Ok(())
}

fn print_book_detail(book: &Book, progress: &ReadingProgress) {
    println!("{} by {}", book.title, book.author);
    println!("Rating:   {:.1}", book.user_rating);
    println!("Added:    {}", book.date_added.format("%Y-%m-%d"));
    if !book.genre.is_empty() {
        println!("Genre:    {}", book.genre);
    }
    println!("Progress: {} ({}%)", progress.label(), progress.percent());
    if !book.description.is_empty() {
        println!("\n{}", book.description);
    }
    if !book.user_review.is_empty() {
        println!("\nYour review: {}", book.user_review);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(args: &[&str]) -> (u32, BookUpdate) {
        let mut argv = vec!["bookworm-cli", "edit"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Edit(args) => (args.id, args.into_update()),
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_edit_reaches_every_editable_field() {
        let (id, update) = edit(&[
            "3",
            "--review",
            "Short take",
            "--description",
            "A desert planet",
            "--author-bio",
            "American author",
            "--rating",
            "9",
        ]);

        assert_eq!(id, 3);
        assert_eq!(update.review.as_deref(), Some("Short take"));
        assert_eq!(update.description.as_deref(), Some("A desert planet"));
        assert_eq!(update.author_bio.as_deref(), Some("American author"));
        assert_eq!(update.user_rating, Some(5.0));
        assert!(update.title.is_none());
    }

    #[test]
    fn test_edit_without_fields_is_empty() {
        let (_, update) = edit(&["3"]);
        assert!(update.is_empty());
    }
}
