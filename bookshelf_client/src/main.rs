use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use bookshelf_client::api::Book;
use bookshelf_client::app_config::ClientConfig;
use bookshelf_client::client::BookServiceClient;
use bookshelf_client::notifications::{Notification, NotificationKind, Notifier};
use bookshelf_client::store::BookStore;
use bookshelf_client::sync::BookSync;
use bookshelf_client::validation::{BookForm, ValidationErrors};

/// Command line client for the books api
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base url of the books api, overrides BOOKSHELF_API_BASE_URL
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all books
    List,
    /// Show details of a single book
    Show { id: String },
    /// Add a new book, year defaults to the current one
    Add(BookFields),
    /// Change fields of an existing book, fields that are not given stay as they are
    Edit {
        id: String,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Delete a book
    Delete {
        id: String,
        /// Confirm the deletion, the book cannot be restored
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct BookFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    year: Option<i32>,
    /// Pass an empty value to clear it
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    isbn: Option<String>,
    #[arg(long)]
    genre: Option<String>,
}

impl BookFields {
    fn apply_to(self, form: &mut BookForm) {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(author) = self.author {
            form.author = author;
        }
        if let Some(year) = self.year {
            form.year = year;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(isbn) = self.isbn {
            form.isbn = isbn;
        }
        if let Some(genre) = self.genre {
            form.genre = genre;
        }
    }
}

struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => {
                println!("{}: {}", notification.title, notification.description)
            }
            NotificationKind::Error => {
                eprintln!("{}: {}", notification.title, notification.description)
            }
        }
    }
}

fn init_telemetry() {
    let app_name = "bookshelf";

    // Filter based on level - trace, debug, info, warn, error
    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("warn"));
    // Logs go to stderr, stdout is reserved for command output
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stderr);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install `tracing` subscriber.")
}

fn print_book(book: &Book) {
    println!("id:          {}", book.id);
    println!("title:       {}", book.title);
    println!("author:      {}", book.author);
    println!("year:        {}", book.year);
    for (label, value) in [
        ("description", &book.description),
        ("isbn", &book.isbn),
        ("genre", &book.genre),
        ("created at", &book.created_at),
        ("updated at", &book.updated_at),
    ] {
        if let Some(value) = value {
            println!("{:<12} {}", format!("{}:", label), value);
        }
    }
}

fn print_validation_errors(errors: &ValidationErrors) {
    for error in errors.0.iter() {
        eprintln!("{}: {}", error.field, error.message);
    }
}

async fn run(command: Command, sync: &BookSync) -> ExitCode {
    match command {
        Command::List => {
            sync.fetch_books().await;
            if sync.error().is_some() {
                return ExitCode::FAILURE;
            }
            for book in sync.books() {
                println!("{}\t{}\t{}\t{}", book.id, book.title, book.author, book.year);
            }
        }
        Command::Show { id } => match sync.fetch_book(&id).await {
            Ok(book) => print_book(&book),
            Err(_) => return ExitCode::FAILURE,
        },
        Command::Add(fields) => {
            let mut form = BookForm::default();
            fields.apply_to(&mut form);
            let request = match form.validate() {
                Ok(request) => request,
                Err(errors) => {
                    print_validation_errors(&errors);
                    return ExitCode::FAILURE;
                }
            };
            match sync.create_book(request).await {
                Ok(book) => println!("{}", book.id),
                Err(_) => return ExitCode::FAILURE,
            }
        }
        Command::Edit { id, fields } => {
            let Ok(book) = sync.fetch_book(&id).await else {
                return ExitCode::FAILURE;
            };
            let mut form = BookForm::from(&book);
            fields.apply_to(&mut form);
            let request = match form.validate_update(book.id) {
                Ok(request) => request,
                Err(errors) => {
                    print_validation_errors(&errors);
                    return ExitCode::FAILURE;
                }
            };
            if sync.update_book(request).await.is_err() {
                return ExitCode::FAILURE;
            }
        }
        Command::Delete { id, yes } => {
            if !yes {
                eprintln!(
                    "Deleting book {} cannot be undone, pass --yes to confirm",
                    id
                );
                return ExitCode::FAILURE;
            }
            if sync.delete_book(&id).await.is_err() {
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_telemetry();
    let cli = Cli::parse();

    let config = ClientConfig::load().context("Failed to load configuration")?;
    let api_url = cli.api_url.unwrap_or(config.api_base_url);
    tracing::info!("Using books api at {}", api_url);

    let client = BookServiceClient::new(&api_url)?;
    let sync = BookSync::new(
        Arc::new(BookStore::new()),
        Arc::new(client),
        Arc::new(TerminalNotifier),
    );

    Ok(run(cli.command, &sync).await)
}
