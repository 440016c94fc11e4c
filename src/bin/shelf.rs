//! ShelfKV CLI
//!
//! Runs one library command against a data directory and exits.

use clap::{Parser, Subcommand};
use shelfkv::ledger::EntryFilter;
use shelfkv::{Cents, Config, Ledger, Library, RecordId};
use tracing_subscriber::{fmt, EnvFilter};

/// ShelfKV lending library
#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(about = "Small lending library stored in flat CSV files")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./shelf_data")]
    data_dir: String,

    /// Skip fsync before replacing data files
    #[arg(long)]
    no_sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Library(LibraryCommands),

    /// Income and expense ledger
    Ledger {
        #[command(subcommand)]
        action: LedgerCommands,
    },
}

#[derive(Subcommand, Debug)]
enum LibraryCommands {
    /// Add a book
    Add {
        /// Book title
        title: String,

        /// Book author
        author: String,

        /// Number of copies
        total: u32,
    },

    /// Delete a book with no open borrows
    Delete {
        /// Book id
        id: u64,
    },

    /// List all books
    List,

    /// Find a book by id, or by title substring
    Search {
        /// Id or title keyword
        query: String,
    },

    /// Lend a book
    Borrow {
        /// Borrower id
        borrower: u64,

        /// Book id
        book: u64,
    },

    /// Return a book
    Return {
        /// Borrower id
        borrower: u64,

        /// Book id
        book: u64,
    },

    /// List the borrow history
    Records,
}

#[derive(Subcommand, Debug)]
enum LedgerCommands {
    /// Record an amount (negative for expenses)
    Add {
        /// Date as YYYY-MM-DD
        date: String,

        /// Category
        category: String,

        /// Amount, up to two decimals
        #[arg(allow_hyphen_values = true)]
        amount: Cents,

        /// Free-text note
        #[arg(default_value = "")]
        note: String,
    },

    /// Overwrite an entry
    Update {
        /// Entry id
        id: u64,

        /// Date as YYYY-MM-DD
        date: String,

        /// Category
        category: String,

        /// Amount, up to two decimals
        #[arg(allow_hyphen_values = true)]
        amount: Cents,

        /// Free-text note
        #[arg(default_value = "")]
        note: String,
    },

    /// Delete an entry
    Delete {
        /// Entry id
        id: u64,
    },

    /// List entries with a summary, optionally filtered
    List {
        /// Earliest date, inclusive
        #[arg(long)]
        from: Option<String>,

        /// Latest date, inclusive
        #[arg(long)]
        to: Option<String>,

        /// Category (case-insensitive)
        #[arg(long)]
        category: Option<String>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shelfkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::debug!("ShelfKV v{}", shelfkv::VERSION);
    tracing::debug!("Data directory: {}", args.data_dir);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .sync_on_save(!args.no_sync)
        .build();

    let result = match args.command {
        Commands::Ledger { action } => {
            Ledger::open(config).and_then(|(mut ledger, _)| run_ledger(&mut ledger, action))
        }
        Commands::Library(command) => {
            Library::open(config).and_then(|(mut library, _)| run(&mut library, command))
        }
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(library: &mut Library, command: LibraryCommands) -> shelfkv::Result<()> {
    match command {
        LibraryCommands::Add { title, author, total } => {
            let id = library.add_book(&title, &author, total)?;
            println!("added: id={}", id);
        }
        LibraryCommands::Delete { id } => {
            library.delete_book(RecordId(id))?;
            println!("deleted: id={}", id);
        }
        LibraryCommands::List => {
            println!("ID\tavail/total\tauthor\ttitle");
            for book in library.books() {
                println!("{}\t{}/{}\t{}\t{}", book.id, book.available, book.total, book.author, book.title);
            }
        }
        LibraryCommands::Search { query } => match query.trim().parse::<u64>() {
            Ok(id) if id > 0 => match library.find_book(RecordId(id)) {
                Some(book) => println!(
                    "found: id={} title={} author={} available={} total={}",
                    book.id, book.title, book.author, book.available, book.total
                ),
                None => println!("no book with id={}", id),
            },
            _ => {
                for book in library.search_title(&query) {
                    println!(
                        "id={} title={} author={} available={} total={}",
                        book.id, book.title, book.author, book.available, book.total
                    );
                }
            }
        },
        LibraryCommands::Borrow { borrower, book } => {
            library.borrow_book(RecordId(borrower), RecordId(book))?;
            println!("borrowed: borrower {} took book {}", borrower, book);
        }
        LibraryCommands::Return { borrower, book } => {
            library.return_book(RecordId(borrower), RecordId(book))?;
            println!("returned: borrower {} returned book {}", borrower, book);
        }
        LibraryCommands::Records => {
            println!("borrower\tbook\tborrowed\treturned");
            for record in library.borrows() {
                println!(
                    "{}\t{}\t{}\t{}",
                    record.borrower_id,
                    record.book_id,
                    record.borrow_date,
                    record.return_date.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

fn run_ledger(ledger: &mut Ledger, action: LedgerCommands) -> shelfkv::Result<()> {
    match action {
        LedgerCommands::Add {
            date,
            category,
            amount,
            note,
        } => {
            let id = ledger.add(&date, &category, amount, &note)?;
            println!("added: id={}", id);
        }
        LedgerCommands::Update {
            id,
            date,
            category,
            amount,
            note,
        } => {
            ledger.update(RecordId(id), &date, &category, amount, &note)?;
            println!("updated: id={}", id);
        }
        LedgerCommands::Delete { id } => {
            ledger.delete(RecordId(id))?;
            println!("deleted: id={}", id);
        }
        LedgerCommands::List { from, to, category } => {
            let filter = EntryFilter { from, to, category };
            println!("ID\tdate\tcategory\tamount\tnote");
            for entry in ledger.filter(&filter) {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    entry.id, entry.date, entry.category, entry.amount, entry.note
                );
            }
            match ledger.summarize(&filter) {
                Some(summary) => println!(
                    "count={} total={} min={} max={} mean={}",
                    summary.count, summary.total, summary.min, summary.max, summary.mean
                ),
                None => println!("no entries"),
            }
        }
    }
    Ok(())
}
