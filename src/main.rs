// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use expense_tracker::{
    calendar, Category, Dashboard, ExpenseInput, FilterCriteria, Period, RecordStore,
    SqliteKeyValueStore,
};

#[derive(Parser)]
#[command(name = "expense-tracker")]
#[command(version, about = "Personal expense tracker with stats, filters and a terminal dashboard")]
struct Cli {
    /// Database file holding the expense list
    #[arg(long, env = "EXPENSE_TRACKER_DB", default_value = "expenses.db")]
    db: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Record a new expense
    Add {
        #[arg(short, long)]
        description: String,

        /// Amount, e.g. 4.50 (must be non-zero)
        #[arg(short, long, allow_hyphen_values = true)]
        amount: String,

        /// food, transport, shopping, entertainment, health, bills, education, travel, other
        #[arg(short, long, default_value = "")]
        category: String,

        /// YYYY-MM-DD, defaults to today
        #[arg(long, default_value = "")]
        date: String,
    },

    /// Replace the values of an existing expense (omitted fields are kept)
    Edit {
        id: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(long)]
        date: Option<String>,
    },

    /// Delete an expense by id
    Delete { id: String },

    /// List expenses matching the filters
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show totals for expenses matching the filters
    Stats {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long)]
        json: bool,
    },

    /// Show the known categories and their labels
    Categories,

    /// Interactive terminal dashboard (default)
    Ui,
}

#[derive(Args)]
struct FilterArgs {
    /// Case-insensitive text to look for in descriptions
    #[arg(short, long, default_value = "")]
    search: String,

    /// Exact category key
    #[arg(short, long, default_value = "")]
    category: String,

    /// today, week or month
    #[arg(short, long, default_value = "")]
    period: String,
}

impl FilterArgs {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria::new(
            self.search.clone(),
            self.category.clone(),
            Period::from_key(&self.period),
        )
    }
}

fn main() -> Result<()> {
    // Diagnostics go to stderr; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("expense_tracker=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let db = cli.db.as_str();

    match cli.command.unwrap_or(Command::Ui) {
        Command::Add {
            description,
            amount,
            category,
            date,
        } => run_add(
            &mut open_store(db)?,
            ExpenseInput::new(description, amount, category, date),
        ),
        Command::Edit {
            id,
            description,
            amount,
            category,
            date,
        } => run_edit(&mut open_store(db)?, &id, description, amount, category, date),
        Command::Delete { id } => run_delete(&mut open_store(db)?, &id),
        Command::List { filters, json } => run_list(&open_store(db)?, &filters.criteria(), json),
        Command::Stats { filters, json } => run_stats(&open_store(db)?, &filters.criteria(), json),
        Command::Categories => {
            run_categories();
            Ok(())
        }
        Command::Ui => run_ui_mode(open_store(db)?),
    }
}

/// Only commands that read or write expenses touch the database file
fn open_store(db: &str) -> Result<RecordStore<SqliteKeyValueStore>> {
    info!(db, "opening expense store");
    RecordStore::open(db)
}

fn run_add(store: &mut RecordStore<SqliteKeyValueStore>, input: ExpenseInput) -> Result<()> {
    let expense = match input.validate(calendar::today()) {
        Ok(expense) => expense,
        Err(e) => {
            eprintln!("⚠️  Expense not added: {}", e);
            return Ok(());
        }
    };

    let record = store.add(expense)?;
    println!(
        "✓ Added {} ({}) {} on {}",
        record.description,
        record.category().label(),
        expense_tracker::format_currency(record.amount),
        expense_tracker::format_display_date(&record.date),
    );
    println!("  id: {}", record.id);

    Ok(())
}

fn run_edit(
    store: &mut RecordStore<SqliteKeyValueStore>,
    id: &str,
    description: Option<String>,
    amount: Option<String>,
    category: Option<String>,
    date: Option<String>,
) -> Result<()> {
    let Some(existing) = store.find(id) else {
        eprintln!("⚠️  No expense with id {}", id);
        return Ok(());
    };

    let input =
        ExpenseInput::from_record(&existing).with_overrides(description, amount, category, date);

    let expense = match input.validate(calendar::today()) {
        Ok(expense) => expense,
        Err(e) => {
            eprintln!("⚠️  Expense not changed: {}", e);
            return Ok(());
        }
    };

    if store.update(id, expense)? {
        println!("✓ Updated expense {}", id);
    }

    Ok(())
}

fn run_delete(store: &mut RecordStore<SqliteKeyValueStore>, id: &str) -> Result<()> {
    if store.remove(id)? {
        println!("✓ Deleted expense {}", id);
    } else {
        println!("Nothing to delete: no expense with id {}", id);
    }
    Ok(())
}

fn run_list(
    store: &RecordStore<SqliteKeyValueStore>,
    criteria: &FilterCriteria,
    json: bool,
) -> Result<()> {
    let records = store.load();
    let dashboard = Dashboard::build(&records, criteria, calendar::today());

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard.rows)?);
        return Ok(());
    }

    if dashboard.is_empty() {
        println!("📭 No expenses to show");
        return Ok(());
    }

    println!(
        "{:<36}  {:<30}  {:<18}  {:<10}  {:>12}",
        "ID", "Description", "Category", "Date", "Amount"
    );
    println!("{}", "━".repeat(114));
    for row in &dashboard.rows {
        println!(
            "{:<36}  {:<30}  {:<18}  {:<10}  {:>12}",
            row.id, row.description, row.category, row.date, row.amount
        );
    }
    println!("{}", "━".repeat(114));
    println!("{} expenses, total {}", dashboard.count_display, dashboard.total_display);

    Ok(())
}

fn run_stats(
    store: &RecordStore<SqliteKeyValueStore>,
    criteria: &FilterCriteria,
    json: bool,
) -> Result<()> {
    let records = store.load();
    let dashboard = Dashboard::build(&records, criteria, calendar::today());

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard.stats)?);
        return Ok(());
    }

    println!("📊 Expense Stats");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Total:       {:>12}", dashboard.total_display);
    println!("  This week:   {:>12}", dashboard.week_display);
    println!("  This month:  {:>12}", dashboard.month_display);
    println!("  Expenses:    {:>12}", dashboard.count_display);
    println!(
        "  Average:     {:>12}",
        expense_tracker::format_currency(dashboard.stats.average())
    );

    let slices = dashboard.category_slices();
    if !slices.is_empty() {
        println!("\n  By category");
        for slice in slices {
            println!(
                "  {:<18} {:>12}  {:>5.1}%",
                slice.label,
                expense_tracker::format_currency(slice.amount),
                slice.share * 100.0
            );
        }
    }

    Ok(())
}

fn run_categories() {
    for category in Category::ALL {
        println!("{:<14} {}", category.key(), category.label());
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(store: RecordStore<SqliteKeyValueStore>) -> Result<()> {
    let mut app = ui::App::new(store, calendar::today());
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_store: RecordStore<SqliteKeyValueStore>) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the list / stats commands");
    std::process::exit(1);
}
