use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;

use swagtrackr_api::{
    config::{self, AppConfig},
    db::{self, DbPool},
    errors::ServiceError,
    handlers::items::ItemResponse,
    services::inventory::InventoryService,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Add(args) => handle_adjust(&context, args, "Added", cli.json).await?,
        Commands::Restock(args) => handle_adjust(&context, args, "Restocked", cli.json).await?,
        Commands::SetQty(args) => handle_set_qty(&context, args, cli.json).await?,
        Commands::Checkout(args) => handle_checkout(&context, args, cli.json).await?,
        Commands::List => handle_list(&context, cli.json).await?,
        Commands::Delete(args) => handle_delete(&context, args, cli.json).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "swagtrackr",
    about = "SwagTrackr - minimal inventory management CLI",
    version
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new item or increase its quantity by QUANTITY
    Add(AdjustArgs),
    /// Increase quantity of an existing item by QUANTITY
    Restock(AdjustArgs),
    /// Set item quantity to QUANTITY (can create the item)
    SetQty(SetQtyArgs),
    /// Check out AMOUNT of NAME to a recipient (optional)
    Checkout(CheckoutArgs),
    /// List all items with quantities
    List,
    /// Delete an item by NAME
    Delete(DeleteArgs),
}

#[derive(Args)]
struct AdjustArgs {
    /// Item name
    name: String,
    /// Quantity to add to existing stock
    quantity: i32,
}

#[derive(Args)]
struct SetQtyArgs {
    /// Item name
    name: String,
    /// Absolute quantity to store
    quantity: i32,
}

#[derive(Args)]
struct CheckoutArgs {
    /// Item name
    name: String,
    /// Number of units to check out
    amount: i32,
    #[arg(long = "to", help = "Recipient name or identifier")]
    recipient: Option<String>,
}

#[derive(Args)]
struct DeleteArgs {
    /// Item name
    name: String,
}

struct CliContext {
    #[allow(dead_code)]
    config: AppConfig,
    #[allow(dead_code)]
    db: Arc<DbPool>,
    inventory: InventoryService,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load configuration")?;
        let pool = db::connect_from_config(&config)
            .await
            .context("failed to connect to database")?;
        let db = Arc::new(pool);
        db::run_migrations(&db)
            .await
            .context("failed to ensure database schema")?;
        let inventory = InventoryService::new(db.clone());

        Ok(Self {
            config,
            db,
            inventory,
        })
    }
}

#[derive(Serialize)]
struct CheckoutOutput {
    id: i32,
    name: String,
    quantity: i32,
    checked_out: i32,
}

async fn handle_adjust(
    context: &CliContext,
    args: AdjustArgs,
    verb: &str,
    json: bool,
) -> Result<()> {
    let name = required_name(&args.name)?;
    if args.quantity < 0 {
        bail!("quantity must be non-negative");
    }

    let (id, quantity) = context.inventory.create_or_adjust(name, args.quantity).await?;

    if json {
        print_json(&ItemResponse {
            id,
            name: name.to_string(),
            quantity,
        })?;
    } else {
        println!("{} {} of {}. New total: {}", verb, args.quantity, name, quantity);
    }

    Ok(())
}

async fn handle_set_qty(context: &CliContext, args: SetQtyArgs, json: bool) -> Result<()> {
    let name = required_name(&args.name)?;
    if args.quantity < 0 {
        bail!("quantity must be non-negative");
    }

    let (id, quantity) = context.inventory.set_quantity(name, args.quantity).await?;

    if json {
        print_json(&ItemResponse {
            id,
            name: name.to_string(),
            quantity,
        })?;
    } else {
        println!("Set {} to {}", name, quantity);
    }

    Ok(())
}

async fn handle_checkout(context: &CliContext, args: CheckoutArgs, json: bool) -> Result<()> {
    let name = required_name(&args.name)?;
    if args.amount <= 0 {
        bail!("checkout amount must be positive");
    }
    let recipient = args
        .recipient
        .as_deref()
        .map(str::trim)
        .filter(|recipient| !recipient.is_empty())
        .map(str::to_string);

    match context.inventory.checkout(name, args.amount, recipient).await {
        Ok((id, quantity)) => {
            if json {
                print_json(&CheckoutOutput {
                    id,
                    name: name.to_string(),
                    quantity,
                    checked_out: args.amount,
                })?;
            } else {
                println!(
                    "Checked out {} of {}. Remaining: {}",
                    args.amount, name, quantity
                );
            }
            Ok(())
        }
        Err(
            err @ (ServiceError::InvalidAmount(_)
            | ServiceError::NotFound(_)
            | ServiceError::InsufficientStock(_)),
        ) => {
            eprintln!("Error: {}", err.response_message());
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

async fn handle_list(context: &CliContext, json: bool) -> Result<()> {
    let items = context.inventory.list().await?;

    if json {
        let items: Vec<ItemResponse> = items.into_iter().map(Into::into).collect();
        return print_json(&items);
    }

    if items.is_empty() {
        println!("Inventory is empty.");
        return Ok(());
    }

    println!("Inventory:");
    for item in items {
        println!("- {}: {}", item.name, item.quantity);
    }

    Ok(())
}

async fn handle_delete(context: &CliContext, args: DeleteArgs, json: bool) -> Result<()> {
    let name = required_name(&args.name)?;

    if context.inventory.delete(name).await? {
        if json {
            print_json(&serde_json::json!({ "deleted": name }))?;
        } else {
            println!("Deleted {}", name);
        }
        Ok(())
    } else {
        eprintln!("Item not found");
        std::process::exit(1);
    }
}

fn required_name(raw: &str) -> Result<&str> {
    let name = raw.trim();
    if name.is_empty() {
        bail!("item name is required");
    }
    Ok(name)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
