use clap::{Parser, Subcommand};
use diskmap::{DiskMap, DiskMapError, DiskMapOptions, OpenMode, Result};
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Create(args) => run_create(args),
        Command::Info(args) => run_info(args),
        Command::Insert(args) => run_insert(args),
        Command::Get(args) => run_get(args),
        Command::Delete(args) => run_delete(args),
        Command::List(args) => run_list(args),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "diskmap utility for inspecting and editing table files",
    subcommand_required = true,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new empty table file
    Create(CreateArgs),
    /// Print table counters as JSON
    Info(InfoArgs),
    /// Insert a key-value pair
    Insert(EntryArgs),
    /// Look up a key and print its value as hex
    Get(KeyArgs),
    /// Delete a key
    Delete(KeyArgs),
    /// List live records in insertion order
    List(InfoArgs),
}

#[derive(clap::Args)]
struct CreateArgs {
    /// Path of the table file to create
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Maximum key length in bytes, excluding the terminator
    #[arg(long, default_value_t = 15)]
    key_maxlen: u64,

    /// Exact value length in bytes
    #[arg(long, default_value_t = 8)]
    object_datalen: u64,
}

#[derive(clap::Args)]
struct InfoArgs {
    /// Path of the table file
    #[arg(value_name = "FILE")]
    path: PathBuf,
}

#[derive(clap::Args)]
struct EntryArgs {
    /// Path of the table file
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Key to insert
    key: String,

    /// Value bytes as a hex string, exactly object_datalen bytes long
    value: String,
}

#[derive(clap::Args)]
struct KeyArgs {
    /// Path of the table file
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Key to operate on
    key: String,
}

fn run_create(args: CreateArgs) -> Result<()> {
    let map = DiskMap::open(
        &args.path,
        DiskMapOptions::new(args.key_maxlen, args.object_datalen),
        OpenMode::Create,
    )?;
    print_stats(&map)
}

fn run_info(args: InfoArgs) -> Result<()> {
    let map = DiskMap::open(&args.path, DiskMapOptions::zeroed(), OpenMode::ReadOnly)?;
    print_stats(&map)
}

fn run_insert(args: EntryArgs) -> Result<()> {
    let mut map = DiskMap::open(&args.path, DiskMapOptions::zeroed(), OpenMode::ReadWrite)?;
    let value = parse_hex(&args.value)?;
    let inserted = map.insert(&args.key, &value)?;
    println!(
        "{}",
        if inserted {
            "inserted"
        } else {
            "already present"
        }
    );
    Ok(())
}

fn run_get(args: KeyArgs) -> Result<()> {
    let map = DiskMap::open(&args.path, DiskMapOptions::zeroed(), OpenMode::ReadOnly)?;
    match map.lookup(&args.key) {
        Some(data) => println!("{}", to_hex(data)),
        None => println!("not found"),
    }
    Ok(())
}

fn run_delete(args: KeyArgs) -> Result<()> {
    let mut map = DiskMap::open(&args.path, DiskMapOptions::zeroed(), OpenMode::ReadWrite)?;
    let deleted = map.delete(&args.key)?;
    println!("{}", if deleted { "deleted" } else { "not found" });
    Ok(())
}

fn run_list(args: InfoArgs) -> Result<()> {
    let map = DiskMap::open(&args.path, DiskMapOptions::zeroed(), OpenMode::ReadOnly)?;
    for entry in map.iter() {
        let (key, data) = entry?;
        println!("{}\t{}", key, to_hex(&data));
    }
    Ok(())
}

fn print_stats(map: &DiskMap) -> Result<()> {
    let json = serde_json::to_string_pretty(&map.stats())
        .map_err(|e| DiskMapError::InvalidArgument(format!("failed to format JSON: {e}")))?;
    println!("{}", json);
    Ok(())
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        return Err(DiskMapError::InvalidArgument(
            "hex value must have an even number of digits".to_string(),
        ));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&text[i..i + 2], 16).map_err(|e| {
                DiskMapError::InvalidArgument(format!("bad hex byte at offset {i}: {e}"))
            })
        })
        .collect()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
