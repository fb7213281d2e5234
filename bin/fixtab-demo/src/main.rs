use std::fmt::Display;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::info;

use fixtab_core::{FixtabResult, RecordId};
use fixtab_hal::Checksum;
use fixtab_sim::SimEeprom;
use fixtab_store::{Crc16, Crc8, NoChecksum, RecordStore, RecordTable, StoreConfig, Width};

const VERSION_U8: RecordId = RecordId(0);
const SENSOR_VAL1_U32: RecordId = RecordId(1);
const LABEL_STR10: RecordId = RecordId(2);
const SENSOR_VAL2_S32: RecordId = RecordId(3);

const LABEL_LEN: usize = 10;

#[derive(Clone, Copy, ValueEnum)]
enum ChecksumKind {
    None,
    Crc8,
    Crc16,
}

#[derive(Parser)]
#[command(about = "Exercise a fixed record table on a simulated EEPROM")]
struct Cli {
    #[arg(long, value_enum, default_value = "crc8")] checksum: ChecksumKind,
    /// Keep a second copy of every record.
    #[arg(long)] backup: bool,
    #[arg(long, default_value_t = 16)] start: u32,
    #[arg(long, default_value_t = 2047)] end: u32,
    #[arg(long, default_value_t = 2048)] capacity: usize,
    /// Raw image file; loaded if present and saved on exit.
    #[arg(long)] image: Option<PathBuf>,
    #[arg(long, default_value_t = 0)] dump_start: u32,
    #[arg(long, default_value_t = 255)] dump_end: u32,
    /// Silence store diagnostics.
    #[arg(long)] quiet: bool,
}

fn table() -> RecordTable {
    RecordTable::new()
        .with("eeprom_file_version", 1)
        .with("sensor_val1", 4)
        .with("text_label1", LABEL_LEN as u32)
        .with("sensor_val2", 4)
}

fn status<T>(result: &FixtabResult<T>) {
    match result {
        Ok(_) => println!("Status = {}", "OK".green()),
        Err(e) => println!("Status = {}", e.to_string().red()),
    }
}

fn show<T: Display>(label: &str, result: FixtabResult<T>) {
    status(&result);
    if let Ok(value) = result {
        println!("{}: {}", label, value);
    }
}

fn run<C: Checksum>(cli: &Cli, checksum: C) -> anyhow::Result<()> {
    let config = StoreConfig::builder()
        .table(table())
        .range(cli.start, cli.end)
        .address_width(Width::fitting(cli.end))
        .backup(cli.backup)
        .diagnostics(!cli.quiet)
        .build();

    let medium = match &cli.image {
        Some(path) => SimEeprom::load(path, cli.capacity)?,
        None => SimEeprom::new(cli.capacity),
    };
    let store = RecordStore::new(config, medium, checksum)?;

    println!("{}", "Fixed record table demo".bold());
    println!(
        "Max address: {} [ < 256 = u8, < 65536 = u16 else u32 ]",
        store.max_address()
    );
    println!("Table size: {}", store.table_size());

    // WRITE
    println!("\n## Write u8: 1");
    status(&store.write_value(VERSION_U8, 1u8));

    println!("\n## Write u32: 4578686");
    status(&store.write_value(SENSOR_VAL1_U32, 4_578_686u32));

    println!("\n## Write string: 1234567892-----------");
    status(&store.write_str(LABEL_STR10, "1234567892-----------"));

    println!("\n## Write s32: -34567890");
    status(&store.write_value(SENSOR_VAL2_S32, -34_567_890i32));

    println!("\n## Write s32 to unknown record 45");
    status(&store.write_value(RecordId(45), -34_567_890i32));

    // READ BACK
    println!("\n$$ Read u8");
    show("u8", store.read_value::<u8>(VERSION_U8));

    println!("\n$$ Read u32");
    show("u32", store.read_value::<u32>(SENSOR_VAL1_U32));

    println!("\n$$ Read string");
    let mut label = [0u8; LABEL_LEN + 1];
    show(
        "string",
        store
            .read_str_into(LABEL_STR10, &mut label)
            .map(|n| String::from_utf8_lossy(&label[..n]).into_owned()),
    );

    println!("\n$$ Read s32");
    show("s32", store.read_value::<i32>(SENSOR_VAL2_S32));

    println!("\nError count: {}", store.error_count());

    let medium = store.into_medium();
    print!("\n{}", medium.dump(cli.dump_start, cli.dump_end));

    if let Some(path) = &cli.image {
        medium.save(path)?;
        info!("Image written to {}", path.display());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.checksum {
        ChecksumKind::None => run(&cli, NoChecksum),
        ChecksumKind::Crc8 => run(&cli, Crc8),
        ChecksumKind::Crc16 => run(&cli, Crc16),
    }
}
