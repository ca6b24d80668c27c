//! Headless board runner.
//!
//! Loads a ROM image (and optionally an EEPROM image), runs the board for
//! a bounded number of ticks and prints the final machine state.
//!
//! ```text
//! sync-runner --rom program.bin --ticks 50000
//! RUST_LOG=trace sync-runner --rom program.bin --ticks 200
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use sync_board::{Board, BoardConfig, BoardError, SerialEeprom};
use sync_core::{Cpu, Observable};

#[derive(Parser, Debug)]
#[command(version, about = "Run a program on the sync-6502 reference board")]
struct Cli {
    /// ROM image, programmed from the start of the ROM window.
    #[arg(long)]
    rom: PathBuf,

    /// JSON board configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// EEPROM image. Enables the EEPROM bootstrap.
    #[arg(long)]
    eeprom: Option<PathBuf>,

    /// Ticks to run.
    #[arg(long, default_value_t = 100_000)]
    ticks: u64,

    /// Button input byte (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = parse_byte, default_value = "0")]
    buttons: u8,

    /// Assert the halt input at this tick.
    #[arg(long)]
    halt_at: Option<u64>,

    /// Release the halt input at this tick.
    #[arg(long)]
    release_at: Option<u64>,
}

fn parse_byte(text: &str) -> Result<u8, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid byte '{text}': {e}"))
}

fn make_board(cli: &Cli) -> Result<Board, BoardError> {
    let config = match &cli.config {
        Some(path) => BoardConfig::from_file(path)?,
        None => BoardConfig::default(),
    };

    let mut board = match &cli.eeprom {
        Some(path) => {
            let image = fs::read(path)?;
            info!("EEPROM image: {} ({} bytes)", path.display(), image.len());
            let latency = config.bootstrap.latency();
            Board::with_eeprom(config, Box::new(SerialEeprom::new(image, latency)))?
        }
        None => Board::new(config)?,
    };

    let rom = fs::read(&cli.rom)?;
    info!("ROM image: {} ({} bytes)", cli.rom.display(), rom.len());
    board.load_rom(&rom)?;
    board.set_buttons(cli.buttons);
    Ok(board)
}

fn run(cli: &Cli, board: &mut Board) -> Result<(), BoardError> {
    for tick in 0..cli.ticks {
        if cli.halt_at == Some(tick) {
            board.set_halt(true);
        }
        if cli.release_at == Some(tick) {
            board.set_halt(false);
        }
        board.run(1)?;
    }
    Ok(())
}

fn report(board: &Board) {
    let regs = board.engine().registers();
    println!(
        "PC=${:04X} A=${:02X} X=${:02X} Y=${:02X} SP=${:02X} P=${:02X}",
        regs.pc,
        regs.a,
        regs.x,
        regs.y,
        regs.sp,
        regs.p.to_byte()
    );
    if let Some(state) = board.query("cpu.state") {
        println!("state:  {state}");
    }
    println!("ticks:  {}", board.ticks());
    println!("output: ${:02X}", board.output_port());
    println!("tone:   {}", board.tone());
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut board = match make_board(&cli) {
        Ok(board) => board,
        Err(e) => {
            error!("{e}");
            eprintln!("Failed to set up board: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&cli, &mut board);
    report(&board);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
