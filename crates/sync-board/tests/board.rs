//! End-to-end board programs.
//!
//! Each test assembles a short program by hand, burns it into ROM at
//! $E000 and runs the board until the program parks in a `JMP *` loop.

use sync_board::{Board, BoardConfig, BoardError, Bootstrap, SerialEeprom, Tone};
use sync_core::{Cpu, Observable, Tickable, Ticks, Value};

/// Run until PC sits on the idle loop at `idle`.
fn run_to(board: &mut Board, idle: u16) {
    let reached = board
        .run_until(10_000, |b| {
            b.engine().is_instruction_complete() && b.engine().pc() == idle
        })
        .expect("program trapped");
    assert!(reached.is_some(), "PC never reached ${idle:04X}");
}

fn board_with(rom: &[u8]) -> Board {
    let mut board = Board::new(BoardConfig::default()).expect("default config");
    board.load_rom(rom).expect("ROM fits");
    board
}

#[test]
fn status_byte_scenario() {
    // $E000: A9 00     LDA #$00
    // $E002: 38        SEC
    // $E003: 08        PHP
    // $E004: 68        PLA
    // $E005: 8D 01 D0  STA $D001
    // $E008: 4C 08 E0  JMP $E008
    let rom = [
        0xA9, 0x00, 0x38, 0x08, 0x68, 0x8D, 0x01, 0xD0, 0x4C, 0x08, 0xE0,
    ];
    let mut board = board_with(&rom);
    run_to(&mut board, 0xE008);

    // Carry set by SEC, zero left set by LDA #0
    assert_eq!(board.output_port() & 0x01, 0x01);
    assert_eq!(board.output_port(), 0x03);
    assert_eq!(board.engine().registers().sp, 0x3F);
}

#[test]
fn counting_loop_with_subroutine() {
    // $E000: A2 05     LDX #$05
    // $E002: 20 0C E0  JSR $E00C
    // $E005: CA        DEX
    // $E006: D0 FA     BNE $E002
    // $E008: 4C 08 E0  JMP $E008
    // $E00B: EA        NOP
    // $E00C: EE 01 D0  INC $D001     (write-only: reads 0, writes 1)
    // $E00F: E6 10     INC $10
    // $E011: 60        RTS
    let rom = [
        0xA2, 0x05, 0x20, 0x0C, 0xE0, 0xCA, 0xD0, 0xFA, 0x4C, 0x08, 0xE0, 0xEA, 0xEE, 0x01,
        0xD0, 0xE6, 0x10, 0x60,
    ];
    let mut board = board_with(&rom);
    run_to(&mut board, 0xE008);

    assert_eq!(board.peek(0x0010), 5);
    assert_eq!(board.output_port(), 1);
    assert_eq!(board.engine().registers().x, 0);
    assert_eq!(board.engine().registers().sp, 0x3F);
}

#[test]
fn buttons_drive_output_and_tone() {
    // $E000: AD 00 D0  LDA $D000
    // $E003: 8D 01 D0  STA $D001
    // $E006: 29 01     AND #$01
    // $E008: F0 05     BEQ $E00F
    // $E00A: A9 45     LDA #69
    // $E00C: 8D 02 D0  STA $D002
    // $E00F: 4C 0F E0  JMP $E00F
    let rom = [
        0xAD, 0x00, 0xD0, 0x8D, 0x01, 0xD0, 0x29, 0x01, 0xF0, 0x05, 0xA9, 0x45, 0x8D, 0x02,
        0xD0, 0x4C, 0x0F, 0xE0,
    ];

    let mut board = board_with(&rom);
    board.set_buttons(0b1000_0001);
    run_to(&mut board, 0xE00F);
    assert_eq!(board.output_port(), 0b1000_0001);
    assert_eq!(board.tone(), Tone::Note(69));
    assert_eq!(board.query("tone"), Some(Value::U8(69)));

    let mut board = board_with(&rom);
    board.set_buttons(0b1000_0000);
    run_to(&mut board, 0xE00F);
    assert_eq!(board.output_port(), 0b1000_0000);
    assert_eq!(board.tone(), Tone::Silent);
}

#[test]
fn illegal_opcode_stops_the_run() {
    let mut board = board_with(&[0xEA, 0xEA, 0xFF]);
    let err = board.run(1_000).unwrap_err();
    assert!(matches!(
        err,
        BoardError::IllegalOpcode {
            opcode: 0xFF,
            address: 0xE002
        }
    ));
    assert_eq!(board.query("cpu.trapped"), Some(Value::Bool(true)));

    // Reset clears the trap
    board.set_reset(true);
    board.step();
    board.set_reset(false);
    assert!(!board.engine().is_trapped());
}

#[test]
fn halt_input_parks_and_resumes() {
    // $E000: E6 10     INC $10
    // $E002: 4C 00 E0  JMP $E000
    let mut board = board_with(&[0xE6, 0x10, 0x4C, 0x00, 0xE0]);
    board.run(200).unwrap();

    board.set_halt(true);
    board
        .run_until(50, |b| b.engine().is_halted())
        .unwrap()
        .expect("halt taken");
    assert_eq!(board.query("cpu.flags.b"), Some(Value::Bool(true)));
    let frozen = board.peek(0x0010);
    board.run(100).unwrap();
    assert_eq!(board.peek(0x0010), frozen);

    board.set_halt(false);
    board.run(100).unwrap();
    assert_ne!(board.peek(0x0010), frozen);
    assert_eq!(board.query("cpu.flags.b"), Some(Value::Bool(false)));
}

#[test]
fn eeprom_bootstrap_runs_program_from_ram() {
    // Loaded at $0200:
    // $0200: A9 2A     LDA #$2A
    // $0202: 8D 01 D0  STA $D001
    // $0205: 4C 05 02  JMP $0205
    let program = vec![0xA9, 0x2A, 0x8D, 0x01, 0xD0, 0x4C, 0x05, 0x02];
    let config = BoardConfig::from_json(
        r#"{ "bootstrap": { "kind": "eeprom", "load_base": 512, "length": 8, "latency": 3 } }"#,
    )
    .expect("valid config");
    let mut board =
        Board::with_eeprom(config, Box::new(SerialEeprom::new(program, 3))).expect("board");

    assert!(board.is_bootstrapping());
    run_to(&mut board, 0x0205);
    assert!(!board.is_bootstrapping());
    assert_eq!(board.output_port(), 0x2A);
}

#[test]
fn json_config_overrides_defaults() {
    let config = BoardConfig::from_json(
        r#"{
            "engine": { "reset_sp": 127, "startup_delay": 0 },
            "memory": { "rom": { "base": 61440, "size": 4096 } }
        }"#,
    )
    .expect("valid config");
    assert_eq!(config.engine.reset_sp, 0x7F);
    assert_eq!(config.engine.boot_vector, 0xE000);
    assert_eq!(config.memory.rom.base, 0xF000);
    assert_eq!(config.bootstrap, Bootstrap::Direct);

    let mut config = config;
    config.engine.boot_vector = 0xF000;
    let mut board = Board::new(config).expect("board");
    board.load_rom(&[0x4C, 0x00, 0xF0]).expect("ROM fits");
    run_to(&mut board, 0xF000);
    assert_eq!(board.engine().registers().sp, 0x7F);
}

#[test]
fn json_config_errors() {
    assert!(matches!(
        BoardConfig::from_json("{ not json"),
        Err(BoardError::Config(_))
    ));
    assert!(matches!(
        BoardConfig::from_json(r#"{ "memory": { "ram": { "base": 0, "size": 0 } } }"#),
        Err(BoardError::EmptyWindow("RAM"))
    ));
    assert!(matches!(
        BoardConfig::from_json(r#"{ "memory": { "peripherals": { "base": 57344, "size": 16 } } }"#),
        Err(BoardError::OverlappingWindows { .. })
    ));
    assert!(matches!(
        BoardConfig::from_json(r#"{ "memory": { "rom": { "base": 57344, "size": 4294967295 } } }"#),
        Err(BoardError::WindowOutOfRange("ROM"))
    ));
}

#[test]
fn rom_image_too_large() {
    let mut board = Board::new(BoardConfig::default()).expect("board");
    assert!(matches!(
        board.load_rom(&vec![0; 0x2001]),
        Err(BoardError::ImageTooLarge { what: "ROM", .. })
    ));
}

#[test]
fn tick_n_matches_step() {
    let rom = [0xE6, 0x10, 0x4C, 0x00, 0xE0];
    let mut stepped = board_with(&rom);
    let mut batched = board_with(&rom);

    for _ in 0..500 {
        stepped.step();
    }
    batched.tick_n(Ticks::new(500));

    assert_eq!(stepped.ticks(), batched.ticks());
    assert_eq!(stepped.peek(0x0010), batched.peek(0x0010));
    assert_eq!(stepped.engine().state(), batched.engine().state());
}
