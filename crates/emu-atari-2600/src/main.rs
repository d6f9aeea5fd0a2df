//! Headless Atari 2600 runner.
//!
//! Loads a cartridge, runs a number of frames (or until a breakpoint) and
//! prints the machine state, or prints a disassembly of the ROM.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use emu_atari_2600::{Atari2600, Atari2600Config, SCANLINE_WIDTH};
use emu_core::Observable;
use mos_6502::Disassembler;

const STATE_PATHS: &[&str] = &[
    "cpu.pc",
    "cpu.a",
    "cpu.x",
    "cpu.y",
    "cpu.s",
    "cpu.p",
    "cycles",
    "frame_count",
    "tia.scanline",
    "tia.hpos",
    "riot.timer",
    "riot.divider",
    "switches",
];

/// Atari 2600 emulator (headless)
#[derive(Parser, Debug)]
#[command(name = "emu-atari-2600")]
#[command(about = "Run an Atari 2600 cartridge without a display", long_about = None)]
struct Args {
    /// Raw cartridge image (up to 4 KiB)
    #[arg(short, long)]
    rom: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value = "1")]
    frames: u64,

    /// Seed for power-on RAM, timer and switch values
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop when PC reaches this address (hex, repeatable)
    #[arg(short = 'b', long = "break", value_parser = parse_hex)]
    breakpoints: Vec<u16>,

    /// Print a disassembly of the cartridge and exit
    #[arg(short, long)]
    disasm: bool,

    /// Print state as JSON
    #[arg(short, long)]
    json: bool,
}

fn parse_hex(text: &str) -> Result<u16, String> {
    let digits = text
        .strip_prefix('$')
        .or_else(|| text.strip_prefix("0x"))
        .unwrap_or(text);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address {text:?}: {e}"))
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut console = Atari2600::new(&Atari2600Config {
        seed: args.seed,
        switches: None,
    });
    if let Err(e) = console.load_cartridge(&args.rom) {
        eprintln!("{e}");
        process::exit(1);
    }

    if args.disasm {
        print_disassembly(&console);
        return;
    }

    let result = if args.breakpoints.is_empty() {
        (0..args.frames).try_for_each(|_| console.step_frame())
    } else {
        let breakpoints: HashSet<u16> = args.breakpoints.iter().copied().collect();
        console.resume_until(&breakpoints).map(|_| ())
    };
    if let Err(e) = result {
        eprintln!("Stopped: {e}");
    }

    if args.json {
        print_json(&console);
    } else {
        print_summary(&console);
    }

    if result.is_err() {
        process::exit(2);
    }
}

fn print_disassembly(console: &Atari2600) {
    let Some(cartridge) = console.cartridge() else {
        return;
    };
    for line in Disassembler::new(cartridge.bytes(), 0xF000) {
        println!("{line}");
    }
}

fn print_summary(console: &Atari2600) {
    println!("Frames: {}", console.frame_count());
    for path in STATE_PATHS {
        if let Some(value) = console.query(path) {
            println!("  {path:<14} {value}");
        }
    }
    let lines = console.frame().len() / SCANLINE_WIDTH as usize;
    let lit = console
        .frame()
        .chunks(SCANLINE_WIDTH as usize)
        .filter(|line| line.iter().any(|&c| c != 0))
        .count();
    println!("  {:<14} {lit}/{lines}", "drawn lines");
}

fn print_json(console: &Atari2600) {
    let snapshot: BTreeMap<&str, _> = STATE_PATHS
        .iter()
        .filter_map(|&path| console.query(path).map(|v| (path, v)))
        .collect();
    match serde_json::to_string_pretty(&snapshot) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Failed to encode state: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_addresses_accept_common_prefixes() {
        assert_eq!(parse_hex("F00C"), Ok(0xF00C));
        assert_eq!(parse_hex("$f00c"), Ok(0xF00C));
        assert_eq!(parse_hex("0xF00C"), Ok(0xF00C));
        assert!(parse_hex("$10000").is_err());
    }

    #[test]
    fn args_parse() {
        let args = Args::parse_from([
            "emu-atari-2600",
            "-r",
            "game.a26",
            "-b",
            "$F000",
            "--break",
            "F010",
        ]);
        assert_eq!(args.breakpoints, [0xF000, 0xF010]);
        assert_eq!(args.frames, 1);
        assert!(!args.json);
    }
}
