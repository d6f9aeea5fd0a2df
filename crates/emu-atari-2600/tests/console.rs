//! Whole-console tests driven by a tiny frame kernel.

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::Receiver;

use emu_atari_2600::{
    Atari2600, Atari2600Config, Event, Halt, SCANLINE_WIDTH, Switches, unmirror,
};
use emu_core::{Bus, Observable, Value};

/// Minimal NTSC-style kernel: three lines of VSYNC, then 192 lines of
/// background colour $1E, forever.
const KERNEL: &[u8] = &[
    0x85, 0x02, // F000  STA WSYNC
    0xA9, 0x02, // F002  LDA #$02
    0x85, 0x00, // F004  STA VSYNC
    0x85, 0x02, // F006  STA WSYNC
    0x85, 0x02, // F008  STA WSYNC
    0x85, 0x02, // F00A  STA WSYNC
    0xA9, 0x00, // F00C  LDA #$00
    0x85, 0x00, // F00E  STA VSYNC
    0xA9, 0x1E, // F010  LDA #$1E
    0x85, 0x09, // F012  STA COLUBK
    0xA2, 0xC0, // F014  LDX #192
    0x85, 0x02, // F016  STA WSYNC
    0xCA, //       F018  DEX
    0xD0, 0xFB, // F019  BNE $F016
    0x4C, 0x00, 0xF0, // F01B  JMP $F000
];

fn console() -> Atari2600 {
    let mut rom = vec![0x00; 4096];
    rom[..KERNEL.len()].copy_from_slice(KERNEL);
    rom[0x0FFC] = 0x00;
    rom[0x0FFD] = 0xF0;

    let mut console = Atari2600::new(&Atari2600Config::seeded(2600));
    console.insert_cartridge(rom).expect("valid image");
    console
}

fn drain(events: &Receiver<Event>) -> Vec<Event> {
    events.try_iter().collect()
}

#[test]
fn insert_emits_reset() {
    let mut console = Atari2600::new(&Atari2600Config::seeded(1));
    let events = console.subscribe();
    console.insert_cartridge(vec![0xEA; 2048]).unwrap();
    assert_eq!(drain(&events), [Event::Reset]);
}

#[test]
fn mirrored_reads_match_canonical_reads() {
    let mut console = console();
    // Touch RAM and a timer so the mirrors have something to show.
    console.write(0x0090, 0x5A);
    console.write(0x0296, 0x80);
    for address in [0x0045, 0x0190, 0x01FF, 0x0284, 0x3284, 0x5000, 0x1FFD, 0x9FFC] {
        assert_eq!(
            console.peek(address),
            console.peek(unmirror(address)),
            "${address:04X}"
        );
    }
    assert_eq!(console.read(0x0190), console.read(0x0090));
    assert_eq!(console.read(0x0045), console.read(0x0005));
    assert_eq!(console.read(0x0190), 0x5A);
}

#[test]
fn step_frame_stops_once_per_vsync() {
    let mut console = console();
    let events = console.subscribe();

    console.step_frame().unwrap();
    assert_eq!(console.frame_count(), 1);
    assert!(console.tia().screen_clock() < SCANLINE_WIDTH);
    assert_eq!(console.cpu().regs.pc, 0xF010);
    assert_eq!(drain(&events), [Event::Frame, Event::Break]);

    console.step_frame().unwrap();
    assert_eq!(console.frame_count(), 2);
    assert_eq!(console.cpu().regs.pc, 0xF010);
    assert_eq!(drain(&events), [Event::Frame, Event::Break]);
}

#[test]
fn full_frame_draws_background() {
    let mut console = console();
    console.step_frame().unwrap();
    console.step_frame().unwrap();

    let width = SCANLINE_WIDTH as usize;
    let frame = console.frame();
    assert_eq!(frame[10 * width + 100], 0x0F);
    assert_eq!(frame[10 * width + 10], 0x00, "horizontal blank");
    assert_eq!(frame[150 * width + 227], 0x0F);
}

#[test]
fn step_scanline_stops_at_line_boundary() {
    let mut console = console();
    let events = console.subscribe();

    console.step_scanline().unwrap();

    assert_eq!(console.tia().scanline(), 1);
    assert_eq!(console.tia().horizontal_position(), 0);
    assert_eq!(console.cpu().regs.pc, 0xF002, "next instruction not run");
    assert_eq!(drain(&events), [Event::Break]);
}

#[test]
fn step_instruction_emits_break_each_time() {
    let mut console = console();
    let events = console.subscribe();
    console.step_instruction().unwrap();
    console.step_instruction().unwrap();
    assert_eq!(drain(&events), [Event::Break, Event::Break]);
    assert_eq!(console.cpu().regs.pc, 0xF004);
}

#[test]
fn resume_until_halts_on_first_breakpoint_reached() {
    let mut console = console();
    let events = console.subscribe();

    let breakpoints: HashSet<u16> = [0xF00C, 0xF01B].into_iter().collect();
    assert_eq!(console.resume_until(&breakpoints), Ok(0xF00C));
    assert_eq!(console.cpu().regs.pc, 0xF00C);
    // Six instructions from $F000 to $F00C, then the final break.
    let mut expected = vec![Event::Resume];
    expected.extend([Event::Break; 7]);
    assert_eq!(drain(&events), expected);

    assert_eq!(console.resume_until(&breakpoints), Ok(0xF01B));
    assert_eq!(console.query("cpu.x"), Some(Value::U8(0)));
}

#[test]
fn resume_runs_at_least_one_instruction() {
    let mut console = console();
    let events = console.subscribe();
    let breakpoints: HashSet<u16> = [0xF000, 0xF002].into_iter().collect();
    assert_eq!(console.resume_until(&breakpoints), Ok(0xF002));
    assert_eq!(drain(&events), [Event::Resume, Event::Break, Event::Break]);
}

#[test]
fn resume_breaks_after_every_instruction() {
    let mut console = Atari2600::new(&Atari2600Config::seeded(3));
    let mut rom = vec![0xEA; 4096];
    rom[0x0FFC] = 0x00;
    rom[0x0FFD] = 0xF0;
    console.insert_cartridge(rom).unwrap();
    let events = console.subscribe();

    let breakpoints: HashSet<u16> = [0xF004].into_iter().collect();
    assert_eq!(console.resume_until(&breakpoints), Ok(0xF004));

    let breaks = drain(&events)
        .into_iter()
        .filter(|e| *e == Event::Break)
        .count();
    assert_eq!(breaks, 3);
}

#[test]
fn resume_can_be_cancelled() {
    let mut console = console();
    let cancel = AtomicBool::new(true);
    let halt = console
        .resume_until_cancelled(&HashSet::new(), &cancel)
        .unwrap();
    assert_eq!(halt, Halt::Cancelled);
    assert_eq!(console.cpu().regs.pc, 0xF002);
}

#[test]
fn reset_restarts_program() {
    let mut console = console();
    console.step_frame().unwrap();
    let events = console.subscribe();

    console.reset();

    assert_eq!(console.cpu().regs.pc, 0xF000);
    assert_eq!(console.frame_count(), 0);
    assert_eq!(console.cycles(), 0);
    assert_eq!(console.tia().screen_clock(), 0);
    assert_eq!(drain(&events), [Event::Reset]);
}

#[test]
fn switches_read_through_port_b() {
    let mut console = Atari2600::new(&Atari2600Config {
        seed: Some(5),
        switches: Some(Switches(Switches::COLOR)),
    });
    console.insert_cartridge(vec![0xEA; 4096]).unwrap();
    assert_eq!(console.peek(0x0282), 0x0B);

    console.set_switch(Switches::SELECT, true);
    assert_eq!(console.peek(0x0282), 0x09);
    assert!(console.switches().is_on(Switches::SELECT));
}
