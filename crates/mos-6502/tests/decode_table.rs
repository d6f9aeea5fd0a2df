//! Decode every opcode byte and compare with the golden table in
//! `tests/data/opcodes.json`.

use mos_6502::{DecodeError, Instruction, decode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Entry {
    opcode: u8,
    mnemonic: String,
    mode: String,
    cycles: u32,
}

fn golden() -> Vec<Option<Entry>> {
    let text = include_str!("data/opcodes.json");
    serde_json::from_str(text).expect("golden table parses")
}

#[test]
fn table_covers_every_byte() {
    assert_eq!(golden().len(), 256);
}

#[test]
fn decode_matches_golden_table() {
    for (byte, expected) in golden().into_iter().enumerate() {
        let opcode = byte as u8;
        match (decode(opcode), expected) {
            (Ok((operation, mode)), Some(entry)) => {
                assert_eq!(entry.opcode, opcode);
                assert_eq!(operation.mnemonic(), entry.mnemonic, "${opcode:02X}");
                assert_eq!(format!("{mode:?}"), entry.mode, "${opcode:02X}");
                assert_eq!(
                    mos_6502::instruction_cycles(operation, mode),
                    entry.cycles,
                    "${opcode:02X}"
                );
            }
            (Err(err), None) => {
                assert_eq!(err, DecodeError::InvalidOpcode { opcode });
            }
            (got, want) => panic!("${opcode:02X}: decoded {got:?}, golden {want:?}"),
        }
    }
}

#[test]
fn documented_count_matches_golden_table() {
    let documented = golden().iter().filter(|e| e.is_some()).count();
    let decoded = (0..=255u8).filter(|&op| decode(op).is_ok()).count();
    assert_eq!(documented, 151);
    assert_eq!(decoded, documented);
}

#[test]
fn lengths_follow_addressing_mode() {
    let lda_abs = Instruction::from_bytes(&[0xAD, 0x34, 0x12]).unwrap();
    assert_eq!(lda_abs.len(), 3);
    let lda_imm = Instruction::from_bytes(&[0xA9, 0x34]).unwrap();
    assert_eq!(lda_imm.len(), 2);
    let rts = Instruction::from_bytes(&[0x60]).unwrap();
    assert_eq!(rts.len(), 1);
}
