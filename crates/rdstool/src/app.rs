//! Subcommand execution and report rendering
//!
//! The library hands back typed fields; everything human-readable
//! (the `PI:`/`GT:` report lines, the Active/Inactive spellings, the
//! partial-decode markers) lives here.

use std::io::Read;

use anyhow::{anyhow, Context};
use log::{info, warn};

use rdsgroup::{
    decode_str, pack, BasicTuning, DecodeOutcome, DecoderId, FieldSet, GroupKind, MusicSpeech,
    RadioTextMessage, TextField,
};

use crate::cli::{Args, Command, DecodeArgs, EncodeArgs};

/// Run the selected subcommand
pub fn run(args: &Args) -> Result<(), anyhow::Error> {
    match &args.command {
        Command::Encode(encode_args) => encode(encode_args),
        Command::Decode(decode_args) => decode(decode_args),
    }
}

fn encode(args: &EncodeArgs) -> Result<(), anyhow::Error> {
    let fields = field_set(args)?;
    println!("{}", pack(&fields));
    Ok(())
}

// clap enforces the per-group flag sets; the take here can only fail
// if that wiring breaks, but the error is real either way
fn field_set(args: &EncodeArgs) -> Result<FieldSet, anyhow::Error> {
    match args.group {
        GroupKind::BasicTuning => Ok(FieldSet::BasicTuning(BasicTuning {
            pi: args.pi,
            pty: args.pty,
            tp: args.tp,
            ta: args.ta.ok_or_else(|| missing("--ta"))?,
            ms: MusicSpeech::from_bit(args.ms.ok_or_else(|| missing("--ms"))?),
            di: DecoderId::default(),
            af: args.af.ok_or_else(|| missing("--af"))?,
            ps: args.ps.clone().ok_or_else(|| missing("--ps"))?,
        })),
        GroupKind::RadioText => Ok(FieldSet::RadioText(RadioTextMessage {
            pi: args.pi,
            pty: args.pty,
            tp: args.tp,
            ab: args.ab.ok_or_else(|| missing("--ab"))?,
            text: args.rt.clone().ok_or_else(|| missing("--rt"))?,
        })),
    }
}

fn missing(flag: &str) -> anyhow::Error {
    anyhow!("{} is required for this group type", flag)
}

fn decode(args: &DecodeArgs) -> Result<(), anyhow::Error> {
    let bits = if args.input_is_stdin() {
        info!("reading bitstream from standard input");
        let mut buf = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut buf)
            .context("unable to read standard input")?;
        buf
    } else {
        args.bits.clone()
    };

    let outcome = decode_str(bits.trim()).context("decode failed")?;
    if outcome.stats.bits_skipped > 0 {
        warn!(
            "skipped {} of {} input bits while hunting for sync",
            outcome.stats.bits_skipped, outcome.stats.bits_consumed
        );
    }
    print!("{}", render(&outcome));
    Ok(())
}

// The report format follows the reference decoder line for line, with
// an "(incomplete)" marker appended to fields missing segments
fn render(outcome: &DecodeOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!("PI: {}\n", outcome.pi));

    if let Some(tuning) = &outcome.tuning {
        out.push_str("GT: 0A\n");
        out.push_str(&format!("TP: {}\n", outcome.tp as u8));
        out.push_str(&format!("PTY: {}\n", outcome.pty));
        out.push_str(&format!(
            "TA: {}\n",
            if tuning.ta { "Active" } else { "Inactive" }
        ));
        out.push_str(&format!("MS: {}\n", tuning.ms));
        out.push_str(&format!("DI: {}\n", tuning.di));
        if let Some(af) = tuning.af {
            out.push_str(&format!("AF: {}\n", af));
        }
        out.push_str(&format!("PS: {}\n", quoted(&tuning.ps)));
    }

    if let Some(radiotext) = &outcome.radiotext {
        out.push_str("GT: 2A\n");
        out.push_str(&format!("TP: {}\n", outcome.tp as u8));
        out.push_str(&format!("PTY: {}\n", outcome.pty));
        out.push_str(&format!("A/B: {}\n", radiotext.ab as u8));
        out.push_str(&format!("RT: {}\n", quoted(&radiotext.text)));
    }

    out
}

fn quoted(field: &TextField) -> String {
    let text = field.text();
    let text = text.trim_end();
    if field.is_complete() {
        format!("\"{}\"", text)
    } else {
        format!("\"{}\" (incomplete)", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::Parser;

    fn encode_args(line: &[&str]) -> EncodeArgs {
        let args = Args::try_parse_from(line).expect("valid command line");
        match args.command {
            Command::Encode(encode) => encode,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_reference_report() {
        let args = encode_args(&[
            "rdstool", "encode", "--group", "0A", "--pi", "4660", "--pty", "5", "--tp", "1",
            "--ms", "0", "--ta", "1", "--af", "104.5,98.0", "--ps", "RadioXYZ",
        ]);
        let bits = pack(&field_set(&args).expect("complete")).to_string();
        let outcome = decode_str(&bits).expect("decodes");

        assert_eq!(
            "PI: 4660\nGT: 0A\nTP: 1\nPTY: 5\nTA: Active\nMS: Speech\nDI: 0\nAF: 104.5, 98.0\nPS: \"RadioXYZ\"\n",
            render(&outcome)
        );
    }

    #[test]
    fn test_radio_text_report() {
        let args = encode_args(&[
            "rdstool", "encode", "--group", "2A", "--pi", "4660", "--pty", "5", "--tp", "1",
            "--rt", "Now Playing Song Title by Artist", "--ab", "0",
        ]);
        let bits = pack(&field_set(&args).expect("complete")).to_string();
        let outcome = decode_str(&bits).expect("decodes");

        assert_eq!(
            "PI: 4660\nGT: 2A\nTP: 1\nPTY: 5\nA/B: 0\nRT: \"Now Playing Song Title by Artist\"\n",
            render(&outcome)
        );
    }

    #[test]
    fn test_partial_decode_is_marked() {
        let args = encode_args(&[
            "rdstool", "encode", "--group", "0A", "--pi", "4660", "--pty", "5", "--tp", "1",
            "--ms", "0", "--ta", "1", "--af", "104.5,98.0", "--ps", "RadioXYZ",
        ]);
        let bits = pack(&field_set(&args).expect("complete")).to_string();
        // first three of four groups
        let outcome = decode_str(&bits[..312]).expect("decodes");

        let report = render(&outcome);
        assert!(report.contains("PS: \"RadioX\" (incomplete)\n"), "{}", report);
    }
}
