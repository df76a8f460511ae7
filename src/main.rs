// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus CLI entrypoint.
//!
//! `format` and `render` run the pure text pipeline on a record read from a JSON file;
//! `history` and `stats` inspect a session store on disk.

use std::error::Error;
use std::fs;
use std::str::FromStr;

use serde::Deserialize;

use proteus::format::format_record;
use proteus::model::{Record, RecordKind, SessionId};
use proteus::query::{all_session_stats, overall_stats};
use proteus::render::{render_markdown, DisplayBlock};
use proteus::store::{SessionStore, WriteDurability};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} format <record.json>\n  {program} render <record.json>\n  {program} --store <dir> [--durable-writes] history <session-id>\n  {program} --store <dir> [--durable-writes] stats\n\nformat prints the record's canonical markdown; render prints its display blocks, one per\nline. Both read a JSON file with fields: kind (\"story\"|\"bug\"), role, action, benefit,\nbackground, additional_info, acceptance_criteria, technical_info.\n\nhistory lists a session's finalized entries, newest first. stats summarizes every session\nin the store.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    store_dir: Option<String>,
    durable_writes: bool,
    command: Vec<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--store" => {
                if options.store_dir.is_some() {
                    return Err(());
                }
                let dir = args.next().ok_or(())?;
                options.store_dir = Some(dir);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => options.command.push(arg),
        }
    }

    if options.command.is_empty() {
        return Err(());
    }

    Ok(options)
}

#[derive(Debug, Deserialize)]
struct RecordFileJson {
    kind: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    action: String,
    #[serde(default)]
    benefit: String,
    #[serde(default)]
    background: String,
    #[serde(default)]
    additional_info: String,
    #[serde(default)]
    acceptance_criteria: Vec<String>,
    #[serde(default)]
    technical_info: Vec<String>,
}

fn read_record(path: &str) -> Result<Record, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let json: RecordFileJson = serde_json::from_str(&contents)?;
    let kind = RecordKind::from_str(&json.kind)?;

    let mut record = Record::empty(kind);
    record.set_role(json.role);
    record.set_action(json.action);
    record.set_benefit(json.benefit);
    record.set_background(json.background);
    record.set_additional_info(json.additional_info);
    if !json.acceptance_criteria.is_empty() {
        *record.acceptance_criteria_mut() = json.acceptance_criteria;
    }
    if !json.technical_info.is_empty() {
        *record.technical_info_mut() = json.technical_info;
    }
    Ok(record)
}

fn describe_block(block: &DisplayBlock) -> String {
    match block {
        DisplayBlock::Heading(text) => format!("heading    | {text}"),
        DisplayBlock::LeadIn { bold, rest } => format!("lead-in    | {bold} |{rest}"),
        DisplayBlock::Paragraph(text) => format!("paragraph  | {text}"),
        DisplayBlock::BulletList(items) => format!("bullets    | {}", items.join(" | ")),
        DisplayBlock::OrderedList(items) => format!("ordered    | {}", items.join(" | ")),
        DisplayBlock::Spacer => "spacer     |".to_owned(),
    }
}

fn open_store(options: &CliOptions) -> Result<SessionStore, ()> {
    let Some(dir) = options.store_dir.as_deref() else {
        return Err(());
    };
    let mut store = SessionStore::new(dir);
    if options.durable_writes {
        store = store.with_durability(WriteDurability::Durable);
    }
    Ok(store)
}

fn format_timestamp(millis: Option<u64>) -> String {
    match millis {
        Some(millis) => format!("{millis}"),
        None => "-".to_owned(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "proteus".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        match options.command[0].as_str() {
            "format" => {
                let [_, path] = options.command.as_slice() else {
                    print_usage(&program);
                    std::process::exit(2);
                };
                let record = read_record(path)?;
                println!("{}", format_record(&record));
            }
            "render" => {
                let [_, path] = options.command.as_slice() else {
                    print_usage(&program);
                    std::process::exit(2);
                };
                let record = read_record(path)?;
                for block in render_markdown(&format_record(&record)) {
                    println!("{}", describe_block(&block));
                }
            }
            "history" => {
                let [_, raw_session] = options.command.as_slice() else {
                    print_usage(&program);
                    std::process::exit(2);
                };
                let Ok(store) = open_store(&options) else {
                    print_usage(&program);
                    std::process::exit(2);
                };
                let session_id = SessionId::new(raw_session.clone())?;
                for entry in store.list_history(&session_id)? {
                    println!(
                        "#{:08} [{}] created_at={}",
                        entry.entry_id.value(),
                        entry.record.kind(),
                        entry.created_at
                    );
                    for line in format_record(&entry.record).lines() {
                        println!("    {line}");
                    }
                }
            }
            "stats" => {
                let [_] = options.command.as_slice() else {
                    print_usage(&program);
                    std::process::exit(2);
                };
                let Ok(store) = open_store(&options) else {
                    print_usage(&program);
                    std::process::exit(2);
                };
                for stats in all_session_stats(&store)? {
                    println!(
                        "{}: drafts={} history={} first={} last={}",
                        stats.session_id,
                        stats.drafts,
                        stats.history_entries,
                        format_timestamp(stats.first_activity),
                        format_timestamp(stats.last_activity)
                    );
                }
                let overall = overall_stats(&store)?;
                println!(
                    "total: sessions={} drafts={} history={} first={} last={}",
                    overall.sessions,
                    overall.drafts,
                    overall.history_entries,
                    format_timestamp(overall.first_activity),
                    format_timestamp(overall.last_activity)
                );
            }
            _ => {
                print_usage(&program);
                std::process::exit(2);
            }
        }

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
