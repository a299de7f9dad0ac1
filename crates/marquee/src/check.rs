// SPDX-FileCopyrightText: 2026 Marquee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `marquee check` command implementation.
//!
//! Reads the rotation and ad template files the way `serve` would, without
//! writing anything, and reports what it found.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use marquee_config::MarqueeConfig;
use marquee_core::MarqueeError;
use marquee_storage::files;
use serde::Serialize;

/// State of the ad template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdsStatus {
    Ok,
    /// Defaults will be written on the next `serve`.
    Missing,
    /// Defaults will replace it on the next `serve`.
    Unreadable,
}

/// Structured check output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub sign: String,
    pub rotation_path: String,
    pub rotation_entries: usize,
    /// Entry counts keyed by wire type code.
    pub rotation_by_type: BTreeMap<String, usize>,
    pub rotation_modified: Option<String>,
    pub ads_path: String,
    pub ads_status: AdsStatus,
    pub ad_templates: usize,
    pub serial_device: Option<String>,
    pub gateway: Option<String>,
    /// Rotation texts, newest first.
    pub entries: Vec<String>,
}

/// Last modification time of `path` as RFC 3339, if it exists.
fn modified_at(path: &Path) -> Option<String> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Utc>::from(modified).to_rfc3339_opts(SecondsFormat::Secs, true))
}

pub fn build_report(config: &MarqueeConfig) -> Result<CheckReport, MarqueeError> {
    let rotation_path = config.storage.rotation_path();
    let rotation = files::read_rotation(&rotation_path)?;

    let mut rotation_by_type = BTreeMap::new();
    for entry in &rotation {
        *rotation_by_type
            .entry(entry.type_code().to_string())
            .or_insert(0) += 1;
    }

    let ads_path = config.storage.ads_path();
    let (ads_status, ad_templates) = match std::fs::read_to_string(&ads_path) {
        Ok(text) => match files::decode_ads(&text) {
            Ok(ads) => (AdsStatus::Ok, ads.len()),
            Err(_) => (AdsStatus::Unreadable, 0),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (AdsStatus::Missing, 0),
        Err(e) => return Err(e.into()),
    };

    Ok(CheckReport {
        sign: config.sign.name.clone(),
        rotation_path: rotation_path.display().to_string(),
        rotation_entries: rotation.len(),
        rotation_by_type,
        rotation_modified: modified_at(&rotation_path),
        ads_path: ads_path.display().to_string(),
        ads_status,
        ad_templates,
        serial_device: config.serial.device.clone(),
        gateway: config
            .gateway
            .enabled
            .then(|| format!("{}:{}", config.gateway.host, config.gateway.port)),
        entries: rotation.iter().map(|e| e.text().to_string()).collect(),
    })
}

/// Run the `marquee check` command.
pub fn run_check(config: &MarqueeConfig, json: bool) -> Result<(), MarqueeError> {
    let report = build_report(config)?;

    if json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| MarqueeError::codec(e.to_string()))?;
        println!("{text}");
        return Ok(());
    }

    println!();
    println!("  marquee check ({})", report.sign);
    println!("  {}", "-".repeat(50));
    println!("  rotation   {}", report.rotation_path);
    println!(
        "             {} entries, last written {}",
        report.rotation_entries,
        report.rotation_modified.as_deref().unwrap_or("never")
    );
    for (code, count) in &report.rotation_by_type {
        println!("             type {code}: {count}");
    }
    println!("  ads        {}", report.ads_path);
    match report.ads_status {
        AdsStatus::Ok => println!("             {} templates", report.ad_templates),
        AdsStatus::Missing => println!("             missing, defaults will be written"),
        AdsStatus::Unreadable => println!("             unreadable, defaults will be used"),
    }
    println!(
        "  serial     {}",
        report.serial_device.as_deref().unwrap_or("none (simulated)")
    );
    println!(
        "  gateway    {}",
        report.gateway.as_deref().unwrap_or("disabled")
    );
    if !report.entries.is_empty() {
        println!();
        for (i, text) in report.entries.iter().enumerate() {
            println!("  {i:>4}  {text}");
        }
    }
    println!();
    Ok(())
}
