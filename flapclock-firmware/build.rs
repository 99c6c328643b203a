//! Build script for flapclock-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates clock.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const DAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];
const DAY_GROUPS: [&str; 5] = ["all", "daily", "weekdays", "weekend", "weekends"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate clock.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=clock.toml");

    let config_path = Path::new("clock.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: clock.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds clock.toml at build time.                   ║\n\
            ║  Please create one in the flapclock-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read clock.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in clock.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    validate_required_sections(&config);
    validate_clock(&config);
    validate_axes(&config);
    validate_quiet(&config);
    validate_time(&config);

    println!("cargo:warning=clock.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abort the build listing every error under `title`
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn validate_required_sections(config: &toml::Value) {
    let mut errors = Vec::new();

    if config.get("clock").is_none() {
        errors.push("Missing [clock] section".to_string());
    }
    let axes = config.get("axis").and_then(|a| a.as_table());
    for name in ["minutes", "hours"] {
        if axes.and_then(|t| t.get(name)).is_none() {
            errors.push(format!("Missing [axis.{}] section", name));
        }
    }
    if let Some(table) = config.as_table() {
        for key in table.keys() {
            if !["clock", "axis", "quiet", "time"].contains(&key.as_str()) {
                errors.push(format!("Unknown section [{}]", key));
            }
        }
    }

    report("Missing or unknown sections in clock.toml", &errors);
}

fn validate_clock(config: &toml::Value) {
    let Some(clock) = config.get("clock").and_then(|c| c.as_table()) else {
        return;
    };
    let mut errors = Vec::new();

    if let Some(display) = clock.get("display") {
        match display.as_str() {
            Some("12h" | "12" | "24h" | "24") => {}
            _ => errors.push("[clock] display must be \"12h\" or \"24h\"".to_string()),
        }
    }
    if let Some(offset) = clock.get("utc_offset_minutes") {
        match offset.as_integer() {
            Some(-720..=840) => {}
            _ => errors.push("[clock] utc_offset_minutes must be -720..=840".to_string()),
        }
    }
    if let Some(timeout) = clock.get("homing_timeout_ms") {
        match timeout.as_integer() {
            Some(1..=600_000) => {}
            _ => errors.push("[clock] homing_timeout_ms must be 1-600000".to_string()),
        }
    }
    if let Some(retries) = clock.get("align_retries") {
        match retries.as_integer() {
            Some(0..=255) => {}
            _ => errors.push("[clock] align_retries must be 0-255".to_string()),
        }
    }
    if let Some(dst) = clock.get("dst") {
        if dst.as_bool().is_none() {
            errors.push("[clock] dst must be true or false".to_string());
        }
    }

    report("Invalid [clock] configuration", &errors);
}

fn validate_axes(config: &toml::Value) {
    let Some(axes) = config.get("axis").and_then(|a| a.as_table()) else {
        return;
    };
    let mut errors = Vec::new();

    for (name, axis) in axes {
        if name != "minutes" && name != "hours" {
            errors.push(format!("[axis.{}] unknown axis", name));
            continue;
        }
        let Some(axis) = axis.as_table() else {
            errors.push(format!("[axis.{}] must be a table", name));
            continue;
        };

        if let Some(spf) = axis.get("steps_per_flap") {
            let value = spf.as_float().or(spf.as_integer().map(|i| i as f64));
            match value {
                Some(v) if v.is_finite() && v >= 1.0 => {}
                _ => errors.push(format!("[axis.{}] steps_per_flap must be >= 1", name)),
            }
        }
        for key in ["speed", "homing_speed"] {
            if let Some(speed) = axis.get(key) {
                match speed.as_integer() {
                    Some(1..=65_535) => {}
                    _ => errors.push(format!("[axis.{}] {} must be 1-65535", name, key)),
                }
            }
        }
        for key in ["reversed", "endstop_active_low"] {
            if let Some(flag) = axis.get(key) {
                if flag.as_bool().is_none() {
                    errors.push(format!("[axis.{}] {} must be true or false", name, key));
                }
            }
        }
    }

    report("Invalid [axis.*] configuration", &errors);
}

fn validate_quiet(config: &toml::Value) {
    let Some(quiet) = config.get("quiet").and_then(|q| q.as_table()) else {
        return;
    };
    let mut errors = Vec::new();
    let mut schedules = 0;

    for (name, value) in quiet {
        if name == "enabled" {
            if value.as_bool().is_none() {
                errors.push("[quiet] enabled must be true or false".to_string());
            }
            continue;
        }
        let Some(schedule) = value.as_table() else {
            errors.push(format!("[quiet] unknown key '{}'", name));
            continue;
        };
        schedules += 1;

        if name.len() > 16 {
            errors.push(format!("[quiet.{}] label longer than 16 chars", name));
        }
        for key in ["start", "end"] {
            match schedule.get(key).and_then(|v| v.as_integer()) {
                Some(0..=23) => {}
                Some(_) => errors.push(format!("[quiet.{}] {} must be 0-23", name, key)),
                None => errors.push(format!("[quiet.{}] missing '{}'", name, key)),
            }
        }
        match schedule.get("days") {
            None => {}
            Some(toml::Value::String(group)) => {
                if !DAY_GROUPS.contains(&group.as_str()) {
                    errors.push(format!("[quiet.{}] unknown day group '{}'", name, group));
                }
            }
            Some(toml::Value::Array(days)) => {
                for day in days {
                    if !day.as_str().is_some_and(is_day_name) {
                        errors.push(format!("[quiet.{}] unknown day {}", name, day));
                    }
                }
            }
            Some(_) => errors.push(format!("[quiet.{}] days must be a list or group", name)),
        }
    }

    if schedules > 4 {
        errors.push(format!("{} quiet schedules, at most 4 allowed", schedules));
    }

    report("Invalid [quiet] configuration", &errors);
}

fn validate_time(config: &toml::Value) {
    let Some(time) = config.get("time").and_then(|t| t.as_table()) else {
        return;
    };
    let mut errors = Vec::new();

    match time.get("hour").and_then(|v| v.as_integer()) {
        Some(0..=23) => {}
        Some(_) => errors.push("[time] hour must be 0-23".to_string()),
        None => errors.push("[time] missing 'hour'".to_string()),
    }
    match time.get("minute").and_then(|v| v.as_integer()) {
        Some(0..=59) => {}
        Some(_) => errors.push("[time] minute must be 0-59".to_string()),
        None => errors.push("[time] missing 'minute'".to_string()),
    }
    if let Some(day) = time.get("weekday") {
        if !day.as_str().is_some_and(is_day_name) {
            errors.push(format!("[time] unknown weekday {}", day));
        }
    }

    report("Invalid [time] configuration", &errors);
}

/// Day names match on their first three letters, any case
fn is_day_name(name: &str) -> bool {
    let name = name.trim().to_ascii_lowercase();
    name.get(..3).is_some_and(|prefix| DAY_NAMES.contains(&prefix))
}
