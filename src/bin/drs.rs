use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use colored::*;
use drs_validator::decoder::{decode_response, has_decoder, DecodedValues};
use drs_validator::frame::{crc16, decode_hex, encode_hex, validate_frame, HEADER_LEN, TRAILER_LEN};
use drs_validator::set_commands::{single_channel_frequency, ChannelFrequency};
use drs_validator::{
    BatchOrchestrator, BatchResult, CommandRegistry, CommandStatus, ConsoleSink, DeviceRole, Mode,
    OverallStatus, ProgressSink, ValidatorConfig,
};

const DEFAULT_TARGET: &str = "192.168.1.100";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("drs")
        .version("0.1.0")
        .author("RF Field Engineering Team")
        .about("📡 DRS Validator - batch command validation for DRS Master/Remote units")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["json", "table", "compact"])
                .default_value("table")
                .global(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Stream progress and debug logs")
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("validate")
                .about("🧪 Run a command batch against a unit")
                .arg(
                    Arg::with_name("target")
                        .short("t")
                        .long("target")
                        .value_name("IP")
                        .help("Unit IPv4 address")
                        .takes_value(true)
                        .default_value(DEFAULT_TARGET),
                )
                .arg(
                    Arg::with_name("role")
                        .short("r")
                        .long("role")
                        .value_name("ROLE")
                        .help("Command category (master or remote)")
                        .takes_value(true)
                        .default_value("master"),
                )
                .arg(
                    Arg::with_name("mode")
                        .short("m")
                        .long("mode")
                        .value_name("MODE")
                        .help("Canned responses or a real unit")
                        .takes_value(true)
                        .possible_values(&["mock", "live"])
                        .default_value("mock"),
                )
                .arg(
                    Arg::with_name("commands")
                        .short("c")
                        .long("commands")
                        .value_name("LIST")
                        .help("Comma-separated command names (default: every command for the role)")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("timeout")
                        .long("timeout")
                        .value_name("SECONDS")
                        .help("Per-command timeout")
                        .takes_value(true)
                        .validator(|v| match v.parse::<u64>() {
                            Ok(s) if s > 0 => Ok(()),
                            _ => Err("Timeout must be a positive number of seconds".into()),
                        }),
                )
                .arg(
                    Arg::with_name("port")
                        .short("p")
                        .long("port")
                        .value_name("PORT")
                        .help("Device TCP port")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("config")
                        .long("config")
                        .value_name("FILE")
                        .help("JSON configuration file")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("commands")
                .about("📋 List registered commands")
                .arg(
                    Arg::with_name("role")
                        .short("r")
                        .long("role")
                        .value_name("ROLE")
                        .help("Only this role")
                        .takes_value(true)
                        .possible_values(&["master", "remote"]),
                ),
        )
        .subcommand(
            SubCommand::with_name("frame")
                .about("🔍 Show and check a request frame")
                .arg(
                    Arg::with_name("command")
                        .value_name("COMMAND")
                        .help("Registered command name")
                        .index(1)
                        .required_unless_one(&["hex", "channel"]),
                )
                .arg(
                    Arg::with_name("role")
                        .short("r")
                        .long("role")
                        .value_name("ROLE")
                        .takes_value(true)
                        .possible_values(&["master", "remote"])
                        .default_value("master"),
                )
                .arg(
                    Arg::with_name("hex")
                        .long("hex")
                        .value_name("HEX")
                        .help("Inspect an arbitrary frame")
                        .takes_value(true)
                        .conflicts_with("command"),
                )
                .arg(
                    Arg::with_name("channel")
                        .long("channel")
                        .value_name("INDEX")
                        .help("Build a single-channel frequency frame for channel 0-15")
                        .takes_value(true)
                        .requires("mhz")
                        .conflicts_with_all(&["command", "hex"]),
                )
                .arg(
                    Arg::with_name("mhz")
                        .long("mhz")
                        .value_name("MHZ")
                        .help("Channel frequency in MHz")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("decode")
                .about("🧮 Decode a captured response")
                .arg(Arg::with_name("command").value_name("COMMAND").index(1).required(true))
                .arg(Arg::with_name("response").value_name("HEX").index(2).required(true)),
        )
        .get_matches();

    let format = matches.value_of("format").unwrap_or("table");
    let verbose = matches.is_present("verbose");

    if verbose {
        tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();
    } else {
        tracing_subscriber::fmt().with_max_level(tracing::Level::WARN).init();
    }

    match matches.subcommand() {
        ("validate", Some(sub)) => handle_validate(sub, format, verbose).await?,
        ("commands", Some(sub)) => handle_commands(sub, format)?,
        ("frame", Some(sub)) => handle_frame(sub, format)?,
        ("decode", Some(sub)) => handle_decode(sub, format)?,
        _ => println!("{}", "No command specified. Use --help for usage information.".yellow()),
    }

    Ok(())
}

async fn handle_validate(matches: &ArgMatches<'_>, format: &str, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match matches.value_of("config") {
        Some(path) => ValidatorConfig::load(path)?,
        None => ValidatorConfig::default(),
    };
    if let Some(port) = matches.value_of("port") {
        config.port = port.parse()?;
    }
    if let Some(timeout) = matches.value_of("timeout") {
        config.timeout_seconds = timeout.parse()?;
    }
    config.validate()?;

    let target = matches.value_of("target").unwrap_or(DEFAULT_TARGET);
    let role = matches.value_of("role").unwrap_or("master");
    let mode = matches.value_of("mode").and_then(Mode::parse).unwrap_or(Mode::Mock);
    let selected: Option<Vec<String>> = matches.value_of("commands").map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    });

    if verbose {
        println!("{}", "📡 DRS Validator".bright_blue().bold());
        println!("{} {} ({} mode, port {})", "Target".dimmed(), target, mode, config.port);
    }

    let orchestrator = BatchOrchestrator::from_config(config);
    let console = ConsoleSink { show_debug: verbose };
    let sink: Option<&dyn ProgressSink> = if verbose && format != "json" { Some(&console) } else { None };

    let result = orchestrator
        .run_batch(target, role, mode, selected.as_deref(), None, sink)
        .await;

    print_batch(&result, format)?;

    if result.overall_status != OverallStatus::Pass {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_commands(matches: &ArgMatches<'_>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let registry = CommandRegistry::global();
    let roles: Vec<DeviceRole> = match matches.value_of("role").and_then(DeviceRole::parse) {
        Some(role) => vec![role],
        None => vec![DeviceRole::Master, DeviceRole::Remote],
    };

    if format == "json" {
        let catalogue: serde_json::Map<String, serde_json::Value> = roles
            .iter()
            .map(|role| {
                let defs: Vec<_> = registry.role_commands(*role).collect();
                Ok((role.to_string(), serde_json::to_value(defs)?))
            })
            .collect::<Result<_, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&catalogue)?);
        return Ok(());
    }

    for role in roles {
        println!(
            "{} {} ({} commands)",
            "▶".bright_blue(),
            role.as_str().to_uppercase().bright_white().bold(),
            registry.role_size(role)
        );
        for def in registry.role_commands(role) {
            if format == "compact" {
                println!("  {}", def.name);
                continue;
            }
            let kind = if def.is_set_command { "SET".yellow() } else { "GET".cyan() };
            let decoder = if has_decoder(def.name) { "✓".green() } else { "-".dimmed() };
            println!(
                "  {:<40} {:<4} 0x{:02X}  {} {}",
                def.name,
                kind,
                def.opcode,
                decoder,
                def.frame_hex.dimmed()
            );
        }
    }
    Ok(())
}

fn handle_frame(matches: &ArgMatches<'_>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (label, hex) = if let Some(hex) = matches.value_of("hex") {
        ("custom".to_string(), hex.trim().to_uppercase())
    } else if let Some(channel) = matches.value_of("channel") {
        let channel: usize = channel.parse()?;
        let mhz: f64 = matches.value_of("mhz").unwrap_or("0").parse()?;
        let frequency = ChannelFrequency::from_hz((mhz * 1_000_000.0).round() as u64);
        let frame = single_channel_frequency(channel, frequency)?;
        (format!("single_channel_frequency[{}]", channel), frame.to_hex())
    } else {
        let name = matches.value_of("command").unwrap_or_default();
        let role = matches
            .value_of("role")
            .and_then(DeviceRole::parse)
            .unwrap_or(DeviceRole::Master);
        let def = CommandRegistry::global()
            .resolve(role, name)
            .ok_or_else(|| format!("unknown command '{}' for {}", name, role))?;
        (def.name.to_string(), def.frame_hex.clone())
    };

    let valid = validate_frame(&hex);
    let bytes = decode_hex(&hex)?;
    let recomputed = if bytes.len() >= HEADER_LEN + TRAILER_LEN {
        Some(crc16(&bytes[1..bytes.len() - TRAILER_LEN]))
    } else {
        None
    };

    match format {
        "json" => {
            let report = serde_json::json!({
                "command": label,
                "frame_hex": hex,
                "hex_length": hex.len(),
                "valid": valid,
                "checksum": recomputed.map(|crc| encode_hex(&crc.to_le_bytes())),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "compact" => println!("{}", hex),
        _ => {
            println!("{} {}", "Command:".dimmed(), label.bright_white());
            println!("{} {} ({} chars)", "Frame:  ".dimmed(), hex.bright_cyan(), hex.len());
            let verdict = if valid { "valid".green() } else { "invalid".red() };
            println!("{} {}", "Format: ".dimmed(), verdict);
            if let Some(crc) = recomputed {
                println!("{} {}", "CRC:    ".dimmed(), encode_hex(&crc.to_le_bytes()));
            }
        }
    }
    Ok(())
}

fn handle_decode(matches: &ArgMatches<'_>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let command = matches.value_of("command").unwrap_or_default();
    let response = decode_hex(matches.value_of("response").unwrap_or_default())?;
    let values = decode_response(command, &response);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&values)?),
        "compact" => println!("{}", compact_values(&values)),
        _ => {
            println!("{} {}", "Command:".dimmed(), command.bright_white());
            for (key, value) in &values {
                println!("  {:<28} {}", key, value.to_string().bright_cyan());
            }
        }
    }
    Ok(())
}

fn print_batch(result: &BatchResult, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let stats = &result.statistics;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(result)?),
        "compact" => {
            println!(
                "{} {}/{} passed ({:.1}%)",
                colored_overall(result.overall_status),
                stats.passed,
                stats.total,
                stats.success_rate_percent
            );
        }
        _ => {
            println!(
                "{}",
                "┌──────────────────────────────────────────┬─────────┬──────────┐".bright_white()
            );
            println!(
                "{}",
                "│ Command                                  │ Status  │ Time ms  │".bright_white()
            );
            println!(
                "{}",
                "├──────────────────────────────────────────┼─────────┼──────────┤".bright_white()
            );
            for r in &result.results {
                println!(
                    "│ {:<40} │ {} │ {:>8.1} │",
                    r.command,
                    colored_status(r.status),
                    r.duration_millis
                );
                if let Some(detail) = &r.error_detail {
                    println!("│   {:<38} │         │          │", truncate(detail, 38).dimmed());
                } else if !r.decoded_values.is_empty() {
                    println!("│   {:<38} │         │          │", truncate(&compact_values(&r.decoded_values), 38).dimmed());
                }
            }
            println!(
                "{}",
                "└──────────────────────────────────────────┴─────────┴──────────┘".bright_white()
            );
            println!(
                "{} {} | {}/{} passed ({:.1}%) | {} failed | {} timeout | {} error | {} {} | {:.0} ms",
                "Result:".bold(),
                colored_overall(result.overall_status),
                stats.passed,
                stats.total,
                stats.success_rate_percent,
                stats.failed,
                stats.timed_out,
                stats.errored,
                result.command_category,
                result.mode,
                result.duration_millis
            );
            if let Some(error) = &result.error {
                println!("{} {}", "❌".red(), error.bright_red());
            }
        }
    }
    Ok(())
}

fn colored_status(status: CommandStatus) -> ColoredString {
    let padded = format!("{:<7}", status.as_str());
    match status {
        CommandStatus::Pass => padded.green(),
        CommandStatus::Fail => padded.red(),
        CommandStatus::Timeout => padded.yellow(),
        CommandStatus::Error => padded.bright_red(),
    }
}

fn colored_overall(status: OverallStatus) -> ColoredString {
    match status {
        OverallStatus::Pass => "✅ PASS".bright_green().bold(),
        OverallStatus::Fail => "❌ FAIL".bright_red().bold(),
        OverallStatus::Error => "⚠️  ERROR".yellow().bold(),
    }
}

fn compact_values(values: &DecodedValues) -> String {
    values
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "decoder" | "command_hex" | "frame_length" | "body_length"))
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
