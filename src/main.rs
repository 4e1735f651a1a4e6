//! limitcalc - limiter threshold calculator.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use limitcalc::binding::{
    parse_number, render_output, FormValues, FIELD_AMPLI, FIELD_BAFFLE, FIELD_GAIN, FIELD_HP,
    FIELD_IMPEDANCE, FIELD_LIMITER,
};
use limitcalc::catalog::{amplifier_gain, Catalog, Limiter};
use limitcalc::config::{Locale, ThresholdConstants};
use limitcalc::converter::{speed_of_sound, Conversion};
use limitcalc::engine::{breakdown, compute, LimiterType};
use limitcalc::format::display_float;
use limitcalc::serial_date::{format_serial, DateToken};
use limitcalc::LimitCalcError;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use unicode_width::UnicodeWidthStr;

#[derive(Parser, Debug)]
#[command(name = "limitcalc")]
#[command(about = "Limiter threshold calculator for amplifier and loudspeaker protection", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable logging to specified file
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Decimal separator used for displayed numbers
    #[arg(long, global = true, default_value_t = '.')]
    decimal: char,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a limiter threshold from raw values
    Limit {
        /// Driver power rating (W)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        hp: String,
        /// Load impedance (ohm)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        impedance: String,
        /// Amplifier power rating (W)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        ampli: String,
        /// Amplifier gain (dB)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        gain: String,
        /// Baffle type ("ouverte" for open, anything else is sealed)
        #[arg(long, default_value = "")]
        baffle: String,
        /// Limiter type: "dBu", "T.Racks DS2/4", "DCX2496 SUB" or "DCX2496 Top"
        #[arg(long, default_value = "dBu")]
        limiter: String,
        /// Query string overriding the values above, e.g. "?hp=100&gain=26"
        #[arg(long)]
        query: Option<String>,
        /// Print every intermediate threshold
        #[arg(long)]
        breakdown: bool,
    },

    /// Compute the threshold of a catalog speaker on a catalog amplifier
    Pair {
        /// Amplifier catalog (JSON)
        #[arg(long)]
        amplifiers: PathBuf,
        /// Speaker catalog (JSON)
        #[arg(long)]
        speakers: PathBuf,
        /// Amplifier reference
        #[arg(long)]
        amplifier: String,
        /// Speaker reference
        #[arg(long)]
        speaker: String,
        /// Working load (ohm)
        #[arg(long)]
        load: u32,
        /// Use raw ratings without baffle and amplifier divisors
        #[arg(long)]
        no_smart: bool,
    },

    /// List catalog entries
    List {
        /// Amplifier catalog (JSON)
        #[arg(long)]
        amplifiers: PathBuf,
        /// Speaker catalog (JSON)
        #[arg(long)]
        speakers: PathBuf,
    },

    /// Compute amplifier gain from measured voltages
    Gain {
        /// Input RMS voltage (V)
        #[arg(long)]
        vin: String,
        /// Output RMS voltage (V)
        #[arg(long)]
        vout: String,
    },

    /// Convert between frequency, wavelength and travel time in air
    Convert {
        /// Air temperature (degrees Celsius)
        #[arg(long, default_value = "20", allow_hyphen_values = true)]
        temperature: String,
        /// Distance or wavelength (m)
        #[arg(long)]
        distance: Option<String>,
        /// Travel time or period (s)
        #[arg(long)]
        time: Option<String>,
        /// Frequency (Hz)
        #[arg(long)]
        frequency: Option<String>,
    },

    /// Decode a spreadsheet date serial
    Date {
        /// Date serial (days since 1900)
        #[arg(long, allow_hyphen_values = true)]
        serial: String,
        /// Packed format codes, comma separated
        #[arg(long, value_delimiter = ',', default_value = "7,33,3,33,11")]
        codes: Vec<i32>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging if --log option is provided
    if let Some(log_path) = &args.log {
        let file = std::fs::File::create(log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        // RUST_LOG narrows the file log; everything down to debug otherwise
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!("Starting limitcalc");
    }

    let mut locale = Locale::with_decimal(args.decimal);
    if args.decimal == locale.thousands {
        locale.thousands = '.';
    }

    let res = run(args.command, &locale);

    if args.log.is_some() {
        tracing::info!("limitcalc exited");
    }

    res
}

fn run(command: Command, locale: &Locale) -> Result<()> {
    match command {
        Command::Limit {
            hp,
            impedance,
            ampli,
            gain,
            baffle,
            limiter,
            query,
            breakdown: show_breakdown,
        } => {
            let mut form = FormValues::new()
                .with(FIELD_LIMITER, limiter)
                .with(FIELD_BAFFLE, baffle)
                .with(FIELD_HP, hp)
                .with(FIELD_IMPEDANCE, impedance)
                .with(FIELD_AMPLI, ampli)
                .with(FIELD_GAIN, gain);
            if let Some(query) = query {
                form.prefill(&query);
            }
            let input = form.to_input();
            tracing::debug!(?input, "Computing threshold");

            if show_breakdown {
                let b = breakdown(&input, &ThresholdConstants::default());
                let rows = [
                    ("driver (open)", b.driver_open),
                    ("driver (sealed)", b.driver_sealed),
                    ("amplifier", b.amplifier),
                    ("dBu limit", b.dbu_limit),
                    ("DCX2496 sub (unrounded)", b.sub),
                    ("DCX2496 top (unrounded)", b.top),
                    ("dBu", b.limit_dbu),
                    ("T.Racks DS2/4", b.limit_t_racks),
                    ("DCX2496 SUB", b.limit_dcx2496_sub),
                    ("DCX2496 Top", b.limit_dcx2496_top),
                ];
                let rows: Vec<(String, String)> = rows
                    .iter()
                    .map(|(label, value)| (label.to_string(), display_float(*value, locale)))
                    .collect();
                print_table(&rows);
            }

            let (value, unit) = render_output(&compute(&input), locale);
            println!("{}{}", value, unit);
        },

        Command::Pair {
            amplifiers,
            speakers,
            amplifier,
            speaker,
            load,
            no_smart,
        } => {
            let catalog = Catalog::load(&amplifiers, &speakers)?;
            let limiter = Limiter::for_pair(
                catalog.speaker(&speaker)?,
                catalog.amplifier(&amplifier)?,
                load,
            )?;
            let report = limiter.threshold(!no_smart);
            tracing::debug!(?report, "Pair threshold");

            let mut rows = vec![
                (
                    "speaker voltage".to_string(),
                    format!("{} V", display_float(report.speaker_voltage, locale)),
                ),
                (
                    "amplifier voltage".to_string(),
                    format!("{} V", display_float(report.amplifier_voltage, locale)),
                ),
                (
                    "threshold".to_string(),
                    format!("{} dBu", display_float(report.threshold, locale)),
                ),
            ];
            if !no_smart {
                for limiter_type in [
                    LimiterType::TRacksDs24,
                    LimiterType::Dcx2496Sub,
                    LimiterType::Dcx2496Top,
                ] {
                    let label = limiter_type.to_string();
                    let (value, unit) =
                        render_output(&compute(&limiter.calculation_input(limiter_type)), locale);
                    rows.push((label, format!("{}{}", value, unit)));
                }
            }
            print_table(&rows);
        },

        Command::List {
            amplifiers,
            speakers,
        } => {
            let catalog = Catalog::load(&amplifiers, &speakers)?;
            let mut rows = Vec::new();
            for amp in &catalog.amplifiers {
                let ratings: Vec<String> = [(8, "8"), (4, "4"), (2, "2")]
                    .iter()
                    .filter_map(|(load, name)| {
                        amp.power.at(*load).map(|w| format!("{}W@{}\u{2126}", w, name))
                    })
                    .collect();
                rows.push((
                    amp.reference.clone(),
                    format!("amplifier  {} dB  {}", amp.gain, ratings.join(" ")),
                ));
            }
            for spk in &catalog.speakers {
                rows.push((
                    spk.reference.clone(),
                    format!(
                        "speaker    {}W  {}\u{2126}  {}  {}",
                        spk.power, spk.impedance, spk.baffle, spk.response
                    ),
                ));
            }
            print_table(&rows);
        },

        Command::Gain { vin, vout } => {
            let vin = parse_number(&vin);
            let vout = parse_number(&vout);
            if vin <= 0.0 || vout <= 0.0 {
                return Err(LimitCalcError::invalid_argument("voltages must be positive").into());
            }
            println!("{} dB", display_float(amplifier_gain(vin, vout), locale));
        },

        Command::Convert {
            temperature,
            distance,
            time,
            frequency,
        } => {
            let c = speed_of_sound(parse_number(&temperature));
            let conversion = match (distance, time, frequency) {
                (Some(d), None, None) => Conversion::from_distance(parse_number(&d), c),
                (None, Some(t), None) => Conversion::from_time(parse_number(&t), c),
                (None, None, Some(f)) => Conversion::from_frequency(parse_number(&f), c),
                _ => {
                    return Err(LimitCalcError::invalid_argument(
                        "give exactly one of --distance, --time or --frequency",
                    )
                    .into())
                },
            };
            tracing::debug!(?conversion, "Converted");

            let mut rows = vec![(
                "speed of sound".to_string(),
                format!("{} m/s", display_float(c, locale)),
            )];
            if let Some(conv) = conversion {
                rows.push((
                    "frequency".to_string(),
                    format!("{} Hz", display_float(conv.frequency, locale)),
                ));
                rows.push((
                    "distance".to_string(),
                    format!("{} m", display_float(conv.distance, locale)),
                ));
                rows.push((
                    "time".to_string(),
                    format!("{} s", display_float(conv.time, locale)),
                ));
            }
            print_table(&rows);
        },

        Command::Date { serial, codes } => {
            let tokens = DateToken::decode(&codes, locale);
            println!("{}", format_serial(&tokens, parse_number(&serial), locale));
        },
    }
    Ok(())
}

/// Print label/value rows with labels padded to a common display width.
fn print_table(rows: &[(String, String)]) {
    let width = rows.iter().map(|(label, _)| label.width()).max().unwrap_or(0);
    for (label, value) in rows {
        let padding = " ".repeat(width - label.width());
        println!("{}{}  {}", label, padding, value);
    }
}
