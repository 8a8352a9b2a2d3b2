use bmff::{
    BmffBox, BoxValue, FourCC, NodeKind, ParseOptions, Registry,
    api::{parse_file_with, to_json_box},
    default_registry, find_path,
    util::{hex_dump, read_slice},
};
use clap::{Parser, ValueEnum};
use log::{debug, error, info};
use std::fs::File;

#[derive(Parser, Debug)]
#[command(version, about = "ISO-BMFF box tree explorer")]
struct Args {
    /// MP4/ISOBMFF file path
    path: String,

    /// Only print the subtree at a dotted path (e.g. moov.trak.mdia.minf)
    #[arg(long = "filter")]
    filter: Option<String>,

    /// Hex-dump the payload of every box with this 4CC (e.g. --raw hdlr)
    #[arg(long = "raw")]
    raw: Option<String>,

    /// Deepest box nesting accepted while parsing
    #[arg(long, default_value_t = 64)]
    max_depth: usize,

    /// Bytes to dump with --raw (0 means entire payload)
    #[arg(long, default_value_t = 0)]
    bytes: usize,

    /// Emit JSON instead of human-readable tree
    #[arg(long)]
    json: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    loglevel: LogLevel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut env_builder = env_logger::Builder::from_default_env();
    env_builder.filter_level(args.loglevel.to_level_filter());
    env_builder.format_timestamp_secs();
    env_builder.try_init()?;

    let reg = default_registry()?;
    let opts = ParseOptions {
        max_depth: args.max_depth,
    };

    let file_len = std::fs::metadata(&args.path)
        .inspect_err(|e| error!("{}: {e}", args.path))?
        .len();
    info!("parsing {} ({} bytes)", args.path, file_len);
    let top = match parse_file_with(&args.path, &reg, opts) {
        Ok(top) => top,
        Err(e) => {
            error!("{}: {e}", args.path);
            return Err(e);
        }
    };
    info!("{} top-level boxes", top.len());
    for (depth, b) in top.iter().flat_map(|b| b.walk()) {
        debug!(
            "{:depth$}{} at {:#x}: declared {} actual {}",
            "",
            b.hdr.typ,
            b.hdr.start,
            b.hdr.size,
            b.actual_size,
            depth = depth * 2
        );
    }

    let targets: Vec<&BmffBox> = match &args.filter {
        Some(path) => find_path(&top, path).into_iter().collect(),
        None => top.iter().collect(),
    };

    if args.json {
        let json: Vec<_> = targets.iter().map(|b| to_json_box(b, &reg)).collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    for b in &targets {
        print_box(b, &reg);
    }

    if let Some(sel) = args.raw.as_ref() {
        dump_raw(&args.path, &top, sel, args.bytes)?;
    }

    Ok(())
}

// ---------- Human-readable tree ----------

fn print_box(root: &BmffBox, reg: &Registry) {
    for (depth, b) in root.walk() {
        let indent = "  ".repeat(depth);
        let hdr = &b.hdr;
        let name = reg.resolve(&hdr.typ).full_name();
        let tag = match &b.kind {
            NodeKind::Container { .. } => " (container)",
            NodeKind::Unknown { .. } => " (unknown)",
            NodeKind::Leaf { .. } => "",
        };
        println!(
            "{indent}{:>8} {:>10} {} {name}{tag}",
            format!("{:#x}", hdr.start),
            hdr.size,
            hdr.typ,
        );
        if let Some(v) = b.value() {
            println!("{indent}         -> {}", summarize(v));
        }
    }
}

fn summarize(v: &BoxValue) -> String {
    match v {
        BoxValue::FileType {
            major_brand,
            minor_version,
            compatible_brands,
        } => format!(
            "major={} minor={} compatible={:?}",
            major_brand, minor_version, compatible_brands
        ),
        BoxValue::MediaHeader {
            version,
            timescale,
            duration,
            language,
            ..
        } => format!(
            "version={} timescale={} duration={} language={}",
            version, timescale, duration, language
        ),
        BoxValue::Handler {
            handler_type, name, ..
        } => format!("handler={} name=\"{}\" ({})", handler_type, name, name.encoding_name()),
        BoxValue::EditList {
            version, entries, ..
        } => match entries.first() {
            Some(e) => format!(
                "version={} entries={} first: duration={} media_time={} rate={}/{}",
                version,
                entries.len(),
                e.segment_duration,
                e.media_time,
                e.media_rate_integer,
                e.media_rate_fraction
            ),
            None => format!("version={} entries=0", version),
        },
    }
}

// ---------- Raw dump ----------

fn dump_raw(path: &str, boxes: &[BmffBox], sel: &str, limit: usize) -> anyhow::Result<()> {
    let Some(want) = FourCC::new(sel.as_bytes()) else {
        anyhow::bail!("--raw expects a four-character code, got {sel:?}");
    };

    let mut f = File::open(path)?;
    let matches = boxes
        .iter()
        .flat_map(|b| b.walk())
        .filter(|(_, b)| b.hdr.typ == want);

    for (i, (_, b)) in matches.enumerate() {
        let (off, len) = match &b.kind {
            NodeKind::Leaf {
                data_offset,
                data_len,
                ..
            }
            | NodeKind::Unknown {
                data_offset,
                data_len,
            } => (*data_offset, *data_len),
            NodeKind::Container { .. } => {
                debug!("skipping container '{}' at {:#x}", b.hdr.typ, b.hdr.start);
                continue;
            }
        };
        let to_read = if limit == 0 { len } else { len.min(limit as u64) };
        let data = read_slice(&mut f, off, to_read)?;
        println!(
            "\n== Dump {} ({}) payload: offset={:#x}, len={} ==",
            i, b.hdr.typ, off, to_read
        );
        print!("{}", hex_dump(&data, off));
    }
    Ok(())
}
