use anyhow::Context;
use clap::{ArgAction, Parser};
use isobmff::{
    BoxRef, Scanner, Siblings,
    json_api::{JsonOptions, box_tree, field_value},
    samples::tracks,
    util::hex_dump,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Lazy ISOBMFF box explorer")]
struct Args {
    /// MP4/ISOBMFF file path
    path: PathBuf,

    /// Print decoded fields under each box
    #[arg(long, action = ArgAction::SetTrue)]
    fields: bool,

    /// Limit recursion depth
    #[arg(long, default_value_t = 64)]
    depth: usize,

    /// Emit JSON instead of a human-readable tree
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Hex-dump the first N payload bytes of every leaf box
    #[arg(long, default_value_t = 0)]
    hex: u64,

    /// Print per-track sample tables as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    samples: bool,

    /// Text encoding for string fields (WHATWG label, e.g. "utf-16be")
    #[arg(long)]
    encoding: Option<String>,

    /// Stop after this many top-level boxes
    #[arg(long)]
    limit: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let file = std::fs::File::open(&args.path)
        .with_context(|| format!("opening {}", args.path.display()))?;
    let mut builder = Scanner::builder();
    if let Some(label) = &args.encoding {
        builder = builder.encoding_label(label)?;
    }
    if let Some(limit) = args.limit {
        builder = builder.limit(limit);
    }
    let scan = builder.build(std::io::BufReader::new(file));

    if args.samples {
        let tracks = tracks(&scan).context("reading sample tables")?;
        println!("{}", serde_json::to_string_pretty(&tracks)?);
        return Ok(());
    }

    let opts = JsonOptions {
        fields: args.fields || args.json,
        max_depth: args.depth.saturating_sub(1),
        ..JsonOptions::default()
    };

    if args.json {
        let tree = box_tree(scan.root(), &opts)?;
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print_level(scan.root(), 0, &args, &opts)?;
    }
    Ok(())
}

fn print_level(siblings: &Siblings, depth: usize, args: &Args, opts: &JsonOptions) -> anyhow::Result<()> {
    for bx in siblings {
        let bx = bx?;
        print_box(&bx, depth, args, opts)?;
    }
    Ok(())
}

fn print_box(bx: &BoxRef, depth: usize, args: &Args, opts: &JsonOptions) -> anyhow::Result<()> {
    let indent = "  ".repeat(depth);
    println!("{indent}{bx} ({})", bx.kind().full_name());

    if args.fields {
        for name in bx.field_names()? {
            println!("{indent}    {name}: {}", field_value(bx, name, opts));
        }
    }

    match bx.children()? {
        Some(kids) => {
            if depth + 1 < args.depth {
                print_level(&kids, depth + 1, args, opts)?;
            }
        }
        None if args.hex > 0 => {
            let payload = bx.payload()?;
            let n = payload.len().unwrap_or(args.hex).min(args.hex);
            let bytes = payload.peek(0, n)?;
            for line in hex_dump(&bytes, payload.start()).lines() {
                println!("{indent}    {line}");
            }
        }
        None => {}
    }
    Ok(())
}
