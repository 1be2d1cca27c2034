//! dump_tables.rs - print the fixed-point engine's lookup tables as
//! comma-separated rows, ready to paste into a C or Rust array literal.
//!
//! USAGE:
//! ```bash
//! cargo run --bin dump_tables -- --table near-height
//! cargo run --bin dump_tables -- --out tables.txt
//! ```

use clap::{Parser, ValueEnum};
use std::io::{self, BufWriter, Write};
use std::{fs::File, path::PathBuf};

use raycaster_rs::engine::tables::{Tables, tables};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Table to print [default: all of them, in declaration order]
    #[arg(long, value_enum)]
    table: Option<Table>,

    /// Write here instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Table {
    Tan,
    Cotan,
    Sin,
    Cos,
    NearHeight,
    FarHeight,
    NearStep,
    FarStep,
    OverflowOffset,
    OverflowStep,
    DeltaAngle,
}

impl Table {
    const ALL: [Table; 11] = [
        Table::Tan,
        Table::Cotan,
        Table::Sin,
        Table::Cos,
        Table::NearHeight,
        Table::FarHeight,
        Table::NearStep,
        Table::FarStep,
        Table::OverflowOffset,
        Table::OverflowStep,
        Table::DeltaAngle,
    ];

    /// Field width and values per row.
    fn layout(self) -> (usize, usize) {
        match self {
            Table::Tan | Table::Cotan | Table::DeltaAngle => (4, 12),
            Table::Sin | Table::Cos => (3, 15),
            Table::NearHeight => (4, 15),
            Table::FarHeight => (4, 18),
            Table::NearStep => (5, 12),
            Table::FarStep => (5, 11),
            Table::OverflowOffset => (6, 11),
            Table::OverflowStep => (4, 15),
        }
    }

    fn values(self, t: &Tables) -> Vec<u32> {
        fn widen<T: Copy + Into<u32>>(a: &[T]) -> Vec<u32> {
            a.iter().map(|&v| v.into()).collect()
        }
        match self {
            Table::Tan => widen(&t.tan),
            Table::Cotan => widen(&t.cotan),
            Table::Sin => widen(&t.sin),
            Table::Cos => widen(&t.cos),
            Table::NearHeight => widen(&t.near_height),
            Table::FarHeight => widen(&t.far_height),
            Table::NearStep => widen(&t.near_step),
            Table::FarStep => widen(&t.far_step),
            Table::OverflowOffset => widen(&t.overflow_offset),
            Table::OverflowStep => widen(&t.overflow_step),
            Table::DeltaAngle => widen(&t.delta_angle),
        }
    }
}

fn dump(out: &mut impl Write, table: Table, t: &Tables) -> io::Result<()> {
    let (width, per_row) = table.layout();
    writeln!(out, "// {table:?}")?;
    for row in table.values(t).chunks(per_row) {
        for v in row {
            write!(out, "{v:>width$},")?;
        }
        writeln!(out)?;
    }
    writeln!(out)
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let t = tables();

    let mut out: Box<dyn Write> = match &opts.out {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let selected = opts.table.as_ref().map_or(&Table::ALL[..], std::slice::from_ref);
    for &table in selected {
        dump(&mut out, table, t)?;
    }
    out.flush()?;

    if let Some(path) = &opts.out {
        println!("✓  {} table(s) written to {}", selected.len(), path.display());
    }
    Ok(())
}
