use std::env;
use std::process;

use anyhow::{bail, Context, Result};
use lsh_mine::families::StableDistribution;
use lsh_mine::serialization::{load_listdb, load_vectordb, save_listdb};
use lsh_mine::{l1_mine, lp_mine};

fn usage() {
    println!(
        "
lsh-mine l1 <input.lists> <output.lists> <tuple_size> <repetitions> <max_value> <capacity> [--seed N]
lsh-mine lp <input.vecs>  <output.lists> <tuple_size> <repetitions> <width>     <capacity> <l1|l2> [--seed N]
    "
    )
}

fn parse_seed(args: &[String]) -> Result<u64> {
    match args.iter().position(|a| a == "--seed") {
        Some(i) => args
            .get(i + 1)
            .context("--seed given without a value")?
            .parse()
            .context("--seed value is not a u64"),
        None => Ok(0),
    }
}

fn run_l1(args: &[String]) -> Result<()> {
    if args.len() < 6 {
        bail!("l1 requires 6 positional arguments");
    }
    let input = &args[0];
    let output = &args[1];
    let tuple_size: u32 = args[2].parse().context("tuple_size not a u32")?;
    let repetitions: u32 = args[3].parse().context("repetitions not a u32")?;
    let max_value: u32 = args[4].parse().context("max_value not a u32")?;
    let capacity: u32 = args[5].parse().context("capacity not a u32")?;
    let seed = parse_seed(&args[6..])?;

    let listdb = load_listdb(input).with_context(|| format!("loading {}", input))?;
    let mined = l1_mine(&listdb, tuple_size, repetitions, max_value, capacity, seed)
        .context("l1 mining failed")?;
    save_listdb(output, &mined).with_context(|| format!("saving {}", output))?;
    println!("wrote {} co-occurrence groups to {}", mined.len(), output);
    Ok(())
}

fn run_lp(args: &[String]) -> Result<()> {
    if args.len() < 7 {
        bail!("lp requires 7 positional arguments");
    }
    let input = &args[0];
    let output = &args[1];
    let tuple_size: u32 = args[2].parse().context("tuple_size not a u32")?;
    let repetitions: u32 = args[3].parse().context("repetitions not a u32")?;
    let width: f64 = args[4].parse().context("width not an f64")?;
    let capacity: u32 = args[5].parse().context("capacity not a u32")?;
    let stable = match args[6].as_str() {
        "l1" => StableDistribution::Cauchy,
        "l2" => StableDistribution::Gaussian,
        other => bail!("unknown stable distribution `{}`, expected l1 or l2", other),
    };
    let seed = parse_seed(&args[7..])?;

    let vectordb = load_vectordb(input).with_context(|| format!("loading {}", input))?;
    let mined = lp_mine(&vectordb, tuple_size, repetitions, width, capacity, stable, seed)
        .context("lp mining failed")?;
    save_listdb(output, &mined).with_context(|| format!("saving {}", output))?;
    println!("wrote {} co-occurrence groups to {}", mined.len(), output);
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let result = match args.get(1).map(String::as_str) {
        Some("l1") => run_l1(&args[2..]),
        Some("lp") => run_lp(&args[2..]),
        _ => {
            usage();
            process::exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("error: {:?}", err);
        process::exit(1);
    }
}
