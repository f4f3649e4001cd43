//! Multiplies a 2x2 matrix by a rotating unit vector and animates the
//! result in the terminal.

mod app;
mod engine;
mod graphics;
mod math;
mod state;

use app::App;
use clap::Parser;
use std::io;
use std::time::Duration;

const MIN_COLS: u16 = 60;
const MIN_ROWS: u16 = 24;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Animation speed as a percentage
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(0..=100))]
    speed: u8,

    /// Samples per revolution of the input vector (rounded to a multiple
    /// of the dot count)
    #[arg(long, default_value_t = 400)]
    steps: usize,

    /// Circumference dots per revolution
    #[arg(long, default_value_t = 40)]
    dots: usize,

    /// Exit automatically after this many seconds
    #[arg(long)]
    duration: Option<f64>,
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.steps == 0 || args.dots == 0 {
        eprintln!("--steps and --dots must be positive");
        std::process::exit(2);
    }

    if let Some(size) = termsize::get() {
        if size.cols < MIN_COLS || size.rows < MIN_ROWS {
            eprintln!(
                "terminal is {}x{}, need at least {}x{}",
                size.cols, size.rows, MIN_COLS, MIN_ROWS
            );
            std::process::exit(2);
        }
    }

    let run_for = args.duration.map(Duration::from_secs_f64);
    App::new(args.steps, args.dots, args.speed, run_for)?.run()
}
