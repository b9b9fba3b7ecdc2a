use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use blue_aqm::{
    BlueConfig, Config, Controller, EstimatorConfig, QueueSize, SizeUnit, ThresholdConfig,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Disc {
    Blue,
    Red,
    Dsred,
}

/// Runs on/off traffic through a single bottleneck queue and reports queue statistics.
#[derive(Debug, Parser)]
struct Args {
    /// Queue discipline
    #[arg(long, value_enum, default_value = "blue")]
    disc: Disc,

    /// TOML controller configuration; overrides all discipline options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Queue capacity, e.g. 100p or 51200B
    #[arg(long, default_value = "100p")]
    limit: QueueSize,

    #[arg(long, default_value_t = 0.02)]
    increment: f64,

    #[arg(long, default_value_t = 0.002)]
    decrement: f64,

    #[arg(long, default_value_t = 100)]
    freeze_ms: u64,

    /// Thresholds are in packets; they are scaled by the packet size for byte limits
    #[arg(long, default_value_t = 5.0)]
    min_th: f64,

    #[arg(long, default_value_t = 10.0)]
    mid_th: f64,

    #[arg(long, default_value_t = 15.0)]
    max_th: f64,

    #[arg(long, default_value_t = 1.0)]
    max_p: f64,

    #[arg(long, default_value_t = 0.5)]
    gamma: f64,

    /// Drop below capacity with the current drop probability
    #[arg(long)]
    early_drop: bool,

    #[arg(long, default_value_t = 512)]
    packet_size: usize,

    /// Arrival rate while the source is on, in packets per second
    #[arg(long, default_value_t = 2000.0)]
    arrival_pps: f64,

    /// Bottleneck drain rate, in packets per second
    #[arg(long, default_value_t = 244.0)]
    service_pps: f64,

    #[arg(long, default_value_t = 30_000)]
    duration_ms: u64,

    /// Print "seconds probability" lines at this interval
    #[arg(long)]
    sample_interval_ms: Option<u64>,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    #[arg(long, default_value_t = 0)]
    stream: u64,
}

impl Args {
    fn controller_config(&self) -> Result<Config, Box<dyn Error>> {
        if let Some(path) = &self.config {
            let text = std::fs::read_to_string(path)?;
            return Ok(toml::from_str(&text)?);
        }

        let scale = match self.limit.unit {
            SizeUnit::Packets => 1.0,
            SizeUnit::Bytes => self.packet_size as f64,
        };

        let estimator = match self.disc {
            Disc::Blue => EstimatorConfig::Blue(BlueConfig {
                increment: self.increment,
                decrement: self.decrement,
                freeze_interval_ms: self.freeze_ms,
                initial_probability: 0.0,
            }),
            Disc::Red => EstimatorConfig::Threshold(ThresholdConfig::red(
                self.min_th * scale,
                self.max_th * scale,
                self.max_p,
            )),
            Disc::Dsred => EstimatorConfig::Threshold(ThresholdConfig::double_slope(
                self.min_th * scale,
                self.mid_th * scale,
                self.max_th * scale,
                self.max_p,
                self.gamma,
            )),
        };

        Ok(Config {
            max_size: self.limit,
            estimator,
            early_drop: self.early_drop,
            seed: self.seed,
            stream: self.stream,
            ..Default::default()
        })
    }
}

// On/off source: on and off periods are uniform over [0, 1) s, arrivals are Poisson while on
struct Source {
    rng: StdRng,
    mean_gap_ms: f64,
    on_until_ms: f64,
    next_ms: f64,
}

impl Source {
    fn new(seed: u64, arrival_pps: f64) -> Self {
        let mut source = Self {
            rng: StdRng::seed_from_u64(seed),
            mean_gap_ms: 1000.0 / arrival_pps,
            on_until_ms: 0.0,
            next_ms: 0.0,
        };

        source.on_until_ms = source.rng.gen::<f64>() * 1000.0;
        source.advance();
        source
    }

    fn gap(&mut self) -> f64 {
        let u: f64 = self.rng.gen();
        -(1.0 - u).ln() * self.mean_gap_ms
    }

    fn advance(&mut self) {
        let mut next = self.next_ms + self.gap();

        while next > self.on_until_ms {
            // Skip the off period and start a new on period
            let off = self.rng.gen::<f64>() * 1000.0;
            let on = self.rng.gen::<f64>() * 1000.0;
            next = self.on_until_ms + off + self.gap();
            self.on_until_ms += off + on;
        }

        self.next_ms = next;
    }
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if !(args.arrival_pps > 0.0 && args.service_pps > 0.0) {
        return Err("arrival and service rates must be positive".into());
    }

    let config = args.controller_config()?;
    let mut ctl: Controller<Box<[u8]>> = Controller::new(config)?;

    let mut source = Source::new(args.seed.wrapping_add(1), args.arrival_pps);
    let service_ms = 1000.0 / args.service_pps;
    let duration_ms = args.duration_ms as f64;

    // Time at which the link finishes its current packet, if busy
    let mut link_free_ms: Option<f64> = None;
    let mut next_sample_ms = args.sample_interval_ms.map(|_| 0.0);

    loop {
        let arrival_ms = source.next_ms;
        let departure_ms = link_free_ms.unwrap_or(f64::INFINITY);
        let sample_ms = next_sample_ms.unwrap_or(f64::INFINITY);

        let now = arrival_ms.min(departure_ms).min(sample_ms);
        if now > duration_ms {
            break;
        }

        let now_ms = now as u64;

        if now == sample_ms {
            println!("{:.3} {}", now / 1000.0, ctl.drop_probability());
            next_sample_ms = args
                .sample_interval_ms
                .map(|interval| sample_ms + interval.max(1) as f64);
        } else if now == departure_ms {
            link_free_ms = ctl.dequeue(now_ms).map(|_| now + service_ms);
        } else {
            let _ = ctl.enqueue(vec![0u8; args.packet_size].into_boxed_slice(), now_ms);
            source.advance();

            if link_free_ms.is_none() {
                link_free_ms = ctl.dequeue(now_ms).map(|_| now + service_ms);
            }
        }
    }

    let stats = ctl.stats();

    println!("*** Stats from the bottleneck queue ***");
    println!("{}", stats);
    println!("Final drop probability: {}", ctl.drop_probability());

    if stats.forced_drop_packets == 0 && stats.probabilistic_drop_packets == 0 {
        eprintln!("There should be some drops (either forced or probabilistic)");
        return Ok(ExitCode::FAILURE);
    }

    if stats.internal_queue_drops != 0 {
        eprintln!("There should be zero drops due to queue full");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}
