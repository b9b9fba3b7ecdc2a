/*

BLUE: W. Feng, D. Kandlur, D. Saha, K. Shin, "BLUE: A New Class of Active Queue Management
Algorithms", U. Michigan CSE-TR-387-99, 1999.

blue-aqm decides, for each packet arriving at a bottleneck queue, whether to admit it or to drop
it, and maintains a drop probability from what it observes of the queue over time.

# Admission

The controller owns a single FIFO with a fixed capacity, counted either in packets or in bytes.
An arriving packet that fits is stored. An arriving packet that does not fit is never stored; the
estimator is notified of the overflow, a uniform sample u is drawn, and the drop is classified:

  u <= p  =>  probabilistic drop
  u >  p  =>  forced drop

Occupancy thus never exceeds capacity. The classification reports how much of the rejected
traffic is attributable to the adaptive policy, as opposed to raw capacity.

A dequeue attempt on an empty queue is reported to the estimator as an underflow. A successful
dequeue leaves the estimator alone.

Optionally (early drop), packets arriving below capacity are also dropped when u < p. This is
off by default.

# BLUE

BLUE keeps a single drop probability p, moved by one bit of feedback:

  overflow:   p <- min(1, p + increment)
  underflow:  p <- max(0, p - decrement)

Each adjustment stamps the current time. Any event arriving less than freeze_interval after the
last stamp is ignored, so that p reacts to sustained conditions rather than to every packet. The
first stamp is the start of the run.

# Double-slope RED

The threshold estimator maps occupancy directly to a probability (no averaging), piecewise
linearly over min_th < mid_th < max_th:

  alpha = (max_p - gamma) / (mid_th - min_th)
  beta  = gamma / (max_th - mid_th)

  avg <  min_th           0
  avg <  mid_th           alpha * (avg - min_th)
  avg <  max_th           (1 - gamma) + beta * (avg - mid_th)
  otherwise               1

Classic RED (a single slope from 0 at min_th to max_p at max_th) is the same estimator with the
middle threshold left out.

# Time

The controller never reads a clock. Each call is given the current time in milliseconds since the
start of the run, which must not decrease. A decreasing time is treated as no time having passed.

# Randomness

Samples are drawn from a seedable source. A run seed and a stream index together select an
independent, reproducible sequence, so that several controllers in one run can be made
deterministic without sharing a generator.

*/

pub mod config;
pub mod controller;
pub mod error;
pub mod estimator;
pub mod event;
pub mod queue;
pub mod random;
pub mod stats;

pub use config::{BlueConfig, Config, EstimatorConfig, Slope, ThresholdConfig, Topology};
pub use controller::{AdmitResult, Controller, DropReason};
pub use error::ConfigError;
pub use estimator::Estimator;
pub use event::{Event, EventSink, UpdateCause};
pub use queue::{Item, QueueSize, QueueState, SizeUnit};
pub use random::{RandomSource, StreamRng};
pub use stats::Stats;
