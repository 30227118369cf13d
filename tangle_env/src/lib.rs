//! Tangle Environment Layer
//!
//! Everything a simulation run needs from "the outside world" is owned here
//! and controlled by the run:
//! - **Randomness**: one seeded stream per run ([`SeededRng`])
//! - **Time**: a virtual clock advanced in fixed steps ([`SimClock`])
//! - **Identity**: dense integer ids for transactions and processes
//!
//! Deriving all entropy from a single 64-bit seed makes every run
//! reproducible from its seed number.
//!
//! # Example
//!
//! ```
//! use tangle_env::{RandomSource, SeededRng, SimClock};
//!
//! let mut rng = SeededRng::new(42);
//! let mut clock = SimClock::default();
//!
//! while clock.within(3.0) {
//!     let _delay = rng.uniform_real(1.0, 5.0);
//!     clock.advance();
//! }
//! assert_eq!(clock.ticks(), 4);
//! ```

mod clock;
mod random;
mod types;

pub use clock::SimClock;
pub use random::{RandomSource, SeededRng};
pub use types::{NodeId, ProcessId};
