//! Actor-based scheduling of monitor checks
//!
//! Every scheduled monitor owns one [`monitor::MonitorActor`] running as an
//! independent Tokio task. The scheduler only keeps the actor's
//! [`monitor::MonitorHandle`]; dropping or shutting down the handle ends the
//! task.
//!
//! ```text
//!   MonitorScheduler ── handles ──► MonitorActor (one per monitor)
//!                                        │ tick / CheckNow
//!                                        ▼
//!                             Probe → ResultStore → broadcast
//! ```
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: each actor has an mpsc command channel (`CheckNow`)
//! 2. **Shutdown**: a watch signal, raised without waiting on the command queue
//! 3. **Events**: stored results are published on a broadcast channel
//! 4. **Request/Response**: oneshot channels for `CheckNow` replies

pub mod messages;
pub mod monitor;
