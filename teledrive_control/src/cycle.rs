//! Fixed-rate control loop: poll → engage → synthesize → report → publish.
//!
//! ## Setup Sequence
//! 1. Create the bus topics ([`control_topics`]); bridges keep the
//!    [`BridgeHandles`] side.
//! 2. Optional RT setup ([`rt_setup`], `rt` feature): `mlockall`, stack
//!    prefault, CPU pinning, `SCHED_FIFO`.
//! 3. [`ControlLoop::run`] until the shutdown flag clears.
//!
//! ## Pacing
//! [`RateKeeper`] sleeps until the next frame deadline. A tick that runs
//! late shortens the following sleep; when the loop falls more than one full
//! interval behind, the schedule restarts from "now" instead of bursting to
//! catch up.
//!
//! ## Tick Failures
//! A [`TickError`] drops the tick: nothing is published, the engagement
//! state and the previous vehicle snapshot stay as they were, and the loop
//! continues with the next frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use teledrive_common::bus::{Topic, TopicReader, TopicWriter};
use teledrive_common::messages::{
    ActuationRequest, JoystickMessage, StatusReport, TOPIC_CAR_CONTROL, TOPIC_CAR_STATE,
    TOPIC_JOYSTICK, TOPIC_SELFDRIVE_STATE, VehicleState,
};
use tracing::{debug, error, info, warn};

use crate::command::CommandSynthesizer;
use crate::config::{ControlConfig, TeledriveConfig};
use crate::engagement::{
    EngagementInputs, EngagementMachine, EngagementState, ReengageOutcome, TickEvents,
};
use crate::error::{CycleError, TickError};
use crate::ingest::{self, NoCarData, VehicleIngest};
use crate::liveness::{JoystickLiveness, LivenessEdge};
use crate::status::{StatusHook, StatusReporter};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-tick timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total ticks executed.
    pub cycle_count: u64,
    /// Last tick duration [ns].
    pub last_cycle_ns: i64,
    /// Minimum tick duration [ns].
    pub min_cycle_ns: i64,
    /// Maximum tick duration [ns].
    pub max_cycle_ns: i64,
    /// Running sum for average computation.
    pub sum_cycle_ns: i64,
    /// Ticks whose body took longer than the interval.
    pub overruns: u64,
    /// Maximum wake-up latency [ns] (time between scheduled and actual start).
    pub max_latency_ns: i64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: i64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
        }
    }

    /// Record a tick duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: i64, latency_ns: i64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns = self.sum_cycle_ns.saturating_add(duration_ns);
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average tick time [ns] (0 if no ticks).
    #[inline]
    pub fn avg_cycle_ns(&self) -> i64 {
        if self.cycle_count == 0 {
            0
        } else {
            self.sum_cycle_ns / self.cycle_count as i64
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn as_ns(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}

// ─── Rate Keeper ────────────────────────────────────────────────────

/// Drift-tracking frame pacer.
#[derive(Debug, Clone)]
pub struct RateKeeper {
    interval: Duration,
    next_frame: Instant,
    stats: CycleStats,
    /// Times the schedule was restarted after falling too far behind.
    lag_resets: u64,
}

impl RateKeeper {
    pub fn new(rate_hz: u32) -> Self {
        Self::starting_at(rate_hz, Instant::now())
    }

    /// Pacer whose first frame ends one interval after `start`.
    pub fn starting_at(rate_hz: u32, start: Instant) -> Self {
        let interval = Duration::from_nanos(1_000_000_000 / u64::from(rate_hz.max(1)));
        Self {
            interval,
            next_frame: start + interval,
            stats: CycleStats::new(),
            lag_resets: 0,
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    #[inline]
    pub fn lag_resets(&self) -> u64 {
        self.lag_resets
    }

    /// Restart the schedule from `now`.
    pub fn reset(&mut self, now: Instant) {
        self.next_frame = now + self.interval;
    }

    /// Account for a finished tick and advance the schedule.
    ///
    /// Returns how long to sleep before the next tick, `None` when already
    /// late.
    pub fn end_frame(&mut self, tick_start: Instant, now: Instant) -> Option<Duration> {
        let duration = now.saturating_duration_since(tick_start);
        let scheduled = self.next_frame.checked_sub(self.interval).unwrap_or(tick_start);
        let latency = tick_start.saturating_duration_since(scheduled);
        self.stats.record(as_ns(duration), as_ns(latency));
        if duration > self.interval {
            self.stats.overruns += 1;
        }

        if let Some(remaining) = self.next_frame.checked_duration_since(now) {
            self.next_frame += self.interval;
            return Some(remaining);
        }

        let lag = now.saturating_duration_since(self.next_frame);
        if lag > self.interval {
            self.lag_resets += 1;
            self.next_frame = now + self.interval;
        } else {
            self.next_frame += self.interval;
        }
        None
    }

    /// [`end_frame`](Self::end_frame) followed by the sleep.
    pub fn keep_time(&mut self, tick_start: Instant) {
        if let Some(remaining) = self.end_frame(tick_start, Instant::now()) {
            std::thread::sleep(remaining);
        }
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Lock all current and future memory pages.
///
/// No-op when the `rt` feature is not enabled.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), CycleError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| CycleError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), CycleError> {
    Ok(())
}

/// Touch a block of stack so the loop does not page-fault on it later.
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

/// Pin the current thread to a CPU core.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), CycleError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| CycleError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| CycleError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), CycleError> {
    Ok(())
}

/// Switch the current thread to `SCHED_FIFO`.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), CycleError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` outlives the call; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(CycleError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), CycleError> {
    Ok(())
}

/// Full RT setup sequence. All steps except the stack prefault are no-ops
/// without the `rt` feature.
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), CycleError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Topics ─────────────────────────────────────────────────────────

/// Loop-side input readers.
#[derive(Debug)]
pub struct ControlInputs {
    pub vehicle: TopicReader<VehicleState>,
    pub joystick: TopicReader<JoystickMessage>,
}

/// Loop-side output writers.
#[derive(Debug)]
pub struct ControlOutputs {
    pub actuation: TopicWriter<ActuationRequest>,
    pub status: TopicWriter<StatusReport>,
}

/// Handles for the external bridges: they feed the inputs and observe the
/// outputs.
#[derive(Debug)]
pub struct BridgeHandles {
    pub vehicle: TopicWriter<VehicleState>,
    pub joystick: TopicWriter<JoystickMessage>,
    pub actuation: TopicReader<ActuationRequest>,
    pub status: TopicReader<StatusReport>,
}

/// Create the four topics the loop uses.
pub fn control_topics(config: &ControlConfig) -> (ControlInputs, ControlOutputs, BridgeHandles) {
    let (vehicle_w, vehicle_r) = Topic::new(TOPIC_CAR_STATE, config.vehicle_stale_ticks);
    let (joystick_w, joystick_r) = Topic::new(TOPIC_JOYSTICK, config.joystick_timeout_ticks);
    let (actuation_w, actuation_r) = Topic::new(TOPIC_CAR_CONTROL, config.vehicle_stale_ticks);
    let (status_w, status_r) = Topic::new(TOPIC_SELFDRIVE_STATE, config.vehicle_stale_ticks);

    (
        ControlInputs {
            vehicle: vehicle_r,
            joystick: joystick_r,
        },
        ControlOutputs {
            actuation: actuation_w,
            status: status_w,
        },
        BridgeHandles {
            vehicle: vehicle_w,
            joystick: joystick_w,
            actuation: actuation_r,
            status: status_r,
        },
    )
}

// ─── Control Loop ───────────────────────────────────────────────────

/// What a successful tick published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Only the disabled heartbeat status; no actuation request.
    NoCarData,
    /// Actuation request and status report.
    Published,
}

/// The control loop. Owns every per-tick component.
pub struct ControlLoop {
    inputs: ControlInputs,
    outputs: ControlOutputs,
    ingest: VehicleIngest,
    liveness: JoystickLiveness,
    machine: EngagementMachine,
    synthesizer: CommandSynthesizer,
    reporter: StatusReporter,
    hook: StatusHook,
    rate: RateKeeper,
    /// Reason of the current no-car-data streak, for transition logging.
    car_data_lost: Option<NoCarData>,
    tick_count: u64,
    tick_errors: u64,
}

impl ControlLoop {
    pub fn new(config: &TeledriveConfig, inputs: ControlInputs, outputs: ControlOutputs) -> Self {
        let control = &config.control;
        Self {
            inputs,
            outputs,
            ingest: VehicleIngest::new(),
            liveness: JoystickLiveness::new(control.joystick_timeout_ticks),
            machine: EngagementMachine::new(control.profile, control.graceful_stop_ticks),
            synthesizer: CommandSynthesizer::new(config.command),
            reporter: StatusReporter::new(control.rate_hz),
            hook: StatusHook::new(control.status_log_interval),
            rate: RateKeeper::new(control.rate_hz),
            car_data_lost: Some(NoCarData::NeverReceived),
            tick_count: 0,
            tick_errors: 0,
        }
    }

    /// Engagement state committed by the last successful tick.
    #[inline]
    pub fn engagement(&self) -> EngagementState {
        self.machine.state()
    }

    #[inline]
    pub fn joystick_active(&self) -> bool {
        self.liveness.is_active()
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        self.rate.stats()
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[inline]
    pub fn tick_errors(&self) -> u64 {
        self.tick_errors
    }

    /// One full iteration. Commits state only when everything succeeded.
    pub fn tick(&mut self) -> Result<TickOutcome, TickError> {
        self.tick_count += 1;

        let vehicle = self.inputs.vehicle.poll();
        let joystick = self.inputs.joystick.poll();
        match self.liveness.update(ingest::joystick_sample(&joystick)) {
            LivenessEdge::Lost => debug!(tick = self.tick_count, "Joystick link went quiet"),
            LivenessEdge::Regained => debug!(tick = self.tick_count, "Joystick link live"),
            LivenessEdge::None => {}
        }

        let snapshot = match self.ingest.capture(vehicle) {
            Ok(snapshot) => snapshot,
            Err(reason) => {
                if self.car_data_lost.is_none() {
                    warn!(tick = self.tick_count, "No car data: {reason}");
                }
                self.car_data_lost = Some(reason);
                let report = self.reporter.no_car_data();
                self.hook.observe(&report, None);
                self.outputs.status.publish(report, true);
                return Ok(TickOutcome::NoCarData);
            }
        };

        let decision = self.machine.evaluate(&EngagementInputs {
            vehicle: &snapshot,
            previous: self.ingest.previous(),
            joystick_active: self.liveness.is_active(),
        })?;
        let request = self.synthesizer.synthesize(
            decision.state(),
            &decision.flags,
            &self.liveness.sample(),
            &snapshot,
        )?;
        if !request.is_consistent() {
            return Err(TickError::Invariant("actuation active without enable"));
        }
        let report = self
            .reporter
            .report(decision.state(), &decision.flags, &snapshot.state);

        self.outputs.actuation.publish(request, true);
        self.hook.observe(&report, Some(decision.state()));
        self.outputs.status.publish(report, true);

        self.machine.commit(&decision);
        self.ingest.commit(snapshot);
        if let Some(reason) = self.car_data_lost.take() {
            info!(tick = self.tick_count, "Car data available (was: {reason})");
        }
        self.log_events(&decision.events);

        Ok(TickOutcome::Published)
    }

    /// [`tick`](Self::tick) with the error boundary: a failing tick is
    /// logged and dropped.
    pub fn run_tick(&mut self) -> Option<TickOutcome> {
        match self.tick() {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.tick_errors += 1;
                error!(
                    tick = self.tick_count,
                    errors = self.tick_errors,
                    "Tick dropped: {e}"
                );
                None
            }
        }
    }

    /// Run at the configured rate until `running` is cleared.
    pub fn run(&mut self, running: &AtomicBool) {
        info!(
            interval_us = self.rate.interval().as_micros() as u64,
            profile = ?self.machine.profile(),
            "Entering control loop"
        );
        self.rate.reset(Instant::now());

        while running.load(Ordering::SeqCst) {
            let tick_start = Instant::now();
            self.run_tick();
            self.rate.keep_time(tick_start);
        }

        let stats = self.rate.stats();
        info!(
            ticks = stats.cycle_count,
            avg_us = stats.avg_cycle_ns() / 1000,
            max_us = stats.max_cycle_ns / 1000,
            overruns = stats.overruns,
            lag_resets = self.rate.lag_resets(),
            tick_errors = self.tick_errors,
            "Control loop stopped"
        );
    }

    fn log_events(&self, events: &TickEvents) {
        let tick = self.tick_count;
        if let Some(kind) = events.override_kind {
            warn!(tick, "{} override: remote control revoked", kind.as_str());
        }
        match events.reengage {
            Some(ReengageOutcome::Accepted(button)) => {
                info!(tick, ?button, "Engaged by button press");
            }
            Some(ReengageOutcome::Rejected(button)) => {
                warn!(tick, ?button, "Engage rejected: joystick not active");
            }
            None => {}
        }
        if events.stop_armed {
            warn!(tick, "Joystick lost while engaged, graceful stop started");
        }
        if events.hard_stop {
            warn!(tick, "Graceful stop expired, hard stop");
        }
        if events.stop_cancelled && events.edge == LivenessEdge::Regained {
            info!(tick, "Joystick regained, graceful stop cancelled");
        } else if events.stop_cancelled {
            info!(tick, "Graceful stop cancelled");
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
