use crate::dut::{Dut, InputPort, OutputPort};
use crate::vector::{Dims, InputRecord};
use thiserror::Error;

/// Protocol phase of one run. Transitions are linear and one-way;
/// `Drained` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resetting,
    Loading,
    Computing,
    Drained,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DriverError {
    #[error("done not asserted within {waited} cycles")]
    Timeout { waited: u64 },
    #[error("{op} requires phase {expected:?}, driver is in {actual:?}")]
    Phase {
        op: &'static str,
        expected: Phase,
        actual: Phase,
    },
    #[error("device {port} port holds {capacity} elements, run requires {required}")]
    PortCapacity {
        port: &'static str,
        capacity: usize,
        required: usize,
    },
    #[error("matrix {tag} has {found} elements, dimensions require {expected}")]
    DimensionMismatch {
        tag: &'static str,
        found: usize,
        expected: usize,
    },
}

#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Upper bound on the done-wait poll loop, in clock edges. A device that
    /// stays silent past this bound surfaces as [`DriverError::Timeout`]
    /// instead of suspending the harness forever.
    pub max_wait_cycles: u64,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            max_wait_cycles: 10_000,
        }
    }
}

/// Cycle-synchronous stimulus driver for one run against a [`Dut`].
///
/// Sequences reset, operand load, the start pulse, and result drain across
/// rising clock edges. Every signal write lands before the edge that must
/// sample it; the driver never writes after an edge expecting retroactive
/// sampling.
pub struct Driver<D: Dut> {
    dut: D,
    options: DriverOptions,
    phase: Phase,
    dims: Option<Dims>,
    edges: u64,
}

impl<D: Dut> Driver<D> {
    pub fn new(dut: D) -> Self {
        Self::with_options(dut, DriverOptions::default())
    }

    pub fn with_options(dut: D, options: DriverOptions) -> Self {
        Self {
            dut,
            options,
            phase: Phase::Idle,
            dims: None,
            edges: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Rising edges issued so far, for failure reports.
    pub fn edges(&self) -> u64 {
        self.edges
    }

    pub fn dut(&self) -> &D {
        &self.dut
    }

    pub fn into_inner(self) -> D {
        self.dut
    }

    /// Configures dimensions and holds the device in reset for two edges.
    ///
    /// The two-edge margin lets the device's internal reset logic propagate
    /// fully regardless of its pipeline depth. Dimension ports are written
    /// before the first edge so they are stable through the reset window.
    pub fn reset(&mut self, dims: Dims) -> Result<(), DriverError> {
        self.expect_phase("reset", Phase::Idle)?;
        let capacity = self.dut.capacity();
        check_capacity("matrix_A", capacity.matrix_a, dims.a_len())?;
        check_capacity("matrix_B", capacity.matrix_b, dims.b_len())?;
        check_capacity("matrix_C", capacity.matrix_c, dims.c_len())?;

        self.dut.write(InputPort::MVal, dims.m as i64);
        self.dut.write(InputPort::KVal, dims.k as i64);
        self.dut.write(InputPort::NVal, dims.n as i64);
        self.dut.write(InputPort::RstN, 0);
        self.dut.write(InputPort::Start, 0);
        self.edge();
        self.edge();

        log::debug!(
            "reset held for two edges, dims m={} k={} n={}",
            dims.m,
            dims.k,
            dims.n
        );
        self.dims = Some(dims);
        self.phase = Phase::Resetting;
        Ok(())
    }

    /// Releases reset and loads both operand matrices element-wise.
    ///
    /// All writes land within one clock phase window, before the start pulse,
    /// so the device samples stable values on the edge that follows. Values
    /// are truncated toward zero; the port interface is integer-width.
    pub fn load(&mut self, a: &[f64], b: &[f64]) -> Result<(), DriverError> {
        self.expect_phase("load", Phase::Resetting)?;
        let dims = self.configured_dims("load")?;
        check_len("A", a.len(), dims.a_len())?;
        check_len("B", b.len(), dims.b_len())?;

        self.dut.write(InputPort::RstN, 1);
        self.edge();

        for (i, val) in a.iter().enumerate() {
            self.dut.write(InputPort::MatrixA(i), *val as i64);
        }
        for (i, val) in b.iter().enumerate() {
            self.dut.write(InputPort::MatrixB(i), *val as i64);
        }

        log::debug!("loaded {} + {} operand elements", a.len(), b.len());
        self.phase = Phase::Loading;
        Ok(())
    }

    /// Issues the start pulse: asserted for exactly one rising edge.
    ///
    /// The device contract is edge-triggered start detection; neither side
    /// may rely on start staying asserted longer than one cycle.
    pub fn start(&mut self) -> Result<(), DriverError> {
        self.expect_phase("start", Phase::Loading)?;
        self.dut.write(InputPort::Start, 1);
        self.edge();
        self.dut.write(InputPort::Start, 0);
        log::debug!("start pulsed at edge {}", self.edges);
        self.phase = Phase::Computing;
        Ok(())
    }

    /// Polls `done` after each edge, then reads back the result matrix.
    ///
    /// The poll is bounded by [`DriverOptions::max_wait_cycles`]; on timeout
    /// the driver re-asserts reset so the device is left quiescent rather
    /// than mid-computation.
    pub fn drain(&mut self) -> Result<Vec<i64>, DriverError> {
        self.expect_phase("drain", Phase::Computing)?;
        let dims = self.configured_dims("drain")?;

        let mut waited = 0u64;
        while self.dut.read(OutputPort::Done) == 0 {
            if waited >= self.options.max_wait_cycles {
                self.dut.write(InputPort::RstN, 0);
                self.edge();
                return Err(DriverError::Timeout { waited });
            }
            self.edge();
            waited += 1;
        }
        log::debug!("done observed after {waited} wait cycles");

        let c = (0..dims.c_len())
            .map(|i| self.dut.read(OutputPort::MatrixC(i)))
            .collect();
        self.phase = Phase::Drained;
        Ok(c)
    }

    /// Drives one complete run: reset, load, start pulse, drain.
    pub fn run(&mut self, record: &InputRecord) -> Result<Vec<i64>, DriverError> {
        log::info!(
            "driving run m={} k={} n={}",
            record.dims.m,
            record.dims.k,
            record.dims.n
        );
        self.reset(record.dims)?;
        self.load(&record.a, &record.b)?;
        self.start()?;
        let c = self.drain()?;
        log::info!("run complete after {} edges", self.edges);
        Ok(c)
    }

    fn edge(&mut self) {
        self.dut.rising_edge();
        self.edges += 1;
    }

    fn expect_phase(&self, op: &'static str, expected: Phase) -> Result<(), DriverError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(DriverError::Phase {
                op,
                expected,
                actual: self.phase,
            })
        }
    }

    fn configured_dims(&self, op: &'static str) -> Result<Dims, DriverError> {
        self.dims.ok_or(DriverError::Phase {
            op,
            expected: Phase::Resetting,
            actual: Phase::Idle,
        })
    }
}

fn check_capacity(
    port: &'static str,
    capacity: usize,
    required: usize,
) -> Result<(), DriverError> {
    if required > capacity {
        return Err(DriverError::PortCapacity {
            port,
            capacity,
            required,
        });
    }
    Ok(())
}

fn check_len(tag: &'static str, found: usize, expected: usize) -> Result<(), DriverError> {
    if found != expected {
        return Err(DriverError::DimensionMismatch {
            tag,
            found,
            expected,
        });
    }
    Ok(())
}
