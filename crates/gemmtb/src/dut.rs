/// Writable ports of the device under test.
///
/// `MatrixA(i)` and `MatrixB(i)` address element `i` of the flattened input
/// port arrays. Scalar control ports carry their value in the low bits of the
/// written integer; `RstN` is active-low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPort {
    RstN,
    Start,
    MVal,
    KVal,
    NVal,
    MatrixA(usize),
    MatrixB(usize),
}

/// Readable ports of the device under test.
///
/// `Done` is level-held once asserted until the next reset. `MatrixC(i)`
/// addresses element `i` of the flattened result port array; its contents are
/// only meaningful after `Done` has read nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPort {
    Done,
    MatrixC(usize),
}

/// Number of elements each matrix port array can hold.
///
/// The driver checks a run's dimensions against these before any clock
/// activity; a run that would index past a port array is a fatal
/// configuration error, never a silent truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortCapacity {
    pub matrix_a: usize,
    pub matrix_b: usize,
    pub matrix_c: usize,
}

impl PortCapacity {
    pub fn unbounded() -> Self {
        Self {
            matrix_a: usize::MAX,
            matrix_b: usize::MAX,
            matrix_c: usize::MAX,
        }
    }
}

/// Signal-level contract of the accelerator under test.
///
/// The harness owns the stimulus side of this interface exclusively: it only
/// ever writes input ports and reads output ports. Everything behind the
/// ports is the device's own business, observed solely through `Done`.
///
/// Ordering contract: a write issued before [`rising_edge`](Dut::rising_edge)
/// is visible to the device at that edge; a read issued after it observes the
/// device's state as of that edge. A read never sees a same-step write
/// reflected back through device logic.
pub trait Dut {
    fn capacity(&self) -> PortCapacity;

    /// Drives an input port. Takes effect at the next rising edge.
    fn write(&mut self, port: InputPort, value: i64);

    /// Samples an output port as of the most recent rising edge.
    fn read(&mut self, port: OutputPort) -> i64;

    /// Advances the shared clock by one rising edge, giving the device one
    /// turn to evaluate its sequential logic.
    fn rising_edge(&mut self);
}

impl<D: Dut + ?Sized> Dut for &mut D {
    fn capacity(&self) -> PortCapacity {
        (**self).capacity()
    }

    fn write(&mut self, port: InputPort, value: i64) {
        (**self).write(port, value);
    }

    fn read(&mut self, port: OutputPort) -> i64 {
        (**self).read(port)
    }

    fn rising_edge(&mut self) {
        (**self).rising_edge();
    }
}
