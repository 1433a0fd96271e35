#![allow(dead_code)]

use gemmtb::{Dut, InputPort, OutputPort, PortCapacity};

/// Behavioral model of the accelerator.
///
/// Latches operands and dimensions on the edge where `start` samples high,
/// then asserts `done` a fixed number of edges later. `done` stays asserted
/// until the next reset. Reset is active-low and synchronous.
pub struct MatMulModel {
    latency: u64,
    rst_n: i64,
    start: i64,
    m: usize,
    k: usize,
    n: usize,
    a: Vec<i64>,
    b: Vec<i64>,
    c: Vec<i64>,
    busy: bool,
    remaining: u64,
    done: bool,
}

impl MatMulModel {
    pub fn new(latency: u64) -> Self {
        Self::with_capacity(latency, 64)
    }

    pub fn with_capacity(latency: u64, capacity: usize) -> Self {
        Self {
            latency,
            rst_n: 1,
            start: 0,
            m: 0,
            k: 0,
            n: 0,
            a: vec![0; capacity],
            b: vec![0; capacity],
            c: vec![0; capacity],
            busy: false,
            remaining: 0,
            done: false,
        }
    }

    fn compute(&mut self) {
        for i in 0..self.m {
            for j in 0..self.n {
                let mut acc = 0i64;
                for x in 0..self.k {
                    acc += self.a[i * self.k + x] * self.b[x * self.n + j];
                }
                self.c[i * self.n + j] = acc;
            }
        }
    }
}

impl Dut for MatMulModel {
    fn capacity(&self) -> PortCapacity {
        PortCapacity {
            matrix_a: self.a.len(),
            matrix_b: self.b.len(),
            matrix_c: self.c.len(),
        }
    }

    fn write(&mut self, port: InputPort, value: i64) {
        match port {
            InputPort::RstN => self.rst_n = value,
            InputPort::Start => self.start = value,
            InputPort::MVal => self.m = value as usize,
            InputPort::KVal => self.k = value as usize,
            InputPort::NVal => self.n = value as usize,
            InputPort::MatrixA(i) => self.a[i] = value,
            InputPort::MatrixB(i) => self.b[i] = value,
        }
    }

    fn read(&mut self, port: OutputPort) -> i64 {
        match port {
            OutputPort::Done => self.done as i64,
            OutputPort::MatrixC(i) => self.c[i],
        }
    }

    fn rising_edge(&mut self) {
        if self.rst_n == 0 {
            self.busy = false;
            self.remaining = 0;
            self.done = false;
            return;
        }
        if self.busy {
            if self.remaining == 0 {
                self.busy = false;
                self.done = true;
            } else {
                self.remaining -= 1;
            }
        } else if !self.done && self.start != 0 {
            self.compute();
            if self.latency == 0 {
                self.done = true;
            } else {
                self.busy = true;
                self.remaining = self.latency - 1;
            }
        }
    }
}

/// A mis-wired device: accepts all stimulus but never asserts `done`.
pub struct StuckModel;

impl Dut for StuckModel {
    fn capacity(&self) -> PortCapacity {
        PortCapacity::unbounded()
    }

    fn write(&mut self, _port: InputPort, _value: i64) {}

    fn read(&mut self, _port: OutputPort) -> i64 {
        0
    }

    fn rising_edge(&mut self) {}
}

/// One recorded port operation, stamped with the number of rising edges that
/// had elapsed when it was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Write {
        edge: u64,
        port: InputPort,
        value: i64,
    },
    Read {
        edge: u64,
        port: OutputPort,
        value: i64,
    },
}

/// Pass-through wrapper recording every port operation against the clock,
/// for protocol-conformance assertions.
pub struct Traced<D> {
    pub inner: D,
    pub events: Vec<Event>,
    edge: u64,
}

impl<D> Traced<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            events: Vec::new(),
            edge: 0,
        }
    }

    /// All writes to one port, as `(edge, value)` pairs in issue order.
    pub fn writes_to(&self, port: InputPort) -> Vec<(u64, i64)> {
        self.events
            .iter()
            .filter_map(|ev| match ev {
                Event::Write {
                    edge,
                    port: p,
                    value,
                } if *p == port => Some((*edge, *value)),
                _ => None,
            })
            .collect()
    }
}

impl<D: Dut> Dut for Traced<D> {
    fn capacity(&self) -> PortCapacity {
        self.inner.capacity()
    }

    fn write(&mut self, port: InputPort, value: i64) {
        self.events.push(Event::Write {
            edge: self.edge,
            port,
            value,
        });
        self.inner.write(port, value);
    }

    fn read(&mut self, port: OutputPort) -> i64 {
        let value = self.inner.read(port);
        self.events.push(Event::Read {
            edge: self.edge,
            port,
            value,
        });
        value
    }

    fn rising_edge(&mut self) {
        self.inner.rising_edge();
        self.edge += 1;
    }
}
