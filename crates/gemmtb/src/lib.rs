mod driver;
mod dut;
mod harness;
mod vector;

pub use driver::{Driver, DriverError, DriverOptions, Phase};
pub use dut::{Dut, InputPort, OutputPort, PortCapacity};
pub use harness::{HarnessError, INPUT_FILE, OUTPUT_FILE, run_files, run_record};
pub use vector::{CodecError, Dims, InputRecord, write_result};
