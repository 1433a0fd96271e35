use crate::driver::{Driver, DriverError, DriverOptions};
use crate::dut::Dut;
use crate::vector::{CodecError, InputRecord, write_result};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Conventional exchange file names shared with the test-vector generator.
pub const INPUT_FILE: &str = "input_buffer.txt";
pub const OUTPUT_FILE: &str = "output_buffer.txt";

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error("exchange file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Drives one run from an input record text and serializes the result.
///
/// Parse errors abort before any clock activity, so a bad test vector never
/// drives partial stimulus onto the device.
pub fn run_record<D: Dut>(
    dut: D,
    record: &str,
    options: DriverOptions,
) -> Result<String, HarnessError> {
    let input = InputRecord::parse(record)?;
    let mut driver = Driver::with_options(dut, options);
    let c = driver.run(&input)?;
    Ok(write_result(&c))
}

/// File-to-file variant of [`run_record`]. All I/O happens outside the timed
/// protocol: the input is read before reset, the output written after drain.
pub fn run_files<D: Dut>(
    dut: D,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: DriverOptions,
) -> Result<(), HarnessError> {
    let record = fs::read_to_string(input)?;
    let result = run_record(dut, &record, options)?;
    fs::write(output, result)?;
    Ok(())
}
