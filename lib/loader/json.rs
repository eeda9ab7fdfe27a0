//! Classes serialized as JSON.
//!
//! The JSON form is the serde form of `il::Class`: a class name and a list of
//! decoded methods, each with its instructions and exception table.

use crate::il;
use crate::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub fn from_str(json: &str) -> Result<il::Class, Error> {
    let class: il::Class = serde_json::from_str(json)?;
    validate(&class)?;
    Ok(class)
}

pub fn from_file(filename: &Path) -> Result<il::Class, Error> {
    let mut file = File::open(filename)?;
    let mut buf = String::new();
    file.read_to_string(&mut buf)?;
    from_str(&buf)
}

// Every instruction must sit at its own index, since analyses address
// instructions by index.
fn validate(class: &il::Class) -> Result<(), Error> {
    for method in class.methods() {
        for (index, instruction) in method.instructions().iter().enumerate() {
            if instruction.index() != index {
                return Err(Error::Custom(format!(
                    "{}: instruction {} is stored at index {}",
                    method,
                    instruction.index(),
                    index
                )));
            }
        }
        for block in method.try_catch_blocks() {
            let len = method.instructions().len();
            if block.start() > block.end() || block.end() > len || block.handler() >= len {
                return Err(Error::Custom(format!(
                    "{}: malformed exception handler {}..{} -> {}",
                    method,
                    block.start(),
                    block.end(),
                    block.handler()
                )));
            }
        }
    }
    Ok(())
}
