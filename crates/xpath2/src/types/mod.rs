mod array;
mod atomic;
mod function;
mod map;
mod sequence;

pub use array::XdmArray;
pub use atomic::AtomicValue;
pub use function::XdmFunction;
pub use map::XdmMap;
pub use sequence::{XdmItem, XdmValue};
