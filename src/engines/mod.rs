pub mod advisor;
pub mod credit;

pub(crate) mod numeric;
