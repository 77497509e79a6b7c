// Domain layer: request/response records and the ports the adapter talks through.

pub mod model;
pub mod ports;
