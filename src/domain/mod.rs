//! Domain layer: entities, value objects and the ports the application layer
//! talks to. Nothing in here performs I/O.

pub mod course;
pub mod grade;
pub mod notification;
pub mod payment;
pub mod ports;
pub mod user;
