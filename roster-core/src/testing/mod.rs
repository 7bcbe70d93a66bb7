//! Test doubles for the remote API
//!
//! [`StubGateway`] behaves like the public reqres demo API closely enough to
//! drive the stores end to end, and adds knobs for injecting failures,
//! holding responses and panicking mid-request.

mod stub_gateway;

pub use stub_gateway::{Operation, ResponseHold, StubGateway, sample_users};
