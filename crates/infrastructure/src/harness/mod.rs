//! Request/response harness.
//!
//! [`Harness::do_request`] builds and executes one request;
//! [`Harness::check_json_call`] and [`Harness::assert_json_call`] verify the
//! outcome against [`Expectations`](callcheck_application::Expectations).

mod call;
mod params;

pub use call::{Harness, assert_json_call, check_json_call, do_request};
pub use params::{
    DoRequestParams, ExecuteFn, JsonCallParams, ResponseHook, execute_fn, response_hook,
};
