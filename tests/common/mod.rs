//! Shared `ConfigurationValue` builders for the integration tests, following the same
//! plain-`Object`-tree construction style the unit tests embedded in `src/` use.
#![allow(dead_code)]

use calzada_lib::ConfigurationValue;

pub fn number(n:f64) -> ConfigurationValue { ConfigurationValue::Number(n) }

pub fn router_cv(num_vcs:usize, vc_buf_size:usize) -> ConfigurationValue
{
	ConfigurationValue::Object("IQRouter".to_string(), vec![
		("num_vcs".to_string(), number(num_vcs as f64)),
		("vc_buf_size".to_string(), number(vc_buf_size as f64)),
	])
}

/// A router config naming both allocators explicitly and a speculation level, for tests
/// that need to pin the allocator strategy or exercise speculative switch allocation.
pub fn router_cv_with(num_vcs:usize, vc_buf_size:usize, vc_allocator:ConfigurationValue, sw_allocator:ConfigurationValue, speculative:u8, hold_switch_for_packet:bool) -> ConfigurationValue
{
	ConfigurationValue::Object("IQRouter".to_string(), vec![
		("num_vcs".to_string(), number(num_vcs as f64)),
		("vc_buf_size".to_string(), number(vc_buf_size as f64)),
		("vc_allocator".to_string(), vc_allocator),
		("sw_allocator".to_string(), sw_allocator),
		("speculative".to_string(), number(speculative as f64)),
		("hold_switch_for_packet".to_string(), if hold_switch_for_packet {ConfigurationValue::True} else {ConfigurationValue::False}),
	])
}

pub fn separable_input_first() -> ConfigurationValue { ConfigurationValue::Object("SeparableInputFirst".to_string(), vec![]) }
pub fn separable_output_first() -> ConfigurationValue { ConfigurationValue::Object("SeparableOutputFirst".to_string(), vec![]) }
pub fn wavefront(round_robin:bool) -> ConfigurationValue
{
	ConfigurationValue::Object("Wavefront".to_string(), vec![("round_robin".to_string(), if round_robin {ConfigurationValue::True} else {ConfigurationValue::False})])
}
pub fn islip(iters:usize) -> ConfigurationValue
{
	ConfigurationValue::Object("Islip".to_string(), vec![("iters".to_string(), number(iters as f64))])
}
